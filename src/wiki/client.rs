//! Wikipedia API client
//!
//! Searches a language edition with the MediaWiki query API and fetches page
//! summaries from the REST API, decoding both into typed structures.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{ArticleSource, Summary, WikiError};

/// Base URL template; `{lang}` is replaced by the language edition
const WIKIPEDIA_BASE_URL: &str = "https://{lang}.wikipedia.org";

/// Summaries longer than this many characters are truncated
pub const MAX_SUMMARY_CHARS: usize = 1000;

const ELLIPSIS: &str = "...";

const USER_AGENT: &str = concat!("wikr/", env!("CARGO_PKG_VERSION"));

/// Client for the Wikipedia search and summary endpoints
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: Client,
    /// Base URL template containing a `{lang}` placeholder
    base_url: String,
}

impl Default for WikiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WikiClient {
    /// Create a new WikiClient for wikipedia.org
    pub fn new() -> Self {
        Self::with_base_url(WIKIPEDIA_BASE_URL)
    }

    /// Create a new WikiClient against another host (for testing)
    ///
    /// The template may contain `{lang}`, which is replaced per request.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn base(&self, language: &str) -> Result<Url, WikiError> {
        let base = self.base_url.replace("{lang}", language);
        Url::parse(&base)
            .map_err(|e| WikiError::MalformedResponse(format!("bad base URL '{}': {}", base, e)))
    }

    /// Builds the search URL with `phrase` query-escaped
    pub fn search_url(&self, language: &str, phrase: &str) -> Result<Url, WikiError> {
        let mut url = self.base(language)?;
        url.path_segments_mut()
            .map_err(|_| WikiError::MalformedResponse("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["w", "api.php"]);
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("list", "search")
            .append_pair("srsearch", phrase)
            .append_pair("format", "json");
        Ok(url)
    }

    /// Builds the summary URL with `title` escaped as one path segment
    pub fn summary_url(&self, language: &str, title: &str) -> Result<Url, WikiError> {
        let mut url = self.base(language)?;
        url.path_segments_mut()
            .map_err(|_| WikiError::MalformedResponse("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "summary", title]);
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String, WikiError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WikiError::Status(status));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ArticleSource for WikiClient {
    async fn search(&self, language: &str, phrase: &str) -> Result<Vec<String>, WikiError> {
        let url = self.search_url(language, phrase)?;
        let body = self.get_text(url).await?;
        parse_search_response(&body)
    }

    async fn fetch_summary(&self, language: &str, title: &str) -> Result<Summary, WikiError> {
        let url = self.summary_url(language, title)?;
        let body = self.get_text(url).await?;
        parse_summary_response(&body)
    }
}

/// Extracts result titles, in order, from a search response body
pub fn parse_search_response(body: &str) -> Result<Vec<String>, WikiError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| WikiError::MalformedResponse(e.to_string()))?;
    Ok(response.query.search.into_iter().map(|hit| hit.title).collect())
}

/// Extracts the truncated extract and page URL from a summary response body
pub fn parse_summary_response(body: &str) -> Result<Summary, WikiError> {
    let response: SummaryResponse =
        serde_json::from_str(body).map_err(|e| WikiError::MalformedResponse(e.to_string()))?;
    Ok(Summary {
        text: truncate_summary(&response.extract),
        url: response.content_urls.desktop.page,
    })
}

/// Cuts text longer than 1000 characters to 997 characters plus `...`
///
/// Counts chars, not bytes, so multi-byte text is never split mid-character.
pub fn truncate_summary(text: &str) -> String {
    if text.chars().count() <= MAX_SUMMARY_CHARS {
        return text.to_string();
    }
    let keep = MAX_SUMMARY_CHARS - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// MediaWiki `action=query&list=search` response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

/// REST `page/summary` response
#[derive(Debug, Deserialize)]
struct SummaryResponse {
    extract: String,
    content_urls: ContentUrls,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: PageUrls,
}

#[derive(Debug, Deserialize)]
struct PageUrls {
    page: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trimmed search response for "Berlin"
    const SEARCH_RESPONSE: &str = r#"{
        "batchcomplete": "",
        "continue": {"sroffset": 10, "continue": "-||"},
        "query": {
            "searchinfo": {"totalhits": 3},
            "search": [
                {"ns": 0, "title": "Berlin", "pageid": 2, "size": 500, "wordcount": 90, "snippet": "..."},
                {"ns": 0, "title": "Berlin-Mitte", "pageid": 3, "size": 400, "wordcount": 70, "snippet": "..."},
                {"ns": 0, "title": "Berliner Mauer", "pageid": 4, "size": 300, "wordcount": 50, "snippet": "..."}
            ]
        }
    }"#;

    /// Trimmed summary response for "Berlin"
    const SUMMARY_RESPONSE: &str = r#"{
        "type": "standard",
        "title": "Berlin",
        "extract": "Berlin ist die Hauptstadt der Bundesrepublik Deutschland.",
        "content_urls": {
            "desktop": {"page": "https://de.wikipedia.org/wiki/Berlin", "revisions": "x"},
            "mobile": {"page": "https://de.m.wikipedia.org/wiki/Berlin"}
        }
    }"#;

    #[test]
    fn test_parse_search_response_keeps_relevance_order() {
        let titles = parse_search_response(SEARCH_RESPONSE).expect("Should parse");
        assert_eq!(titles, vec!["Berlin", "Berlin-Mitte", "Berliner Mauer"]);
    }

    #[test]
    fn test_parse_search_response_with_no_hits() {
        let titles = parse_search_response(r#"{"query": {"search": []}}"#).expect("Should parse");
        assert!(titles.is_empty());
    }

    #[test]
    fn test_parse_search_response_missing_query_is_malformed() {
        let result = parse_search_response(r#"{"error": {"code": "badvalue"}}"#);
        assert!(matches!(result, Err(WikiError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_search_response_missing_title_is_malformed() {
        let result = parse_search_response(r#"{"query": {"search": [{"pageid": 1}]}}"#);
        assert!(matches!(result, Err(WikiError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_search_response_invalid_json_is_malformed() {
        let result = parse_search_response("<html>Bad gateway</html>");
        assert!(matches!(result, Err(WikiError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_summary_response() {
        let summary = parse_summary_response(SUMMARY_RESPONSE).expect("Should parse");
        assert_eq!(summary.text, "Berlin ist die Hauptstadt der Bundesrepublik Deutschland.");
        assert_eq!(summary.url, "https://de.wikipedia.org/wiki/Berlin");
    }

    #[test]
    fn test_parse_summary_response_missing_url_is_malformed() {
        let result = parse_summary_response(r#"{"extract": "text", "content_urls": {"mobile": {"page": "m"}}}"#);
        assert!(matches!(result, Err(WikiError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_summary_response_missing_extract_is_malformed() {
        let result = parse_summary_response(
            r#"{"content_urls": {"desktop": {"page": "https://de.wikipedia.org/wiki/X"}}}"#,
        );
        assert!(matches!(result, Err(WikiError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_summary_response_truncates_long_extract() {
        let long = "a".repeat(1200);
        let body = format!(
            r#"{{"extract": "{}", "content_urls": {{"desktop": {{"page": "u"}}}}}}"#,
            long
        );
        let summary = parse_summary_response(&body).expect("Should parse");
        assert_eq!(summary.text.chars().count(), 1000);
        assert!(summary.text.ends_with("..."));
    }

    #[test]
    fn test_truncate_summary_leaves_short_text_alone() {
        let exact = "b".repeat(1000);
        assert_eq!(truncate_summary(&exact), exact);
        assert_eq!(truncate_summary("kurz"), "kurz");
    }

    #[test]
    fn test_truncate_summary_cuts_to_997_plus_ellipsis() {
        let text: String = "x".repeat(1200);
        let truncated = truncate_summary(&text);
        assert_eq!(truncated.len(), 1000);
        assert_eq!(&truncated[..997], &text[..997]);
        assert_eq!(&truncated[997..], "...");
    }

    #[test]
    fn test_truncate_summary_counts_characters_not_bytes() {
        let text: String = "ä".repeat(1001);
        let truncated = truncate_summary(&text);
        assert_eq!(truncated.chars().count(), 1000);
        assert!(truncated.starts_with(&"ä".repeat(997)));
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_search_url_escapes_phrase() {
        let client = WikiClient::new();
        let url = client.search_url("de", "Rust & Go").unwrap();
        assert_eq!(url.host_str(), Some("de.wikipedia.org"));
        assert_eq!(url.path(), "/w/api.php");
        assert_eq!(
            url.query(),
            Some("action=query&list=search&srsearch=Rust+%26+Go&format=json")
        );
    }

    #[test]
    fn test_summary_url_escapes_title_as_one_segment() {
        let client = WikiClient::new();
        let url = client.summary_url("en", "AC/DC live").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/AC%2FDC%20live"
        );
    }

    #[test]
    fn test_with_base_url_substitutes_language() {
        let client = WikiClient::with_base_url("http://127.0.0.1:9/{lang}");
        let url = client.summary_url("fr", "Paris").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/fr/api/rest_v1/page/summary/Paris");
    }

    #[tokio::test]
    async fn test_search_against_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept connections
        let client = WikiClient::with_base_url("http://127.0.0.1:9");
        let result = client.search("de", "Berlin").await;
        assert!(matches!(result, Err(WikiError::Network(_))));
    }
}
