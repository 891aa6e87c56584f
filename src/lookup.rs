//! End-to-end lookup: search, pick a title, then serve a cached or fresh summary

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheKey, SummaryCache};
use crate::progress::Spinner;
use crate::select::{self, Choice, DEFAULT_MAX_DISPLAYED};
use crate::wiki::{ArticleSource, WikiError};

/// Errors that end a lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// The search request failed or answered with something unexpected
    #[error("Error during search: {0}")]
    Search(#[source] WikiError),

    /// The summary request failed or answered with something unexpected
    #[error("Error fetching summary: {0}")]
    Fetch(#[source] WikiError),

    /// The search returned nothing
    #[error("No results found.")]
    NoResults,

    /// Writing the prompt or reading the user's answer failed
    #[error("Terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),
}

/// Summary handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSummary {
    /// Article title that was looked up
    pub title: String,
    /// Summary text, at most 1000 characters
    pub text: String,
    /// Canonical page URL
    pub url: String,
    /// Whether the summary came from the local cache
    pub served_from_cache: bool,
}

/// How a lookup ended without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Resolved(ResolvedSummary),
    /// The user quit at the selection prompt
    Quit,
}

/// Produces the writer the spinner draws on
pub type ProgressOutput = Arc<dyn Fn() -> Box<dyn Write + Send> + Send + Sync>;

/// Resolves a search phrase to one article summary
pub struct Lookup<S> {
    source: S,
    cache: SummaryCache,
    max_displayed: usize,
    progress_output: ProgressOutput,
}

impl<S: ArticleSource> Lookup<S> {
    /// Creates a lookup drawing its spinner on stderr
    pub fn new(source: S, cache: SummaryCache) -> Self {
        Self {
            source,
            cache,
            max_displayed: DEFAULT_MAX_DISPLAYED,
            progress_output: Arc::new(|| Box::new(io::stderr()) as Box<dyn Write + Send>),
        }
    }

    /// Sets how many candidates the selection prompt lists
    pub fn with_max_displayed(mut self, max_displayed: usize) -> Self {
        self.max_displayed = max_displayed;
        self
    }

    /// Redirects the spinner, e.g. to `io::sink` when output is not a terminal
    pub fn with_progress_output(mut self, progress_output: ProgressOutput) -> Self {
        self.progress_output = progress_output;
        self
    }

    /// The article source this lookup queries
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs the whole lookup
    ///
    /// `input` and `output` are used only when the search yields more than
    /// one title and the user has to pick one.
    ///
    /// # Returns
    /// * `Ok(Outcome::Resolved)` with the summary and where it came from
    /// * `Ok(Outcome::Quit)` if the user quit at the prompt
    /// * `Err(LookupError)` if the search found nothing or a request failed
    pub async fn resolve_and_fetch<R: BufRead, W: Write>(
        &self,
        language: &str,
        phrase: &str,
        input: R,
        output: W,
    ) -> Result<Outcome, LookupError> {
        let candidates = self
            .source
            .search(language, phrase)
            .await
            .map_err(LookupError::Search)?;
        debug!("Search for '{}' returned {} results", phrase, candidates.len());
        if candidates.is_empty() {
            return Err(LookupError::NoResults);
        }

        let title = match select::choose(&candidates, self.max_displayed, input, output)? {
            Choice::Selected(title) => title,
            Choice::Quit => return Ok(Outcome::Quit),
        };
        let key = CacheKey::new(language, title.as_str());

        let spinner = Spinner::start((self.progress_output)());
        let fetched = self.cached_or_fetch(&key).await;
        spinner.stop().await;

        let summary = fetched?;
        if !summary.served_from_cache {
            if let Err(e) = self.cache.store(key, summary.text.as_str(), summary.url.as_str()) {
                warn!("Failed to write cache: {}", e);
            }
        }

        Ok(Outcome::Resolved(summary))
    }

    async fn cached_or_fetch(&self, key: &CacheKey) -> Result<ResolvedSummary, LookupError> {
        if let Some(entry) = self.cache.lookup(key) {
            return Ok(ResolvedSummary {
                title: key.title.clone(),
                text: entry.summary,
                url: entry.url,
                served_from_cache: true,
            });
        }

        let summary = self
            .source
            .fetch_summary(&key.language, &key.title)
            .await
            .map_err(LookupError::Fetch)?;
        Ok(ResolvedSummary {
            title: key.title.clone(),
            text: summary.text,
            url: summary.url,
            served_from_cache: false,
        })
    }
}
