//! Remote encyclopedia access
//!
//! This module defines the [`ArticleSource`] seam the lookup flow is written
//! against, and the Wikipedia implementation of it in [`client`].

pub mod client;

pub use client::{truncate_summary, WikiClient, MAX_SUMMARY_CHARS};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the encyclopedia API
#[derive(Debug, Error)]
pub enum WikiError {
    /// The request could not be sent or the response body not read
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP request failed with status {0}")]
    Status(StatusCode),

    /// The response did not have the expected JSON shape
    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),
}

/// Plain-text summary of one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Extract text, truncated to at most 1000 characters
    pub text: String,
    /// Canonical desktop page URL
    pub url: String,
}

/// Something that can search for articles and fetch their summaries
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns matching titles in relevance order
    async fn search(&self, language: &str, phrase: &str) -> Result<Vec<String>, WikiError>;

    /// Fetches the summary for an exact title
    async fn fetch_summary(&self, language: &str, title: &str) -> Result<Summary, WikiError>;
}
