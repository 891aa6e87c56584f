//! Command-line interface parsing for wikr
//!
//! This module handles parsing of CLI arguments using clap, including the
//! optional leading language word (`wikr en Rust`) the tool has always accepted.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::{default_cache_path, is_valid_language};

/// Language edition used when none is given
pub const DEFAULT_LANGUAGE: &str = "de";

/// Words that select the language when they come first in the search term
pub const LEADING_LANGUAGES: [&str; 2] = ["de", "en"];

/// Single-dash long flags the tool has always accepted, with their clap spelling
const LEGACY_FLAGS: [(&str, &str); 4] = [
    ("-lang", "--lang"),
    ("-max", "--max"),
    ("-clear-cache", "--clear-cache"),
    ("-version", "--version"),
];

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// No search words were given
    #[error("Please provide a search term.")]
    MissingSearchTerm,

    /// The language cannot be used as a Wikipedia edition
    #[error("Invalid language: '{0}'. Use a code such as de or en")]
    InvalidLanguage(String),
}

/// wikr - Look up Wikipedia article summaries from the terminal
#[derive(Parser, Debug)]
#[command(name = "wikr")]
#[command(about = "Look up Wikipedia article summaries from the terminal")]
#[command(version)]
#[command(after_help = "Examples:\n  wikr --lang en --max 10 Rust\n  wikr en Rust programming language\n  wikr --clear-cache")]
pub struct Cli {
    /// Search term; a leading `de` or `en` word selects the language
    #[arg(value_name = "TERM")]
    pub term: Vec<String>,

    /// Language of the Wikipedia edition to search
    #[arg(short, long, env = "WIKR_LANG", default_value = DEFAULT_LANGUAGE)]
    pub lang: String,

    /// Maximum number of results offered for selection
    #[arg(
        short,
        long,
        env = "WIKR_MAX",
        default_value_t = 5,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub max: u16,

    /// Delete the cache file and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Location of the cache file (defaults to ~/.wikr_cache.json)
    #[arg(long, env = "WIKR_CACHE_FILE", value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses `std::env::args_os`, accepting the single-dash long flags too
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Like [`Parser::try_parse_from`] after [`normalize_args`]
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// The cache file to use, falling back to the home directory default
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(default_cache_path)
    }
}

/// Validated settings for one lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Wikipedia language edition
    pub language: String,
    /// Search phrase, words joined by single spaces
    pub phrase: String,
    /// Maximum number of candidates listed for selection
    pub max_results: usize,
    /// Cache file location
    pub cache_path: PathBuf,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with language, phrase and limits resolved
    /// * `Err(CliError)` if the search term is missing or the language invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let (language, words) = split_leading_language(&cli.term, &cli.lang);

        if !is_valid_language(language) {
            return Err(CliError::InvalidLanguage(language.to_string()));
        }
        if words.is_empty() {
            return Err(CliError::MissingSearchTerm);
        }

        Ok(StartupConfig {
            language: language.to_string(),
            phrase: words.join(" "),
            max_results: usize::from(cli.max),
            cache_path: cli.cache_path(),
        })
    }
}

/// Rewrites `-lang`, `-max`, `-clear-cache` and `-version` (and the
/// `-lang=de` form) to their double-dash spelling
///
/// Without this, clap reads `-lang fr` as `-l ang` followed by the word `fr`.
/// Arguments after a bare `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut past_separator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if past_separator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                past_separator = true;
                return arg;
            }
            let (flag, value) = match text.split_once('=') {
                Some((flag, value)) => (flag, Some(value)),
                None => (text, None),
            };
            match LEGACY_FLAGS.iter().find(|(legacy, _)| *legacy == flag) {
                Some((_, long)) => match value {
                    Some(value) => OsString::from(format!("{}={}", long, value)),
                    None => OsString::from(*long),
                },
                None => arg,
            }
        })
        .collect()
}

/// Takes a leading `de`/`en` word as the language, otherwise uses `fallback`
fn split_leading_language<'a>(term: &'a [String], fallback: &'a str) -> (&'a str, &'a [String]) {
    match term.split_first() {
        Some((first, rest)) if LEADING_LANGUAGES.contains(&first.as_str()) => (first.as_str(), rest),
        _ => (fallback, term),
    }
}
