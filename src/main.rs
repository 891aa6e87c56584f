//! wikr - Look up Wikipedia article summaries from the terminal
//!
//! Searches a Wikipedia language edition, lets the user pick among several
//! results and prints the article summary, keeping summaries in a local cache
//! for 24 hours.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;

use crossterm::style::Stylize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wikr::cache::{CacheStore, SummaryCache};
use wikr::cli::{Cli, StartupConfig};
use wikr::lookup::{Lookup, Outcome, ResolvedSummary};
use wikr::wiki::WikiClient;

/// Sets up stderr logging; quiet unless `--verbose` or `RUST_LOG` ask for more
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::ERROR
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("wikr={}", level)
            .parse()
            .unwrap_or_else(|_| level.into()),
    );

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_error(message: impl std::fmt::Display) {
    eprintln!("{}", message.to_string().red());
}

/// Prints the summary block to stdout
fn print_summary(summary: &ResolvedSummary) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\n\n{}", "Summary:".blue())?;
    if summary.served_from_cache {
        writeln!(stdout, "{}", "(cached)".yellow())?;
    }
    writeln!(stdout, "{}", summary.text)?;
    writeln!(stdout, "\n{}", "URL:".green())?;
    writeln!(stdout, "{}", summary.url)?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if cli.clear_cache {
        let store = CacheStore::with_path(cli.cache_path());
        return match store.clear() {
            Ok(()) => {
                println!("Cache cleared.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_error(format!("Error deleting cache file: {}", e));
                ExitCode::FAILURE
            }
        };
    }

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            print_error(e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(
        "Looking up '{}' on {}.wikipedia.org, cache at {}",
        config.phrase,
        config.language,
        config.cache_path.display()
    );

    let cache = SummaryCache::new(CacheStore::with_path(config.cache_path.clone()));
    let mut lookup = Lookup::new(WikiClient::new(), cache).with_max_displayed(config.max_results);
    if !io::stderr().is_terminal() {
        lookup = lookup.with_progress_output(Arc::new(|| Box::new(io::sink()) as Box<dyn Write + Send>));
    }

    let outcome = lookup
        .resolve_and_fetch(&config.language, &config.phrase, io::stdin().lock(), io::stdout())
        .await;

    match outcome {
        Ok(Outcome::Resolved(summary)) => match print_summary(&summary) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                print_error(format!("Error writing output: {}", e));
                ExitCode::FAILURE
            }
        },
        Ok(Outcome::Quit) => {
            println!("\nProgram was exited.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(e);
            ExitCode::FAILURE
        }
    }
}
