//! Interactive choice between several search results

use std::io::{BufRead, Write};

use tracing::debug;

use crate::lookup::LookupError;

/// Default number of candidates shown to the user
pub const DEFAULT_MAX_DISPLAYED: usize = 5;

/// Token that ends the program from the selection prompt
pub const QUIT_TOKEN: &str = "q";

/// Result of asking the user to pick a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// A title was picked, either automatically or by the user
    Selected(String),
    /// The user asked to quit
    Quit,
}

/// Picks one title out of the search results
///
/// * No candidates: `LookupError::NoResults`.
/// * One candidate: selected without touching `input` or `output`.
/// * Otherwise the first `max_displayed` candidates are listed, numbered from
///   1, and the user is asked until they enter a listed number or `q`.
///   Anything else re-prompts. End of input counts as quitting.
pub fn choose<R: BufRead, W: Write>(
    candidates: &[String],
    max_displayed: usize,
    mut input: R,
    mut output: W,
) -> Result<Choice, LookupError> {
    match candidates {
        [] => return Err(LookupError::NoResults),
        [only] => {
            debug!("Single search result, selecting '{}'", only);
            return Ok(Choice::Selected(only.clone()));
        }
        _ => {}
    }

    let displayed = &candidates[..candidates.len().min(max_displayed.max(1))];

    writeln!(output, "\nMultiple results found. Please choose one:")?;
    for (i, title) in displayed.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, title)?;
    }
    writeln!(output, "{}. Quit", QUIT_TOKEN)?;

    let mut line = String::new();
    loop {
        writeln!(
            output,
            "\nEnter the number of the desired result (or '{}' to quit): ",
            QUIT_TOKEN
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("Input closed during selection, quitting");
            return Ok(Choice::Quit);
        }

        let answer = line.trim();
        if answer == QUIT_TOKEN {
            return Ok(Choice::Quit);
        }

        if let Some(title) = parse_index(answer, displayed.len()).map(|i| &displayed[i]) {
            debug!("User selected '{}'", title);
            return Ok(Choice::Selected(title.clone()));
        }

        writeln!(output, "\nInvalid input. Please try again.")?;
    }
}

/// Maps a 1-based answer to a 0-based index below `len`
fn parse_index(answer: &str, len: usize) -> Option<usize> {
    match answer.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}
