//! wikr library
//!
//! Exposes the cache, Wikipedia client, selection prompt, spinner and lookup
//! flow for use by the binary and in integration tests.

pub mod cache;
pub mod cli;
pub mod lookup;
pub mod progress;
pub mod select;
pub mod wiki;
