//! # fdns-cli
//!
//! Command-line interface for the FDNS dataset parser.
//!
//! ## Features
//!
//! - **Local or remote input**: `--file` for a downloaded dataset, `--url`
//!   to stream it straight from the publisher
//! - **Filters**: record types, domain suffixes and type-agnostic substrings
//! - **Graceful stop**: Ctrl-C, SIGTERM or `--timeout` cancel the parse
//! - **Output formats**: plain lines or JSON strings

pub mod cli;
pub mod config;
pub mod output;
pub mod source;

pub use cli::run;
