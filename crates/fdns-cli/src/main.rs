//! fdns - search the Rapid7 Forward DNS dataset
//!
//! Streams a local or remote dataset and prints the entries matching the
//! requested record types, domains and substrings.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    fdns_cli::run().await
}
