//! Command-line argument definitions using clap.

use clap::{ArgGroup, Parser, ValueEnum};
use fdns::{RecordType, ReportField};
use std::path::PathBuf;
use url::Url;

use crate::output::OutputFormat;

/// Search the Rapid7 Forward DNS dataset
///
/// Reports every entry whose name contains one of the substrings, or whose
/// name is below one of the domains and whose type is one of the records.
#[derive(Parser, Debug)]
#[command(name = "fdns")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
pub struct Cli {
    /// Path of the dataset (can't be used with --url)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// URL of the dataset (can't be used with --file)
    #[arg(short, long, value_name = "URL")]
    pub url: Option<Url>,

    /// Record types to report (a, aaaa, cname, mx, ns, ptr, txt)
    #[arg(short, long, value_delimiter = ',')]
    pub records: Vec<RecordType>,

    /// Domains whose subdomains are reported
    #[arg(short, long, value_delimiter = ',')]
    pub domains: Vec<String>,

    /// Substrings to match, whatever the record type
    #[arg(short, long, value_delimiter = ',')]
    pub substrings: Vec<String>,

    /// Number of parsing workers
    #[arg(short, long, alias = "goroutines", env = "FDNS_WORKERS")]
    pub workers: Option<usize>,

    /// Field printed for each match
    #[arg(short, long, value_enum)]
    pub emit: Option<Emit>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User agent sent with --url requests
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log malformed lines and progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Field printed for each match
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// The matching domain name
    Name,
    /// The value it resolves to
    Value,
}

impl From<Emit> for ReportField {
    fn from(emit: Emit) -> Self {
        match emit {
            Emit::Name => Self::Name,
            Emit::Value => Self::Value,
        }
    }
}
