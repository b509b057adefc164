//! Concurrent streaming parser for the Rapid7 Forward DNS dataset.
//!
//! The dataset is a gzip-compressed file of newline-delimited JSON records.
//! [`parse`] decompresses it on a dedicated blocking thread, frames it into
//! lines and fans the lines out to a fixed pool of worker tasks that decode
//! each record and report the ones accepted by a [`FilterSet`].
//!
//! ```rust,no_run
//! use fdns::{parse, FilterSet, ParseOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> std::io::Result<()> {
//! let file = std::fs::File::open("fdns_a.json.gz")?;
//! let filters = FilterSet::builder()
//!     .records(["a", "cname"])
//!     .domain("example.com")
//!     .build();
//!
//! let mut parse = parse(
//!     CancellationToken::new(),
//!     file,
//!     filters,
//!     ParseOptions::new().workers(8),
//! );
//! while let Some(name) = parse.output.recv().await {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/fdns/2.0.0")]

mod config;
mod decompress;
mod framer;
mod parser;
mod worker;

pub use config::ParseOptions;
pub use parser::{parse, Parse, ParseStats};
pub use worker::WorkerStats;

pub use fdns_core::{
    FilterSet, FilterSetBuilder, ParseError, Record, RecordType, ReportField, Result,
    UnknownRecordType,
};
