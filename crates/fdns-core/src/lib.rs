//! Core types and errors for the FDNS dataset parser.
//!
//! This crate provides the foundational types shared by the parsing engine
//! and the command-line front end:
//!
//! - **Types**: the decoded [`Record`] shape of one dataset line and the
//!   [`FilterSet`] deciding which records are reported
//! - **Errors**: the [`ParseError`] taxonomy surfaced on the error channel
//!
//! # Example
//!
//! ```rust
//! use fdns_core::{FilterSet, Record};
//!
//! let filters = FilterSet::builder()
//!     .record("a")
//!     .domain("example.com")
//!     .build();
//!
//! let record = Record::from_slice(br#"{"name":"a.b.example.com","type":"a","value":"127.0.0.1"}"#)
//!     .unwrap();
//! assert!(filters.matches(&record));
//! ```

#![doc(html_root_url = "https://docs.rs/fdns-core/2.0.0")]

mod error;
pub mod types;

pub use error::{ParseError, Result};
pub use types::*;
