use thiserror::Error;

/// Result type alias for dataset parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors reported while streaming a dataset
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input is not a decompressible gzip stream
    #[error("invalid gzip stream: {0}")]
    Format(#[source] std::io::Error),

    /// Reading the decompressed stream failed
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A single line could not be decoded as a record
    #[error("could not decode line {line_number}: {source}")]
    Decode {
        /// 1-based position of the line in the decompressed stream
        line_number: u64,
        /// The raw line, lossily converted to UTF-8
        line: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The caller cancelled the operation
    #[error("parse cancelled")]
    Cancelled,
}

impl ParseError {
    /// Build a decode error from the raw bytes of the offending line
    pub fn decode(line_number: u64, line: &[u8], source: serde_json::Error) -> Self {
        Self::Decode {
            line_number,
            line: String::from_utf8_lossy(line).into_owned(),
            source,
        }
    }

    /// Returns true if the error ended the whole operation
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Format(_) | Self::Io(_))
    }

    /// Returns true if the error is the caller's own cancellation
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the raw line for decode errors
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::Decode { line, .. } => Some(line),
            _ => None,
        }
    }
}
