//! Parse configuration types.

use fdns_core::ReportField;

/// Default number of worker tasks
pub const DEFAULT_WORKERS: usize = 4;

/// Default longest accepted line, in bytes
pub const DEFAULT_MAX_LINE_LEN: usize = 1024 * 1024;

/// Tuning knobs for one parse operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Number of worker tasks decoding and filtering lines
    pub workers: usize,

    /// Lines queued per worker before the dispatcher blocks
    pub line_capacity: usize,

    /// Matches buffered before workers block on the consumer
    pub output_capacity: usize,

    /// Longest line accepted before the stream is considered corrupt
    pub max_line_len: usize,

    /// Field reported for each matching record
    pub report: ReportField,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseOptions {
    /// Create options with the default settings
    #[must_use]
    pub const fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            line_capacity: 1,
            output_capacity: 64,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            report: ReportField::Name,
        }
    }

    /// Set the worker count (at least one)
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the per-worker line queue depth (at least one)
    #[must_use]
    pub fn line_capacity(mut self, capacity: usize) -> Self {
        self.line_capacity = capacity.max(1);
        self
    }

    /// Set the output channel depth (at least one)
    #[must_use]
    pub fn output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity.max(1);
        self
    }

    /// Set the longest accepted line (at least one byte)
    #[must_use]
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len.max(1);
        self
    }

    /// Set the field reported for matches
    #[must_use]
    pub const fn report(mut self, report: ReportField) -> Self {
        self.report = report;
        self
    }

    /// Clamp fields that were set directly to usable values
    pub(crate) fn normalized(self) -> Self {
        Self {
            workers: self.workers.max(1),
            line_capacity: self.line_capacity.max(1),
            output_capacity: self.output_capacity.max(1),
            max_line_len: self.max_line_len.max(1),
            report: self.report,
        }
    }
}
