//! Worker tasks decoding and filtering framed lines.

use crate::framer::RawLine;
use fdns_core::{FilterSet, ParseError, Record, ReportField};
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Counters returned by a worker when it shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Lines received from the dispatcher
    pub processed: u64,
    /// Records that passed the filter set
    pub matched: u64,
    /// Lines that failed to decode
    pub malformed: u64,
    /// Stopped by `shutdown` instead of running out of lines
    pub interrupted: bool,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.matched += other.matched;
        self.malformed += other.malformed;
        self.interrupted |= other.interrupted;
    }
}

/// One member of the pool
///
/// A worker owns the receiving end of its line channel. It stops once the
/// channel is closed and drained, or as soon as `shutdown` fires.
pub(crate) struct Worker {
    pub id: usize,
    pub lines: mpsc::Receiver<RawLine>,
    pub filters: Arc<FilterSet>,
    pub report: ReportField,
    pub output: mpsc::Sender<String>,
    pub errors: mpsc::UnboundedSender<ParseError>,
    pub shutdown: CancellationToken,
}

impl Worker {
    pub(crate) async fn run(mut self) -> WorkerStats {
        let mut stats = WorkerStats::default();
        debug!(worker = self.id, "worker started");

        loop {
            let line = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    stats.interrupted = true;
                    break;
                }
                line = self.lines.recv() => match line {
                    Some(line) => line,
                    None => break,
                },
            };
            stats.processed += 1;

            let record = match Record::from_slice(&line.bytes) {
                Ok(record) => record,
                Err(e) => {
                    stats.malformed += 1;
                    trace!(worker = self.id, line = line.number, error = %e, "malformed line");
                    // the receiver may be gone; decode errors are advisory
                    let _ = self.errors.send(ParseError::decode(line.number, &line.bytes, e));
                    continue;
                }
            };

            if !self.filters.matches(&record) {
                continue;
            }
            stats.matched += 1;

            let reported = record.into_field(self.report);
            let delivered = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    stats.interrupted = true;
                    break;
                }
                sent = self.output.send(reported) => sent.is_ok(),
            };
            if !delivered {
                debug!(worker = self.id, "output receiver dropped, shutting down");
                self.shutdown.cancel();
                break;
            }
        }

        debug!(
            worker = self.id,
            processed = stats.processed,
            matched = stats.matched,
            malformed = stats.malformed,
            "worker stopped"
        );
        stats
    }
}
