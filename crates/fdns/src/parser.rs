//! Dispatch loop and the public entry point.

use crate::config::ParseOptions;
use crate::decompress;
use crate::framer::{LineFramer, RawLine};
use crate::worker::{Worker, WorkerStats};
use fdns_core::{FilterSet, ParseError};
use std::io::Read;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Totals for one finished parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines read from the decompressed stream, blank ones included
    pub lines: u64,
    /// Lines handed to a worker
    pub dispatched: u64,
    /// Records reported as matches
    pub matched: u64,
    /// Lines that failed to decode
    pub malformed: u64,
    /// Workers that acknowledged shutdown
    pub workers: usize,
}

/// A running parse
///
/// Drain [`Parse::output`] until it yields `None`: the channel closes only
/// after every worker has stopped. [`Parse::errors`] explains an early end
/// and carries per-line decode failures; it is unbounded, so leaving it
/// unread never stalls the parse.
#[derive(Debug)]
pub struct Parse {
    /// Reported field of every matching record
    pub output: mpsc::Receiver<String>,
    /// Errors in the order they were observed
    pub errors: mpsc::UnboundedReceiver<ParseError>,
    task: JoinHandle<ParseStats>,
}

impl Parse {
    /// Wait for the dispatch thread and return its totals
    ///
    /// The output receiver must be drained or dropped first, otherwise
    /// workers blocked on a full output channel keep the parse alive.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the dispatch thread panicked.
    pub async fn finish(self) -> Result<ParseStats, JoinError> {
        self.task.await.map_err(|e| {
            error!(error = %e, "dispatch thread failed");
            e
        })
    }

    /// Split into the output receiver, error receiver and dispatch handle
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        mpsc::Receiver<String>,
        mpsc::UnboundedReceiver<ParseError>,
        JoinHandle<ParseStats>,
    ) {
        (self.output, self.errors, self.task)
    }
}

/// Stream `reader` through the filter set on a pool of workers
///
/// Returns immediately. The gzip stream is read on a blocking thread and
/// every non-blank line is handed to exactly one worker, round-robin.
/// Cancelling `cancel` stops reading, stops the workers and reports a
/// single [`ParseError::Cancelled`], also when the stream was already
/// exhausted but workers still held lines.
///
/// Errors arrive on [`Parse::errors`]:
/// - [`ParseError::Format`] if the input is not a gzip stream, before any
///   line is read.
/// - [`ParseError::Io`] if reading fails later or a line is longer than
///   [`ParseOptions::max_line_len()`].
/// - [`ParseError::Decode`] once per line that is not a JSON record; the
///   parse continues.
///
/// Empty and whitespace-only lines are skipped without an error, but still
/// count towards line numbers.
///
/// # Panics
///
/// Panics when called outside of a tokio runtime.
pub fn parse<R>(
    cancel: CancellationToken,
    reader: R,
    filters: FilterSet,
    options: ParseOptions,
) -> Parse
where
    R: Read + Send + 'static,
{
    let options = options.normalized();
    let (output_tx, output_rx) = mpsc::channel(options.output_capacity);
    let (errors_tx, errors_rx) = mpsc::unbounded_channel();

    let dispatcher = Dispatcher {
        handle: Handle::current(),
        shutdown: cancel.child_token(),
        cancel,
        filters: Arc::new(filters),
        options,
        output: output_tx,
        errors: errors_tx,
    };
    let task = tokio::task::spawn_blocking(move || dispatcher.run(reader));

    Parse {
        output: output_rx,
        errors: errors_rx,
        task,
    }
}

/// Why the dispatch loop stopped reading
enum Stop {
    Exhausted,
    Cancelled,
    ConsumerGone,
    Failed(ParseError),
}

struct Dispatcher {
    handle: Handle,
    cancel: CancellationToken,
    shutdown: CancellationToken,
    filters: Arc<FilterSet>,
    options: ParseOptions,
    output: mpsc::Sender<String>,
    errors: mpsc::UnboundedSender<ParseError>,
}

impl Dispatcher {
    fn run<R: Read>(self, reader: R) -> ParseStats {
        let mut stats = ParseStats::default();

        let stream = match decompress::open(reader) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "input is not a readable gzip stream");
                self.report(e);
                return stats;
            }
        };
        let mut framer = LineFramer::new(stream, self.options.max_line_len);

        let (lines, mut workers) = self.spawn_workers();
        debug!(workers = lines.len(), "dispatch started");

        let mut next = 0;
        let stop = loop {
            if self.cancel.is_cancelled() {
                break Stop::Cancelled;
            }
            if self.shutdown.is_cancelled() {
                break Stop::ConsumerGone;
            }

            let line = match framer.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break Stop::Exhausted,
                Err(e) => break Stop::Failed(e),
            };

            if self.hand_off(&lines[next], line) {
                stats.dispatched += 1;
                next = (next + 1) % lines.len();
            } else if !self.shutdown.is_cancelled() {
                // a worker vanished without shutdown being signalled
                self.shutdown.cancel();
            }
        };

        stats.lines = framer.lines_scanned();
        drop(framer);

        let exhausted = matches!(stop, Stop::Exhausted);
        match stop {
            Stop::Exhausted => debug!(lines = stats.lines, "end of stream"),
            Stop::ConsumerGone => debug!("output receiver dropped, stopping dispatch"),
            Stop::Cancelled => {
                debug!(lines = stats.lines, "parse cancelled");
                self.shutdown.cancel();
                self.report(ParseError::Cancelled);
            }
            Stop::Failed(e) => {
                warn!(error = %e, line = stats.lines, "stream read failed");
                self.shutdown.cancel();
                self.report(e);
            }
        }

        // closing the line channels lets workers drain what they hold
        drop(lines);
        let (totals, acked) = self.handle.block_on(async {
            let mut totals = WorkerStats::default();
            let mut acked = 0;
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(worker) => totals += worker,
                    Err(e) => error!(error = %e, "worker task failed"),
                }
                acked += 1;
            }
            (totals, acked)
        });

        stats.matched = totals.matched;
        stats.malformed = totals.malformed;
        stats.workers = acked;

        // cancelled after end of stream while workers still held lines
        if exhausted && totals.interrupted && self.cancel.is_cancelled() {
            debug!("parse cancelled while draining workers");
            self.report(ParseError::Cancelled);
        }

        info!(
            lines = stats.lines,
            dispatched = stats.dispatched,
            matched = stats.matched,
            malformed = stats.malformed,
            "parse finished"
        );

        // every worker clone of the sender is gone; this closes the output
        drop(self.output);
        stats
    }

    fn spawn_workers(&self) -> (Vec<mpsc::Sender<RawLine>>, JoinSet<WorkerStats>) {
        let mut senders = Vec::with_capacity(self.options.workers);
        let mut workers = JoinSet::new();

        for id in 0..self.options.workers {
            let (tx, rx) = mpsc::channel(self.options.line_capacity);
            let worker = Worker {
                id,
                lines: rx,
                filters: Arc::clone(&self.filters),
                report: self.options.report,
                output: self.output.clone(),
                errors: self.errors.clone(),
                shutdown: self.shutdown.clone(),
            };
            workers.spawn_on(worker.run(), &self.handle);
            senders.push(tx);
        }

        (senders, workers)
    }

    /// Move `line` into a worker's queue, giving up on shutdown
    fn hand_off(&self, worker: &mpsc::Sender<RawLine>, line: RawLine) -> bool {
        let line = match worker.try_send(line) {
            Ok(()) => return true,
            Err(TrySendError::Closed(_)) => return false,
            Err(TrySendError::Full(line)) => line,
        };
        self.handle.block_on(async {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => false,
                sent = worker.send(line) => sent.is_ok(),
            }
        })
    }

    fn report(&self, err: ParseError) {
        // nobody listening is fine, the output channel still closes
        let _ = self.errors.send(err);
    }
}
