//! CLI argument parsing and the parse driver.

pub mod args;

use anyhow::{bail, Result};
use args::Cli;
use clap::Parser;
use fdns::{FilterSet, ParseError, ParseOptions, ReportField};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::output::{is_broken_pipe, OutputFormat, Printer};
use crate::source::{Source, DEFAULT_USER_AGENT};

/// Everything needed for one run, after merging flags and configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: Source,
    pub filters: FilterSet,
    pub options: ParseOptions,
    pub output_format: OutputFormat,
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub verbose: bool,
}

impl Settings {
    /// Merge command-line flags over the configuration file.
    pub fn resolve(cli: Cli, config: Config) -> Result<Self> {
        let source = Source::from_args(cli.file, cli.url)?;

        let filters = FilterSet::builder()
            .records(cli.records)
            .domains(cli.domains)
            .substrings(cli.substrings)
            .build();
        if filters.is_empty() {
            bail!("nothing to match: pass --substrings, or --domains together with --records");
        }

        let mut options = ParseOptions::new().report(
            cli.emit
                .map(ReportField::from)
                .or(config.report)
                .unwrap_or_default(),
        );
        if let Some(workers) = cli.workers.or(config.workers) {
            options = options.workers(workers);
        }

        Ok(Self {
            source,
            filters,
            options,
            output_format: cli.output.or(config.output_format).unwrap_or_default(),
            timeout: cli
                .timeout
                .or(config.timeout_secs)
                .map(Duration::from_secs),
            user_agent: cli
                .user_agent
                .or(config.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            verbose: cli.verbose || config.verbose,
        })
    }
}

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    init_tracing(cli.verbose || config.verbose);

    let settings = Settings::resolve(cli, config)?;
    execute(settings).await
}

/// Stream the dataset and print matches to stdout.
pub async fn execute(settings: Settings) -> Result<ExitCode> {
    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, settings.timeout);

    info!(source = %settings.source, workers = settings.options.workers, "parsing dataset");
    let reader = tokio::select! {
        reader = settings.source.open(&settings.user_agent) => reader?,
        () = cancel.cancelled() => {
            warn!("cancelled before the dataset was opened");
            return Ok(ExitCode::FAILURE);
        }
    };

    let parse = fdns::parse(cancel.clone(), reader, settings.filters, settings.options);
    let (mut output, mut errors, task) = parse.into_parts();

    let verbose = settings.verbose;
    let reporter = tokio::spawn(async move {
        let mut summary = ErrorSummary::default();
        while let Some(err) = errors.recv().await {
            summary.record(&err, verbose);
        }
        summary
    });

    let mut printer = Printer::new(io::stdout(), settings.output_format);
    let mut write_error = None;
    while let Some(item) = output.recv().await {
        if let Err(e) = printer.print(&item) {
            write_error = Some(e);
            break;
        }
    }
    // a closed output channel tells the workers to stop
    drop(output);

    let flushed = printer.finish();
    match write_error.map_or(flushed, Err) {
        Err(e) if is_broken_pipe(&e) => debug!("stdout closed, stopping"),
        Err(e) => {
            cancel.cancel();
            let _ = task.await;
            return Err(e.into());
        }
        Ok(()) => {}
    }

    let stats = task.await?;
    let summary = reporter.await?;
    cancel.cancel();

    info!(
        lines = stats.lines,
        matched = stats.matched,
        malformed = stats.malformed,
        "done"
    );

    Ok(summary.exit_code())
}

/// Tally of errors observed during a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorSummary {
    pub decode: u64,
    pub fatal: u64,
    pub cancelled: bool,
}

impl ErrorSummary {
    /// Count and log one error according to the verbosity policy.
    pub fn record(&mut self, err: &ParseError, verbose: bool) {
        match err {
            ParseError::Decode { line_number, .. } => {
                self.decode += 1;
                if verbose {
                    warn!(line = line_number, "could not parse: {err}");
                }
            }
            ParseError::Cancelled => {
                self.cancelled = true;
                warn!("parse cancelled before the end of the dataset");
            }
            ParseError::Format(_) | ParseError::Io(_) => {
                self.fatal += 1;
                error!("could not parse: {err}");
            }
        }
    }

    /// Returns true if no error of any kind was seen.
    pub const fn is_clean(&self) -> bool {
        self.decode == 0 && self.fatal == 0 && !self.cancelled
    }

    /// Process exit status: success only for a clean run.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn spawn_cancel_triggers(cancel: &CancellationToken, timeout: Option<Duration>) {
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_shutdown() => {
                info!("received shutdown signal");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    });

    if let Some(timeout) = timeout {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(timeout) => {
                    warn!(secs = timeout.as_secs(), "timeout reached");
                    token.cancel();
                }
                () = token.cancelled() => {}
            }
        });
    }
}

/// Wait for SIGINT, SIGTERM or SIGHUP
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "could not install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::hangup())) {
            (Ok(mut term), Ok(mut hup)) => {
                tokio::select! {
                    _ = term.recv() => {},
                    _ = hup.recv() => {},
                }
            }
            _ => {
                warn!("could not install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the matches
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .try_init();
}
