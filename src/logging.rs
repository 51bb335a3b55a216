use crate::models::LoggingSettings;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter. `RUST_LOG` wins over the configured debug flag.
pub fn build_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Create the log directory if needed
pub fn ensure_log_dir(log_dir: &str) -> Result<()> {
    let log_path = Utf8Path::new(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}

/// Install the global subscriber: a daily rotating log file plus optional stderr output.
///
/// The file is plain text unless `settings.json` asks for one JSON object per line.
/// Snapshots are rendered on stdout, so console logging never shares that stream.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(settings: &LoggingSettings) -> Result<WorkerGuard> {
    ensure_log_dir(&settings.directory)?;

    let file_appender = rolling::daily(&settings.directory, &settings.prefix);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let text_file = (!settings.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
    });

    let json_file = settings.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(false)
            .with_thread_ids(true)
    });

    let console = settings.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(build_filter(settings.debug))
        .with(text_file)
        .with(json_file)
        .with(console)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        directory = %settings.directory,
        prefix = %settings.prefix,
        debug = settings.debug,
        json = settings.json,
        console = settings.console,
        "Logging initialized"
    );

    Ok(guard)
}
