//! Diagnostic logging (`SPEC_FULL.md` §10.2), grounded on
//! `cbr9-organizer`'s `organize-cli/src/cmd/logs.rs`: a non-blocking
//! rolling file writer registered as the global `tracing` subscriber.
//! The teacher itself (`renamify-core`/`renamify-cli`) never logs, so
//! this idiom is borrowed from elsewhere in the retrieval pack rather
//! than adapted from the teacher.

use std::path::PathBuf;

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes the global subscriber and returns the guard that must be
/// kept alive for the duration of the process; `None` when `--nolog`
/// suppresses logging entirely (`spec.md` §6).
pub fn init(nolog: bool) -> Option<WorkerGuard> {
    if nolog {
        return None;
    }

    let logs_dir = PathBuf::from(".repath").join("logs");
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S%.3f");
    let file_appender = tracing_appender::rolling::never(&logs_dir, format!("{timestamp}.log"));
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false)
        .with_filter(LevelFilter::TRACE);

    tracing_subscriber::registry().with(file_layer).init();
    tracing::debug!("logging initialized, writing to {}", logs_dir.display());

    Some(guard)
}
