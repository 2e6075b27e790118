//! Log subscriber setup shared by both services.
//!
//! Records written through the `log` macros land in two places: a terse
//! console stream for interactive runs, and a daily-rotated file under the
//! log directory for operators. Rotation is handled by `tracing-appender`;
//! retention is an age-based sweep over the rotated files run once at start.
//!
//! Environment knobs:
//! * `RUST_LOG`: standard filter directives, default `info`.
//! * `LOG_DIR`: where rotated files go, default `runtime/log`.
//! * `LOG_MAX_AGE_DAYS`: retention window for rotated files, default 1095.

use std::{env, fs, path::Path};

use chrono::{NaiveDate, Utc};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_DIR: &str = "runtime/log";
const DEFAULT_MAX_AGE_DAYS: i64 = 1095;

/// Keeps the non-blocking file writer alive. Drop it and buffered records are
/// flushed; hold it for the lifetime of the process.
pub struct LogHandle {
    _guard: WorkerGuard,
}

/// Install the global subscriber for a service. `service` becomes the rotated
/// file prefix, e.g. `mart.log.2026-08-02`.
pub fn init(service: &str) -> LogHandle {
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let max_age_days = env::var("LOG_MAX_AGE_DAYS").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_MAX_AGE_DAYS);
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Could not create log directory {log_dir}: {e}");
    }
    let prefix = format!("{service}.log");
    if let Err(e) = sweep_old_logs(Path::new(&log_dir), &prefix, max_age_days) {
        eprintln!("Log retention sweep failed: {e}");
    }

    let appender = tracing_appender::rolling::daily(&log_dir, &prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init rather than init: tests install their own subscriber first.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init();
    LogHandle { _guard: guard }
}

/// Delete rotated files whose date suffix is older than the retention window.
/// Files that do not carry a `{prefix}.YYYY-MM-DD` name are left alone.
fn sweep_old_logs(dir: &Path, prefix: &str, max_age_days: i64) -> std::io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    let cutoff = Utc::now().date_naive() - chrono::Duration::days(max_age_days);
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(date_part) = name.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('.')) else { continue };
        let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else { continue };
        if date < cutoff {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
