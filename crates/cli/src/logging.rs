use notedex_core::config::LoggingConfig;
use std::fs::{self, File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);

/// Install the stderr layer and, if a log file is configured, a file layer
/// with its own level. `RUST_LOG` overrides both defaults.
pub fn init(logging: &LoggingConfig) -> std::io::Result<()> {
    let stderr_level = parse_level(&logging.level).unwrap_or(LevelFilter::INFO);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(filter_for(stderr_level));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some(path) = logging.file.as_deref() else {
        registry.init();
        return Ok(());
    };

    let file_level = logging
        .file_level
        .as_deref()
        .and_then(parse_level)
        .or_else(|| parse_level(&logging.level))
        .unwrap_or(LevelFilter::DEBUG);

    let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
    if let Ok(mut g) = LOG_GUARD.lock() {
        *g = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter_for(file_level));

    registry.with(file_layer).init();
    Ok(())
}

fn filter_for(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}

/// Append to the log so repeated runs (and long `watch` sessions) keep history.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}
