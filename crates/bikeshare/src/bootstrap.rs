use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use bikeshare_core::models::City;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.bikeshare`, or `./.bikeshare` without a home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bikeshare")
}

/// Create `~/.bikeshare/` if absent and return it.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG`/`INFO`/`WARNING`/`ERROR`/`CRITICAL` level name onto a
/// tracing filter directive. Unknown names fall back to `warn`.
pub fn level_directive(log_level: &str) -> &'static str {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "warn",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Human-readable logs go to stderr. With `log_file`, JSON logs are also
/// written to that file, rotated daily; keep the returned guard alive until
/// exit so buffered lines are flushed.
pub fn setup_logging(
    log_level: &str,
    log_file: Option<&Path>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let directive = level_directive(log_level);

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(directive));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(OsStr::new("bikeshare.log"));
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(directive));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the directory holding the city CSV files.
///
/// Checks, in order:
/// 1. `explicit` (`--data-dir` or `BIKESHARE_DATA_DIR`), returned as given
/// 2. `./data/`
/// 3. the current directory, if it holds at least one city file
/// 4. `~/.bikeshare/data/`
pub fn discover_data_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_data_dir_from(explicit, &cwd, dirs::home_dir().as_deref())
}

fn discover_data_dir_from(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }

    let local_data = cwd.join("data");
    if local_data.is_dir() {
        return Some(local_data);
    }

    if City::ALL.iter().any(|c| cwd.join(c.file_name()).is_file()) {
        return Some(cwd.to_path_buf());
    }

    home.map(|h| h.join(".bikeshare").join("data"))
        .filter(|p| p.is_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
