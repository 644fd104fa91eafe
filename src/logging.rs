//! Structured logging for storytime using the tracing crate.
//!
//! Configures a rolling file logger that writes to daily-rotated log files.
//! Follows the XDG Base Directory Specification for log file placement.
//! Does not output to terminal to avoid interfering with the TUI.
//! Automatically cleans up old log files, keeping only the 7 most recent days.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Daily log files kept before cleanup removes the oldest.
const MAX_LOG_FILES: usize = 7;

/// Global non-blocking guard holder to keep the appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes the logging system with file-based output.
///
/// Sets up a non-blocking rolling file appender that rotates daily.
/// Log level is controlled by the RUST_LOG environment variable (defaults to "info").
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If the subscriber initialization fails
pub fn init_logging() -> Result<(), anyhow::Error> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    if let Err(e) = cleanup_old_logs(&dir) {
        eprintln!("Warning: Failed to cleanup old logs: {}", e);
    }

    let (non_blocking, guard) =
        tracing_appender::non_blocking(rolling::daily(&dir, "storytime.log"));

    // The guard must outlive the program or buffered lines are lost
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", dir.display());
    Ok(())
}

/// Determines the log directory, following XDG Base Directory Specification.
///
/// Prefers XDG_STATE_HOME if set, otherwise uses ~/.local/state/storytime.
/// The directory is not created here.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn log_dir() -> Result<PathBuf, anyhow::Error> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg_state).join("storytime"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/storytime"))
}

/// Removes dated log files beyond the [`MAX_LOG_FILES`] most recent.
///
/// The rolling appender names files `storytime.log.YYYY-MM-DD`, so a reverse
/// lexicographic sort of the file names is newest-first.
///
/// # Errors
/// - If the log directory cannot be read
fn cleanup_old_logs(dir: &PathBuf) -> Result<(), anyhow::Error> {
    let mut dated_logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| Some(entry.ok()?.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.strip_prefix("storytime.log.").is_some_and(is_date_suffix))
        })
        .collect();

    dated_logs.sort();
    dated_logs.reverse();

    for path in dated_logs.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

/// Matches the appender's `YYYY-MM-DD` rotation suffix.
fn is_date_suffix(suffix: &str) -> bool {
    suffix.len() == 10
        && suffix
            .chars()
            .enumerate()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_suffix_matching() {
        assert!(is_date_suffix("2025-08-05"));
        assert!(!is_date_suffix("2025-8-5"));
        assert!(!is_date_suffix("latest"));
        assert!(!is_date_suffix("2025-08-05.bak"));
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=9 {
            let name = format!("storytime.log.2025-08-{day:02}");
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::write(dir.path().join("storytime.log.other"), "x").unwrap();

        cleanup_old_logs(&dir.path().to_path_buf()).unwrap();

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| Some(e.ok()?.file_name().to_string_lossy().into_owned()))
            .collect();
        remaining.sort();

        // 7 newest dated files plus the non-dated one survive
        assert_eq!(remaining.len(), 8);
        assert!(remaining.contains(&"storytime.log.other".to_string()));
        assert!(!remaining.contains(&"storytime.log.2025-08-01".to_string()));
        assert!(!remaining.contains(&"storytime.log.2025-08-02".to_string()));
    }
}
