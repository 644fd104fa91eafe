//! Display recent log entries from the application.

use crate::logging;
use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

const TAIL_LINES: usize = 50;

/// Shows recent log entries from the application logs.
///
/// Displays the tail of the most recently modified log file. If no logs
/// exist yet, says so instead of failing.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If log files cannot be read
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = logging::log_dir()?;

    let Some(log_file) = latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'storytime' or other commands to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let total = content.lines().count();
    let shown = total.min(TAIL_LINES);

    println!();
    println!(" ✶ storytime ");
    println!();
    if shown < total {
        println!("Showing last {shown} of {total} lines:");
    } else {
        println!("Showing all {total} lines:");
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in content.lines().skip(total - shown) {
        println!("{line}");
    }

    Ok(())
}

/// Finds the most recently modified storytime log file, if any.
fn latest_log(log_dir: &Path) -> Result<Option<PathBuf>, anyhow::Error> {
    if !log_dir.exists() {
        return Ok(None);
    }

    let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = fs::read_dir(log_dir)
        .map_err(|e| anyhow!("Failed to read log directory: {e}"))?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.file_name()
                .and_then(|n| n.to_str())
                .filter(|n| n.contains("storytime.log"))?;
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((modified, path))
        })
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(candidates.into_iter().next().map(|(_, path)| path))
}
