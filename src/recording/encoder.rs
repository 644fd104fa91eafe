//! WebM/Opus encoding via the system ffmpeg binary.
//!
//! The Storytime service expects uploads as WebM audio. The recorder captures
//! raw PCM to a temporary WAV file; this module locates ffmpeg and performs
//! the final encode. Well-known installation directories are checked before
//! falling back to a PATH search, so ffmpeg is found even in environments
//! with a limited PATH setup.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Well-known ffmpeg locations per platform, tried in order.
#[cfg(target_os = "macos")]
const FFMPEG_CANDIDATES: &[&str] = &[
    "/opt/homebrew/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/usr/bin/ffmpeg",
];
#[cfg(target_os = "linux")]
const FFMPEG_CANDIDATES: &[&str] = &[
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/snap/bin/ffmpeg",
];
#[cfg(target_os = "windows")]
const FFMPEG_CANDIDATES: &[&str] = &[
    "C:\\ffmpeg\\bin\\ffmpeg.exe",
    "C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe",
    "C:\\Program Files (x86)\\ffmpeg\\bin\\ffmpeg.exe",
];
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const FFMPEG_CANDIDATES: &[&str] = &[];

/// Encodes a WAV file to WebM/Opus.
///
/// `opus_options` holds extra ffmpeg arguments from configuration, e.g.
/// `-ab 24k`. Mono output is always enforced.
///
/// # Errors
/// - If ffmpeg cannot be located
/// - If the ffmpeg invocation fails
pub fn encode_webm(input_wav: &Path, output_path: &Path, opus_options: &str) -> Result<()> {
    let ffmpeg = find_ffmpeg()?;

    let mut cmd = Command::new(&ffmpeg);
    cmd.args(["-loglevel", "error", "-i"])
        .arg(input_wav)
        .args(["-acodec", "libopus"])
        .args(["-ac", "1"]) // Force mono
        .arg("-y") // Overwrite output
        .args(opus_options.split_whitespace())
        .arg(output_path);

    let output = cmd.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg encode failed: {}", stderr);
        return Err(anyhow!("Audio encoding failed: {stderr}"));
    }

    tracing::debug!("Audio encoded to WebM/Opus: {}", output_path.display());
    Ok(())
}

/// Locates the ffmpeg binary: well-known directories first, then the PATH.
///
/// # Errors
/// - If ffmpeg is not installed anywhere discoverable
pub fn find_ffmpeg() -> Result<PathBuf> {
    if let Some(found) = FFMPEG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    {
        tracing::debug!("Found ffmpeg at: {}", found.display());
        return Ok(found);
    }

    let lookup = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };
    let output = Command::new(lookup)
        .arg("ffmpeg")
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for ffmpeg: {e}"))?;

    if output.status.success() {
        let first_hit = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        if !first_hit.is_empty() {
            tracing::debug!("Found ffmpeg in PATH at: {first_hit}");
            return Ok(PathBuf::from(first_hit));
        }
    }

    Err(anyhow!(
        "ffmpeg not found. Please install it first:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)\n\
         Windows: https://ffmpeg.org/download.html"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ffmpeg() {
        // Succeeds wherever ffmpeg is installed; prints either way
        match find_ffmpeg() {
            Ok(path) => println!("ffmpeg: {}", path.display()),
            Err(e) => println!("ffmpeg unavailable (fine on CI): {e}"),
        }
    }
}
