//! Navigation to Storytime web pages.
//!
//! The flow only knows app-relative paths ("/kids/story?id=..."); turning a
//! path into a visible page is the navigator's job. The production navigator
//! opens the page in the system browser.

use anyhow::{anyhow, Result};
use std::process::Command;

/// Moves the user to another page of the Storytime app.
pub trait Navigate {
    /// Navigates to an app-relative path such as `/kids/story?id=abc`.
    ///
    /// # Errors
    /// - If the navigation target cannot be opened
    fn push(&self, path: &str) -> Result<()>;
}

/// Opens Storytime pages in the system browser.
///
/// On macOS: uses the `open` command.
/// On Linux: uses `xdg-open`.
/// On Windows: uses `cmd /C start`.
pub struct Browser {
    web_base_url: String,
}

impl Browser {
    pub fn new(web_base_url: impl Into<String>) -> Self {
        Self {
            web_base_url: web_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Navigate for Browser {
    fn push(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.web_base_url, path);
        tracing::info!("Opening {url} in the browser");

        #[cfg(target_os = "macos")]
        let spawned = Command::new("open").arg(&url).spawn();

        #[cfg(target_os = "linux")]
        let spawned = Command::new("xdg-open").arg(&url).spawn();

        #[cfg(target_os = "windows")]
        let spawned = Command::new("cmd").args(["/C", "start", "", &url]).spawn();

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let spawned: std::io::Result<std::process::Child> = Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "no browser launcher for this platform",
        ));

        spawned.map_err(|e| anyhow!("Failed to open browser for {url}: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_strips_trailing_slash_from_base() {
        let browser = Browser::new("http://localhost:3000/");
        assert_eq!(browser.web_base_url, "http://localhost:3000");
    }
}
