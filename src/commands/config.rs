//! Configuration file editor command.
//!
//! Opens the storytime configuration file in the user's preferred editor.

use crate::config;
use std::process::Command;

/// Opens the storytime configuration file in the user's preferred editor.
///
/// Honors $EDITOR, then falls back to nano and finally vi.
///
/// # Errors
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config::config_path()?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = pick_editor().ok_or_else(|| {
        anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable.")
    })?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Picks the first usable editor: $EDITOR, then nano, then vi.
fn pick_editor() -> Option<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Some(editor);
        }
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| {
            Command::new("which")
                .arg(editor)
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false)
        })
        .map(str::to_string)
}
