//! Setup module for initial application configuration.
//!
//! Handles first-run setup by creating the config file from the embedded
//! default template.

pub mod version;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/storytime.toml");

/// Runs the setup process if the main config file is missing or outdated.
///
/// Creates the config directory and writes the default config file with the
/// current version on its first line.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn run_setup() -> anyhow::Result<()> {
    let config_path = crate::config::config_path()?;

    let full_config = format!(
        "config_version = \"{}\"\n{}",
        env!("CARGO_PKG_VERSION"),
        DEFAULT_CONFIG
    );
    std::fs::write(&config_path, full_config)?;

    tracing::info!("Default configuration written to {}", config_path.display());
    Ok(())
}
