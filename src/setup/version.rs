//! Version comparison and migration logic.
//!
//! Handles checking if setup is needed by comparing embedded version with config file version.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Represents a semantic version (major.minor.patch)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Parse a version string like "0.1.0" into a SemanticVersion
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(anyhow!(
                "Invalid version format: '{}'. Expected 'major.minor.patch'",
                version_str
            ));
        };

        let component = |value: &str, label: &str| {
            value
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid {label} version: '{value}'"))
        };

        Ok(SemanticVersion {
            major: component(major, "major")?,
            minor: component(minor, "minor")?,
            patch: component(patch, "patch")?,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reads the config version from the first line of the config file.
///
/// The first line must match `config_version = "X.Y.Z"` (not a comment);
/// anything else counts as an unversioned legacy config.
///
/// # Errors
/// Returns an error if the file can't be read.
fn read_config_version(config_path: &Path) -> anyhow::Result<Option<String>> {
    let file = File::open(config_path)?;
    let first_line = match BufReader::new(file).lines().next() {
        Some(line) => line?,
        None => return Ok(None),
    };

    let version_re = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(version_re
        .captures(&first_line)
        .map(|caps| caps[1].to_string()))
}

/// Determines if setup is needed by checking version and config file existence.
///
/// Setup is needed if:
/// 1. Config file doesn't exist, OR
/// 2. Config file exists but has no version (legacy config), OR
/// 3. Config file version is older than current version
///
/// Returns a description of where the config was before (None when no setup is needed).
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(Some("none (new install)".to_string()));
    }

    let Some(config_version) = read_config_version(config_path)? else {
        return Ok(Some("unknown (legacy config)".to_string()));
    };

    let config_parsed = SemanticVersion::parse(&config_version)?;
    let current_parsed = SemanticVersion::parse(CURRENT_VERSION)?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(Some(config_version)),
        Ordering::Equal => Ok(None),
        Ordering::Greater => {
            // A downgrade shouldn't block startup
            tracing::warn!(
                "Config version {} is newer than app version {}",
                config_version,
                CURRENT_VERSION
            );
            Ok(None)
        }
    }
}

/// Adds or updates the config_version line as the first line of the config file.
///
/// All other content is preserved; any existing config_version line is dropped
/// before the current one is prepended.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let mut updated = vec![format!(r#"config_version = "{}""#, CURRENT_VERSION)];
    updated.extend(
        content
            .lines()
            .filter(|line| !line.trim_start().starts_with("config_version"))
            .map(str::to_string),
    );

    std::fs::write(config_path, updated.join("\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse() {
        let v = SemanticVersion::parse("0.1.5").unwrap();
        assert_eq!(v.major, 0);
        assert_eq!(v.minor, 1);
        assert_eq!(v.patch, 5);
    }

    #[test]
    fn test_semantic_version_comparison() {
        let v1 = SemanticVersion::parse("0.0.4").unwrap();
        let v2 = SemanticVersion::parse("0.0.5").unwrap();
        let v3 = SemanticVersion::parse("0.1.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert_eq!(v1, v1.clone());
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.0").is_err());
        assert!(SemanticVersion::parse("0.0.5.1").is_err());
        assert!(SemanticVersion::parse("invalid").is_err());
    }

    #[test]
    fn test_missing_config_requires_setup() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("storytime.toml");

        let needed = check_setup_needed(&config_path).unwrap();
        assert!(needed.is_some());
    }

    #[test]
    fn test_current_version_needs_no_setup() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("storytime.toml");
        std::fs::write(
            &config_path,
            format!("config_version = \"{}\"\n[api]\n", CURRENT_VERSION),
        )
        .unwrap();

        assert_eq!(check_setup_needed(&config_path).unwrap(), None);
    }

    #[test]
    fn test_update_config_version_replaces_existing_line() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("storytime.toml");
        std::fs::write(
            &config_path,
            "config_version = \"0.0.1\"\n[api]\nbase_url = \"x\"",
        )
        .unwrap();

        update_config_version(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        let first_line = content.lines().next().unwrap();
        assert_eq!(
            first_line,
            format!("config_version = \"{}\"", CURRENT_VERSION)
        );
        assert!(content.contains("base_url = \"x\""));
        assert_eq!(content.matches("config_version").count(), 1);
    }
}
