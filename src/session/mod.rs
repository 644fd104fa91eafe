//! Session-scoped context storage.
//!
//! Holds short-lived values that only make sense for the current login
//! session, most importantly the mood the child picked for this sitting.
//! Values live in a small TOML file under the user's runtime directory, which
//! the OS clears at the end of the session; absence of the file or a value is
//! never an error, callers fall back to defaults.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the session mood is stored.
pub const MOOD_KEY: &str = "currentMood";

/// Mood used when the session has none stored.
pub const DEFAULT_MOOD: &str = "neutral";

/// Moods offered by the interactive picker.
pub const MOOD_CHOICES: &[&str] = &[
    "happy", "excited", "calm", "silly", "sleepy", "brave", "neutral",
];

/// Session-scoped key-value store backed by a TOML file.
pub struct SessionStore {
    path: PathBuf,
    values: toml::Table,
}

impl SessionStore {
    /// Opens the session store in the default session directory.
    ///
    /// Prefers `$XDG_RUNTIME_DIR/storytime` (session-scoped, cleared at
    /// logout); falls back to a per-user directory under the system temp dir.
    pub fn open() -> Self {
        Self::open_in(&session_dir())
    }

    /// Opens the session store in an explicit directory.
    ///
    /// A missing or unreadable file yields an empty store: session values are
    /// best-effort and every read has a default.
    pub fn open_in(dir: &Path) -> Self {
        let path = dir.join("session.toml");
        let values = match fs::read_to_string(&path) {
            Ok(content) => content.parse::<toml::Table>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed session file {}: {e}", path.display());
                toml::Table::new()
            }),
            Err(_) => toml::Table::new(),
        };
        Self { path, values }
    }

    /// Returns a stored string value, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// Returns the mood stored for this session, or the default.
    pub fn mood(&self) -> String {
        self.get(MOOD_KEY).unwrap_or(DEFAULT_MOOD).to_string()
    }

    /// Stores the mood for this session and persists the file.
    ///
    /// # Errors
    /// - If the session directory cannot be created
    /// - If the session file cannot be written
    pub fn set_mood(&mut self, mood: &str) -> Result<()> {
        self.values
            .insert(MOOD_KEY.to_string(), toml::Value::String(mood.to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&self.values)?)?;
        tracing::debug!("Session mood set to '{mood}'");
        Ok(())
    }
}

/// Determines the directory for session-scoped files.
fn session_dir() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join("storytime")
    } else {
        std::env::temp_dir().join(format!("storytime-{}", whoami()))
    }
}

/// Best-effort user name for the temp-dir fallback path.
fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "session".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_defaults_to_neutral_when_unset() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open_in(dir.path());
        assert_eq!(store.mood(), "neutral");
    }

    #[test]
    fn test_mood_round_trips_through_session_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = SessionStore::open_in(dir.path());
        store.set_mood("excited").unwrap();

        let reopened = SessionStore::open_in(dir.path());
        assert_eq!(reopened.mood(), "excited");
    }

    #[test]
    fn test_malformed_session_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("session.toml"), "not = [valid").unwrap();

        let store = SessionStore::open_in(dir.path());
        assert_eq!(store.mood(), "neutral");
    }

    #[test]
    fn test_other_keys_survive_mood_updates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("session.toml"), "favoriteAnimal = \"fox\"\n").unwrap();

        let mut store = SessionStore::open_in(dir.path());
        store.set_mood("calm").unwrap();

        let reopened = SessionStore::open_in(dir.path());
        assert_eq!(reopened.get("favoriteAnimal"), Some("fox"));
        assert_eq!(reopened.mood(), "calm");
    }
}
