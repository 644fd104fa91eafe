//! Story history storage and retrieval using SQLite.
//!
//! Manages a persistent record of every story created from this machine,
//! with the mood it was created under, so stories can be reopened later.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// A single created story in the history.
#[derive(Debug, Clone)]
pub struct StoryEntry {
    /// Local row id
    pub id: i64,
    /// Server-issued story identifier
    pub story_id: String,
    /// Session mood the story was created under
    pub mood: String,
    /// When the story was created
    pub created_at: DateTime<Local>,
}

/// Manages the story history database.
pub struct StoryHistory {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl StoryHistory {
    /// Creates a new story history for the given data directory.
    ///
    /// # Arguments
    /// * `data_dir` - Directory where the database file will be stored
    ///
    /// # Errors
    /// - If the data directory cannot be created
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let database_path = data_dir.join("story_history.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Returns the default data directory for story history.
    ///
    /// # Errors
    /// - If the home directory cannot be determined
    pub fn default_data_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(home.join(".local").join("share").join("storytime"))
    }

    /// Initializes database connection and creates tables if necessary.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS stories (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    story_id TEXT NOT NULL,
                    mood TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Saves a created story to the history database.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If insertion fails
    pub fn save_story(&mut self, story_id: &str, mood: &str) -> Result<()> {
        let connection = self.get_connection()?;
        let timestamp = Local::now().to_rfc3339();

        connection.execute(
            "INSERT INTO stories (story_id, mood, created_at) VALUES (?1, ?2, ?3)",
            params![story_id, mood, timestamp],
        )?;

        tracing::debug!("Story {story_id} saved to history");
        Ok(())
    }

    /// Retrieves the most recent stories, newest first.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    /// - If timestamp parsing fails
    pub fn recent(&mut self, limit: usize) -> Result<Vec<StoryEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, story_id, mood, created_at FROM stories
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let entries = statement
            .query_map(params![limit as i64], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

/// Maps a `stories` row to an entry, parsing the stored RFC 3339 timestamp.
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoryEntry> {
    let timestamp: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&timestamp)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidParameterName("Invalid timestamp format".to_string())
        })?;

    Ok(StoryEntry {
        id: row.get(0)?,
        story_id: row.get(1)?,
        mood: row.get(2)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_list_stories() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = StoryHistory::new(dir.path()).unwrap();

        history.save_story("story_a", "neutral").unwrap();
        history.save_story("story_b", "excited").unwrap();

        let entries = history.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].story_id, "story_b");
        assert_eq!(entries[0].mood, "excited");
        assert_eq!(entries[1].story_id, "story_a");
    }

    #[test]
    fn test_recent_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = StoryHistory::new(dir.path()).unwrap();

        for i in 0..5 {
            history.save_story(&format!("story_{i}"), "calm").unwrap();
        }

        let entries = history.recent(3).unwrap();
        assert_eq!(entries.len(), 3);
    }
}
