//! Submit a pre-recorded audio file without recording.
//!
//! Accepts an audio file path and runs the same upload and story-creation
//! sequence as the `record` command, reusing the session mood and configured
//! child identity. Useful for retrying after a failed submission.

use crate::config;
use crate::history::StoryHistory;
use crate::identity::ConfiguredChild;
use crate::navigation::Browser;
use crate::session::SessionStore;
use crate::story::{CapturePayload, StoryClient, StoryFlow};
use std::path::PathBuf;

/// Handles submission of a pre-recorded audio file.
///
/// # Arguments
/// * `file` - Path to the audio file to submit
pub async fn handle_submit(file: PathBuf) -> Result<(), anyhow::Error> {
    tracing::info!("=== storytime Submit Command ===");

    // Validate the input file exists
    if !file.exists() {
        return Err(anyhow::anyhow!("Audio file not found: {}", file.display()));
    }

    tracing::info!("Submitting file: {}", file.display());

    // Load configuration
    let config_data = match config::StorytimeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    let session = SessionStore::open();
    let client = StoryClient::new(&config_data.api.base_url, config_data.api.request_timeout())?;
    let navigator = Browser::new(&config_data.api.web_base_url);
    let identity = ConfiguredChild::new(&config_data.child.id);
    let mut flow = StoryFlow::new(client, navigator, identity, &session);

    let capture = CapturePayload::from_file(&file)?;

    println!("Creating your story (mood: {})...", flow.mood());

    match flow.on_recording_complete(capture).await? {
        Some(story_id) => {
            tracing::info!("Story {story_id} created from {}", file.display());

            let history_result = StoryHistory::default_data_dir()
                .and_then(|dir| StoryHistory::new(&dir))
                .and_then(|mut history| history.save_story(&story_id, flow.mood()));
            if let Err(e) = history_result {
                tracing::warn!("Failed to save story to history: {}", e);
            }

            println!("Your story is ready! Opening it in the browser.");
            Ok(())
        }
        None => Ok(()),
    }
}
