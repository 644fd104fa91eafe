//! Story history viewer.
//!
//! Lists the stories created so far and reopens a selected one in the browser.

use crate::config;
use crate::history::StoryHistory;
use crate::navigation::{Browser, Navigate};
use cliclack::{intro, outro, select};
use console::style;

/// Displays recent stories and opens the selected one.
///
/// # Errors
/// - If configuration cannot be loaded
/// - If the history database cannot be read
/// - If the selected story page cannot be opened
pub async fn handle_history() -> Result<(), anyhow::Error> {
    tracing::info!("=== storytime History Viewer ===");

    let config_data = config::StorytimeConfig::load()
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    let data_dir = StoryHistory::default_data_dir()?;
    let mut history = StoryHistory::new(&data_dir)?;
    let entries = history.recent(20)?;

    if entries.is_empty() {
        println!("No stories created yet. Run 'storytime' to record one!");
        return Ok(());
    }

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    println!("\n ✶ storytime \n");

    intro(style(" history ").on_white().black())?;

    let mut select_prompt = select("Pick a story to open:");
    for (i, entry) in entries.iter().enumerate() {
        let label = format!(
            "{} · {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.story_id
        );
        select_prompt = select_prompt.item(i, label, &entry.mood);
    }
    let selected_idx: usize = select_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;

    let entry = &entries[selected_idx];
    let navigator = Browser::new(&config_data.api.web_base_url);
    navigator.push(&format!(
        "/kids/story?id={}",
        urlencoding::encode(&entry.story_id)
    ))?;

    outro("Story opened in the browser.")?;

    tracing::debug!("History viewer closed");
    Ok(())
}
