//! Session mood selection.
//!
//! The mood tag colors the story the service creates. It lives in the
//! session store, so it lasts until logout and then resets to neutral.

use crate::session::{SessionStore, MOOD_CHOICES};
use cliclack::{intro, note, outro, select};
use console::style;

/// Shows or sets the session mood.
///
/// With a value, stores it directly. Without one, shows an interactive picker
/// listing the preset moods.
pub async fn handle_mood(value: Option<String>) -> Result<(), anyhow::Error> {
    tracing::info!("=== storytime Mood Command ===");

    let mut session = SessionStore::open();

    if let Some(value) = value {
        session.set_mood(&value)?;
        println!("Session mood set to '{value}'.");
        return Ok(());
    }

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    println!("\n ✶ storytime \n");

    intro(style(" mood ").on_white().black())?;

    let current = session.mood();
    note("current mood", &current)?;

    let mut select_prompt = select("How are you feeling today?");
    for mood in MOOD_CHOICES {
        select_prompt = select_prompt.item(*mood, *mood, "");
    }
    let selected: &str = select_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;

    session.set_mood(selected)?;

    outro(format!("Mood saved: {selected}"))?;

    tracing::info!("Session mood set interactively: {selected}");
    Ok(())
}
