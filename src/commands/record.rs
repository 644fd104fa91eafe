//! Record a story idea and create a story.
//!
//! Handles audio recording with real-time waveform visualization, then drives
//! the story submission flow. On success the story page opens in the browser;
//! on failure the error is shown and the record screen comes back so the
//! child can try again. Supports external finish triggers via SIGUSR1 signal.

use crate::config;
use crate::history::StoryHistory;
use crate::identity::ConfiguredChild;
use crate::navigation::Browser;
use crate::recording::{AudioRecorder, RecordScreen, RecordingCommand};
use crate::session::SessionStore;
use crate::story::{CapturePayload, StoryClient, StoryFlow};
use crate::ui::{ErrorScreen, ProcessingAnimation};

/// What the recording loop ended with.
enum RecordingOutcome {
    /// Enter or SIGUSR1: submit the recording
    Finish,
    /// Escape/q: leave without creating a story
    Cancel,
    /// 't': switch to typing on the website
    TypeInstead,
}

/// Handles recording a story idea and creating a story from it.
///
/// Records audio with real-time waveform visualization, uploads the finished
/// recording and requests story creation, then opens the story page. Any
/// submission failure returns to the record screen.
pub async fn handle_record() -> Result<(), anyhow::Error> {
    tracing::info!("=== storytime Recorder Started ===");

    let config_data = match config::StorytimeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/storytime/storytime.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, api={}",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.api.base_url
    );

    let session = SessionStore::open();
    let client = StoryClient::new(&config_data.api.base_url, config_data.api.request_timeout())?;
    let navigator = Browser::new(&config_data.api.web_base_url);
    let identity = ConfiguredChild::new(&config_data.child.id);
    let mut flow = StoryFlow::new(client, navigator, identity, &session);
    tracing::info!("Session mood: {}", flow.mood());

    let term = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, term.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    // One iteration per attempt: record, submit, and on failure come back here.
    loop {
        term.store(false, std::sync::atomic::Ordering::Relaxed);

        let mut audio_recorder = AudioRecorder::new(
            config_data.audio.sample_rate,
            config_data.audio.device.clone(),
        );

        if let Err(e) = audio_recorder.start_recording() {
            tracing::error!("Failed to start recording: {}", e);
            let error_message = format!(
                "Recording Error:\n\n{e}\n\nPlease check your audio configuration and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(e);
        }

        let actual_sample_rate = audio_recorder.sample_rate();
        let mut screen = RecordScreen::new(
            actual_sample_rate,
            config_data.audio.peak_volume_threshold,
            config_data.audio.reference_level_db,
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

        tracing::debug!(
            "Entering recording loop. Press 'Enter' to create a story or 'Escape'/'q' to cancel."
        );
        let mut frame_count = 0u64;
        let outcome = loop {
            if term.load(std::sync::atomic::Ordering::Relaxed) {
                tracing::info!("Received SIGUSR1: finishing recording via external trigger");
                break RecordingOutcome::Finish;
            }

            match screen.handle_input() {
                Ok(RecordingCommand::Continue) => {
                    frame_count += 1;
                    if frame_count.is_multiple_of(60) {
                        let sample_count = audio_recorder.sample_count();
                        let duration_secs = sample_count as f32 / actual_sample_rate as f32;
                        tracing::debug!("Recording: {:.1}s recorded", duration_secs);
                    }

                    let samples = audio_recorder.samples();
                    screen
                        .render_waveform(&samples)
                        .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
                }
                Ok(RecordingCommand::Finish) => {
                    break RecordingOutcome::Finish;
                }
                Ok(RecordingCommand::Cancel) => {
                    break RecordingOutcome::Cancel;
                }
                Ok(RecordingCommand::TypeInstead) => {
                    break RecordingOutcome::TypeInstead;
                }
                Ok(RecordingCommand::TogglePause) => {
                    audio_recorder.toggle_pause();
                    screen.is_paused = audio_recorder.is_paused();
                    let samples = audio_recorder.samples();
                    screen
                        .render_waveform(&samples)
                        .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
                }
                Err(e) => {
                    tracing::error!("Input handling error: {}", e);
                    screen.cleanup().ok();
                    return Err(anyhow::anyhow!("Input handling error: {e}"));
                }
            }
        };

        match outcome {
            RecordingOutcome::Cancel => {
                audio_recorder.stop_recording(None, &config_data.audio.opus_options)?;
                screen
                    .cleanup()
                    .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;
                tracing::info!("Recording cancelled");
                break;
            }
            RecordingOutcome::TypeInstead => {
                audio_recorder.stop_recording(None, &config_data.audio.opus_options)?;
                screen
                    .cleanup()
                    .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;
                flow.on_type_instead()?;
                break;
            }
            RecordingOutcome::Finish => {
                if audio_recorder.sample_count() == 0 {
                    audio_recorder.stop_recording(None, &config_data.audio.opus_options)?;
                    screen.cleanup().ok();
                    let mut error_screen = ErrorScreen::new()?;
                    error_screen
                        .show_error("We didn't hear anything! Check your microphone and try again.")?;
                    error_screen.cleanup()?;
                    continue;
                }

                tracing::debug!("Stopping recording and encoding audio...");
                let filepath = std::env::temp_dir().join("storytime-recording.webm");
                audio_recorder
                    .stop_recording(Some(filepath.clone()), &config_data.audio.opus_options)
                    .map_err(|e| {
                        tracing::error!("Failed to save recording: {}", e);
                        screen.cleanup().ok();
                        e
                    })?;

                let capture = CapturePayload::from_file(&filepath).map_err(|e| {
                    screen.cleanup().ok();
                    e
                })?;

                // Run the submission while animating the processing screen.
                let mut animation = ProcessingAnimation::new(80);
                let submission = tokio::spawn(async move {
                    let result = flow.on_recording_complete(capture).await;
                    (flow, result)
                });

                loop {
                    if let Err(e) = screen.render_processing(&mut animation) {
                        tracing::warn!("Failed to render animation: {}", e);
                    }

                    if submission.is_finished() {
                        break;
                    }

                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                }

                let (flow_back, result) = submission
                    .await
                    .map_err(|e| anyhow::anyhow!("Submission task failed: {e}"))?;
                flow = flow_back;

                match result {
                    Ok(Some(story_id)) => {
                        save_to_history(&story_id, flow.mood());
                        screen
                            .cleanup()
                            .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;
                        break;
                    }
                    Ok(None) => {
                        // Guard case: nothing submitted, nothing to show.
                        screen.cleanup().ok();
                        break;
                    }
                    Err(e) => {
                        screen.cleanup().ok();
                        let mut error_screen = ErrorScreen::new()?;
                        error_screen.show_error(&e.to_string())?;
                        error_screen.cleanup()?;
                        tracing::info!(
                            "Returning to the record screen (recording kept at {})",
                            filepath.display()
                        );
                        continue;
                    }
                }
            }
        }
    }

    tracing::info!("=== storytime Recorder Exited Successfully ===");
    Ok(())
}

/// Records a created story locally; failures only warn.
fn save_to_history(story_id: &str, mood: &str) {
    let result = StoryHistory::default_data_dir()
        .and_then(|dir| StoryHistory::new(&dir))
        .and_then(|mut history| history.save_story(story_id, mood));
    if let Err(e) = result {
        tracing::warn!("Failed to save story to history: {}", e);
    }
}
