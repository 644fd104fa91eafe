//! Terminal user interface for the record screen.
//!
//! The input half of the record flow: a scrolling waveform with a
//! kid-friendly prompt, recording duration and level display, and key
//! handling. The same terminal is reused for the full-screen processing
//! animation while a story is being created.

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Sparkline, Wrap},
};
use std::error::Error;
use std::io::Stdout;
use std::time::{Duration, Instant};

use crate::ui::{enter_fullscreen, leave_fullscreen, ProcessingAnimation};

/// User input command during recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    /// Continue recording (no key pressed)
    Continue,
    /// Finish recording and create the story (Enter key)
    Finish,
    /// Exit without creating a story (Escape or 'q')
    Cancel,
    /// Pause/resume recording (Space key)
    TogglePause,
    /// Switch to typing the story on the website ('t' key)
    TypeInstead,
}

/// Prompt shown above the waveform.
const PROMPT_TITLE: &str = "Tell me about your day!";
const PROMPT_SUBTITLE: &str =
    "What exciting things happened? Press Enter when you're done telling me everything!";

/// Background shared by the record and processing views.
const SCREEN_BG: Color = Color::Rgb(15, 10, 25);
const ACCENT: Color = Color::Rgb(168, 85, 247);
const DIM_TEXT: Color = Color::Rgb(148, 163, 184);

/// Peak value older than this is forgotten.
const PEAK_HOLD_WINDOW: Duration = Duration::from_secs(3);

/// Record screen with waveform visualization.
///
/// Displays the story prompt, real-time volume levels, recording duration,
/// and the animated progress view while the story is created.
pub struct RecordScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    waveform: Vec<u64>,
    last_waveform_push: Instant,
    started_at: Instant,
    sample_rate: u32,
    level: u8,
    peak: u8,
    peak_seen_at: Instant,
    peak_volume_threshold: u8,
    reference_level_db: i8,
    /// Whether recording is currently paused
    pub is_paused: bool,
    /// Pause bookkeeping for the duration display
    paused_total: Duration,
    paused_at: Option<Instant>,
}

impl RecordScreen {
    /// Creates a new record screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(
        sample_rate: u32,
        peak_volume_threshold: u8,
        reference_level_db: i8,
    ) -> Result<Self, Box<dyn Error>> {
        let terminal = enter_fullscreen()?;
        let waveform_width = terminal.size()?.width as usize;

        let now = Instant::now();
        Ok(RecordScreen {
            terminal,
            waveform: vec![0u64; waveform_width],
            last_waveform_push: now,
            started_at: now,
            sample_rate,
            level: 0,
            peak: 0,
            peak_seen_at: now,
            peak_volume_threshold,
            reference_level_db,
            is_paused: false,
            paused_total: Duration::ZERO,
            paused_at: None,
        })
    }

    /// Renders the record screen with current volume and recording duration.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_waveform(&mut self, samples: &[i16]) -> Result<(), Box<dyn Error>> {
        self.update_levels(samples);

        // Scroll the waveform at a fixed cadence, frozen while paused
        if !self.is_paused && self.last_waveform_push.elapsed() >= Duration::from_millis(50) {
            self.waveform.push(self.level as u64);
            self.last_waveform_push = Instant::now();
        }
        self.fit_waveform_to_width(self.terminal.size()?.width as usize);

        let (level, peak) = if self.is_paused {
            (0, 0)
        } else {
            (self.level, self.peak)
        };
        let over_threshold = peak >= self.peak_volume_threshold;
        let elapsed = self.recording_duration();
        let is_paused = self.is_paused;

        self.terminal.draw(|frame| {
            let [prompt_area, wave_area, footer_area] = Layout::vertical([
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .areas(frame.area());

            let prompt = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    PROMPT_TITLE,
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(PROMPT_SUBTITLE, Style::default().fg(DIM_TEXT))),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(prompt, prompt_area);

            let sparkline = Sparkline::default()
                .data(&self.waveform)
                .max(80)
                .style(Style::default().bg(SCREEN_BG).fg(Color::Rgb(217, 170, 255)));
            frame.render_widget(sparkline, wave_area);

            let indicator = if is_paused {
                Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("● ", Style::default().fg(Color::Red))
            };
            let peak_style = if over_threshold {
                Style::default().bg(Color::Red).fg(Color::White)
            } else {
                Style::default()
            };
            let footer = Paragraph::new(Line::from(vec![
                indicator,
                Span::raw(format!(
                    "{}:{:02} / {level}% / ",
                    elapsed.as_secs() / 60,
                    elapsed.as_secs() % 60
                )),
                Span::styled(format!("{peak}%"), peak_style),
                Span::raw("   Enter: create story · Space: pause · t: type instead · Esc: cancel"),
            ]))
            .style(Style::default().fg(DIM_TEXT).bg(SCREEN_BG));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Updates the level meter and held peak from the newest samples.
    ///
    /// The level is the RMS of the last ~50ms of audio expressed in dBFS and
    /// mapped onto 0-100% against the configured reference level.
    fn update_levels(&mut self, samples: &[i16]) {
        if samples.is_empty() {
            self.level = 0;
            return;
        }

        let window = (self.sample_rate as usize / 20).min(samples.len()).max(1);
        let recent = &samples[samples.len() - window..];

        let mean_square =
            recent.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / recent.len() as f64;
        let rms = mean_square.sqrt();
        let db_fs = if rms > 0.0 {
            20.0 * (rms / f64::from(i16::MAX)).log10()
        } else {
            -160.0
        };

        // 100% sits at the reference level, 0% forty dB below it
        let floor_db = f64::from(self.reference_level_db) - 40.0;
        self.level = ((db_fs - floor_db) / 40.0 * 100.0).clamp(4.0, 100.0) as u8;

        if self.level > self.peak || self.peak_seen_at.elapsed() >= PEAK_HOLD_WINDOW {
            self.peak = self.level;
            self.peak_seen_at = Instant::now();
        }
    }

    /// Clamps or left-pads the waveform buffer to the terminal width.
    fn fit_waveform_to_width(&mut self, width: usize) {
        if self.waveform.len() > width {
            let excess = self.waveform.len() - width;
            self.waveform.drain(..excess);
        } else {
            while self.waveform.len() < width {
                self.waveform.insert(0, 0);
            }
        }
    }

    /// Processes user input and returns the appropriate recording command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<RecordingCommand, Box<dyn Error>> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(RecordingCommand::Continue);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(RecordingCommand::Continue);
        };

        let command = match key.code {
            KeyCode::Enter => RecordingCommand::Finish,
            KeyCode::Char('q') | KeyCode::Esc => RecordingCommand::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                RecordingCommand::Cancel
            }
            KeyCode::Char(' ') => {
                self.toggle_pause_state();
                RecordingCommand::TogglePause
            }
            KeyCode::Char('t') => RecordingCommand::TypeInstead,
            _ => RecordingCommand::Continue,
        };

        if command != RecordingCommand::Continue {
            tracing::debug!("Key {:?}: {:?}", key.code, command);
        }
        Ok(command)
    }

    /// Handles pause state transitions, managing pause duration tracking.
    fn toggle_pause_state(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += paused_at.elapsed();
            self.is_paused = false;
        } else {
            self.paused_at = Some(Instant::now());
            self.is_paused = true;
        }
    }

    /// Gets the elapsed recording time, excluding paused duration.
    fn recording_duration(&self) -> Duration {
        let paused = self.paused_total
            + self
                .paused_at
                .map(|at| at.elapsed())
                .unwrap_or(Duration::ZERO);
        self.started_at.elapsed().saturating_sub(paused)
    }

    /// Renders one frame of the story-creation progress animation.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_processing(
        &mut self,
        animation: &mut ProcessingAnimation,
    ) -> Result<(), Box<dyn Error>> {
        self.terminal.draw(|f| {
            let main_area = f.area();
            animation.draw(f, main_area);
        })?;
        animation.update();
        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        leave_fullscreen(&mut self.terminal)?;
        Ok(())
    }
}
