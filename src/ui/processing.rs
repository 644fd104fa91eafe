//! Full-screen progress view shown while a story is being created.
//!
//! The record screen hands its terminal to this animation once a recording is
//! submitted; the view offers no interaction and runs until the request
//! sequence resolves.

use ratatui::{prelude::*, widgets::Paragraph};

const SPARKLE_FRAMES: &[&str] = &["✶", "✸", "✹", "✺", "✹", "✷"];

const TITLE: &str = "Creating your magical story...";
const SUBTITLE: &str = "The story wizards are working their magic!";

/// Animated "creating your story" view.
pub struct ProcessingAnimation {
    frame_index: usize,
    last_tick: std::time::Instant,
    tick: std::time::Duration,
}

impl ProcessingAnimation {
    /// Creates an animation advancing every `tick_ms` milliseconds.
    pub fn new(tick_ms: u64) -> Self {
        Self {
            frame_index: 0,
            last_tick: std::time::Instant::now(),
            tick: std::time::Duration::from_millis(tick_ms),
        }
    }

    /// Advances the animation if a tick has elapsed.
    pub fn update(&mut self) {
        if self.last_tick.elapsed() >= self.tick {
            self.frame_index = (self.frame_index + 1) % SPARKLE_FRAMES.len();
            self.last_tick = std::time::Instant::now();
        }
    }

    /// Draws one frame of the animation, centered in `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let backdrop = Paragraph::new("").style(Style::default().bg(Color::Rgb(15, 10, 25)));
        frame.render_widget(backdrop, area);

        let sparkle = SPARKLE_FRAMES[self.frame_index];

        let lines = vec![
            Line::from(Span::styled(
                sparkle,
                Style::default().fg(Color::Rgb(250, 204, 21)),
            )),
            Line::from(""),
            Line::from(Span::styled(
                TITLE,
                Style::default()
                    .fg(Color::Rgb(168, 85, 247))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                SUBTITLE,
                Style::default().fg(Color::Rgb(148, 163, 184)),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(ratatui::widgets::Wrap { trim: true });

        let centered_area = Rect {
            x: area.x,
            y: area.y + area.height / 3,
            width: area.width,
            height: area.height - area.height / 3,
        };

        frame.render_widget(paragraph, centered_area);
    }
}
