//! Generic error screen for displaying human-readable error messages.
//!
//! Provides a full-screen error display with centered text and user-friendly
//! formatting. Dismissed by any key press.

use crossterm::event::{self, Event};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::Stdout;
use std::time::Duration;

use super::{enter_fullscreen, leave_fullscreen};

const ERROR_BG: Color = Color::Rgb(190, 24, 60);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);
const ERROR_HINT: Color = Color::Rgb(254, 205, 211);

/// Full-screen error notification dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        Ok(ErrorScreen {
            terminal: enter_fullscreen()?,
        })
    }

    /// Displays an error message and waits for a key press to dismiss it.
    ///
    /// The message wraps to 80% of the screen width; the screen keeps
    /// redrawing so resizes stay readable.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| draw_error(frame, error_message))?;

            if event::poll(Duration::from_millis(100))? {
                if matches!(event::read()?, Event::Key(_)) {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        leave_fullscreen(&mut self.terminal)?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Paints the backdrop and the centered title/message/hint stack.
fn draw_error(frame: &mut Frame, error_message: &str) {
    let area = frame.area();

    frame.render_widget(
        Paragraph::new("").style(Style::default().bg(ERROR_BG)),
        area,
    );

    let on_error = Style::default().fg(ERROR_FG).bg(ERROR_BG);
    let lines = vec![
        Line::from(Span::styled("Uh oh!", on_error.add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(error_message, on_error)),
        Line::from(""),
        Line::from(Span::styled(
            "(press any key)",
            Style::default().fg(ERROR_HINT).bg(ERROR_BG),
        )),
    ];

    let text_area = Rect {
        x: area.x + area.width / 10,
        y: area.y + area.height / 3,
        width: (area.width * 8) / 10,
        height: area.height - area.height / 3,
    };

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        text_area,
    );
}
