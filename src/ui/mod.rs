//! Shared full-screen views and terminal plumbing.

pub mod error;
pub mod processing;

pub use error::ErrorScreen;
pub use processing::ProcessingAnimation;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, Stdout};

/// Enables raw mode and enters the alternate screen.
///
/// # Errors
/// - If the terminal cannot be initialized
pub fn enter_fullscreen() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Leaves the alternate screen and restores the terminal.
///
/// # Errors
/// - If terminal mode cannot be disabled
/// - If the cursor cannot be shown
pub fn leave_fullscreen(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
