//! Application command handlers for storytime.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command (recording, submission, history viewing).
//!
//! # Commands
//! - `record`: Record a story idea and create a story (default)
//! - `submit`: Submit a previously recorded audio file
//! - `mood`: Show or set the session mood
//! - `history`: Browse stories created so far
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod history;
pub mod list_devices;
pub mod logs;
pub mod mood;
pub mod record;
pub mod submit;

pub use config::handle_config;
pub use history::handle_history;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use mood::handle_mood;
pub use record::handle_record;
pub use submit::handle_submit;
