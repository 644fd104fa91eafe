//! Audio recording feature for storytime.
//!
//! Provides microphone capture, real-time visualization, and user interaction
//! handling for the record screen.

pub mod alsa;
pub mod audio;
pub mod encoder;
pub mod ui;

pub use audio::AudioRecorder;
pub use ui::{RecordScreen, RecordingCommand};
