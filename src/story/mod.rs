//! Story creation pipeline for the Storytime service.
//!
//! Turns a finished recording into a generated story through the service's
//! two-step contract: upload the audio, then request story creation with the
//! session context attached. The flow type owns the processing state while a
//! submission is in flight.

pub mod client;
pub mod flow;
pub mod types;

pub use client::StoryClient;
pub use flow::{StoryFlow, SUBMIT_ERROR_MESSAGE};
pub use types::{CapturePayload, StoryRequest};
