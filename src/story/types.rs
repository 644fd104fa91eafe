//! Wire types for the Storytime service API.
//!
//! Request and response bodies for the upload and story-creation endpoints,
//! plus the captured-audio payload handed over by the recorder.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Multipart field name the upload endpoint expects.
pub const UPLOAD_FIELD: &str = "file";

/// File name the captured audio is submitted under.
pub const UPLOAD_FILE_NAME: &str = "recording.webm";

/// Educational themes every created story is steered toward.
pub const EDUCATIONAL_FOCUS: &[&str] = &["sharing", "nature"];

/// Captured audio handed from the recorder to the story flow.
#[derive(Debug, Clone)]
pub struct CapturePayload {
    /// Encoded audio bytes
    pub bytes: Vec<u8>,
    /// MIME type of the encoded audio
    pub content_type: String,
}

impl CapturePayload {
    /// Wraps already-encoded WebM audio.
    pub fn webm(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "audio/webm".to_string(),
        }
    }

    /// Reads a payload from disk, inferring the content type from the file extension.
    ///
    /// # Errors
    /// - If the file cannot be read
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow!("Failed to read audio file {}: {e}", path.display()))?;

        let content_type = match path.extension().and_then(|e| e.to_str()) {
            Some("webm") => "audio/webm",
            Some("ogg") | Some("oga") => "audio/ogg",
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("m4a") => "audio/mp4",
            _ => "application/octet-stream",
        };

        Ok(Self {
            bytes,
            content_type: content_type.to_string(),
        })
    }
}

/// Body of a story-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct StoryRequest {
    /// Server-issued URL of the uploaded audio
    pub audio_url: String,
    /// Child the story is attributed to
    pub child_id: String,
    /// Mood tag captured for this session
    pub session_mood: String,
    /// Educational themes to weave into the story
    pub educational_focus: Vec<String>,
    /// Extra elements the story should include
    pub include_elements: Vec<String>,
}

impl StoryRequest {
    /// Builds a request with the fixed focus fields filled in.
    pub fn new(audio_url: String, child_id: String, session_mood: String) -> Self {
        Self {
            audio_url,
            child_id,
            session_mood,
            educational_focus: EDUCATIONAL_FOCUS.iter().map(|s| s.to_string()).collect(),
            include_elements: Vec::new(),
        }
    }
}

/// Response from the upload endpoint.
///
/// A missing `upload_url` deserializes to an empty string; the client treats
/// missing and empty identically.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub upload_url: String,
}

/// Response from the story-creation endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateStoryResponse {
    #[serde(default)]
    pub story_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_request_carries_fixed_focus_fields() {
        let request = StoryRequest::new(
            "https://uploads.example/a.webm".to_string(),
            "demo_child_123".to_string(),
            "neutral".to_string(),
        );

        assert_eq!(request.educational_focus, vec!["sharing", "nature"]);
        assert!(request.include_elements.is_empty());
    }

    #[test]
    fn test_upload_response_defaults_missing_url_to_empty() {
        let response: UploadResponse = serde_json::from_str("{\"status\": \"ok\"}").unwrap();
        assert!(response.upload_url.is_empty());
    }

    #[test]
    fn test_payload_content_type_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.ogg");
        std::fs::write(&path, b"audio").unwrap();

        let payload = CapturePayload::from_file(&path).unwrap();
        assert_eq!(payload.content_type, "audio/ogg");
        assert_eq!(payload.bytes, b"audio");
    }
}
