//! HTTP client for the Storytime service.
//!
//! Wraps the two service endpoints: multipart audio upload and JSON story
//! creation. Requests carry an explicit timeout, HTTP failures are mapped to
//! human-readable messages, and both endpoints require their key response
//! field to be present and non-empty.

use anyhow::{anyhow, Result};
use std::time::Duration;

use super::types::{
    CapturePayload, CreateStoryResponse, StoryRequest, UploadResponse, UPLOAD_FIELD,
    UPLOAD_FILE_NAME,
};

/// Client for the Storytime service API.
#[derive(Debug, Clone)]
pub struct StoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoryClient {
    /// Creates a client for the given API base URL.
    ///
    /// Every request is bounded by `timeout`; a request that exceeds it fails
    /// like any other transport error.
    ///
    /// # Errors
    /// - If the underlying HTTP client cannot be constructed
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Uploads captured audio and returns the server-issued upload URL.
    ///
    /// The audio is submitted as multipart form data under the fixed field
    /// name and file name the service expects.
    ///
    /// # Errors
    /// - If the request fails due to network issues (connection, timeout)
    /// - If the service returns a non-success HTTP status
    /// - If the response has no usable `upload_url`
    pub async fn upload_voice(&self, capture: CapturePayload) -> Result<String> {
        let url = format!("{}/api/voice/upload", self.base_url);
        tracing::debug!(
            "Uploading {} bytes ({}) to {url}",
            capture.bytes.len(),
            capture.content_type
        );

        let file_part = reqwest::multipart::Part::bytes(capture.bytes)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(&capture.content_type)
            .map_err(|e| anyhow!("Failed to create file part for upload: {e}"))?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, file_part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        if !response.status().is_success() {
            return Err(status_error("upload", response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse upload response: {e}"))?;

        if body.upload_url.is_empty() {
            return Err(anyhow!("Upload response did not include an upload URL"));
        }

        tracing::debug!("Audio uploaded: {}", body.upload_url);
        Ok(body.upload_url)
    }

    /// Requests story creation and returns the server-issued story id.
    ///
    /// # Errors
    /// - If the request fails due to network issues (connection, timeout)
    /// - If the service returns a non-success HTTP status
    /// - If the response has no usable `story_id`
    pub async fn create_story(&self, request: &StoryRequest) -> Result<String> {
        let url = format!("{}/api/story/create", self.base_url);
        tracing::debug!(
            "Requesting story creation for child '{}' (mood: {})",
            request.child_id,
            request.session_mood
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("story creation", e))?;

        if !response.status().is_success() {
            return Err(status_error("story creation", response).await);
        }

        let body: CreateStoryResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse story creation response: {e}"))?;

        if body.story_id.is_empty() {
            return Err(anyhow!("Story creation response did not include a story id"));
        }

        tracing::debug!("Story created: {}", body.story_id);
        Ok(body.story_id)
    }
}

/// Maps a reqwest transport failure to a human-readable error.
fn transport_error(context: &str, e: reqwest::Error) -> anyhow::Error {
    if e.is_connect() {
        anyhow!(
            "Failed to connect to the Storytime service for {context}. \
             Check your internet connection and [api] base_url in storytime.toml."
        )
    } else if e.is_timeout() {
        anyhow!("The {context} request timed out. The Storytime service is not responding.")
    } else {
        anyhow!("Network error during {context}: {e}")
    }
}

/// Maps a non-success HTTP response to a human-readable error.
async fn status_error(context: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let human_readable = match status.as_u16() {
        400 => format!(
            "The Storytime service rejected the {context} request. \
             The audio may be empty or in an unsupported format."
        ),
        404 => format!(
            "The Storytime service endpoint for {context} was not found. \
             Check [api] base_url in storytime.toml."
        ),
        413 => "The recording is too large for the Storytime service. \
                Try a shorter recording."
            .to_string(),
        429 => "Too many requests to the Storytime service. \
                Please wait a moment and try again."
            .to_string(),
        500..=504 => "The Storytime service is having trouble right now. \
                      Please try again later."
            .to_string(),
        _ => format!("Storytime service error during {context} (status {status}): {error_body}"),
    };

    anyhow!(human_readable)
}
