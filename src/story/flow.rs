//! Story submission flow.
//!
//! The controller behind the record screen: it captures the session mood once
//! at construction, drives the two-step request sequence when a recording
//! completes (upload, then story creation), and opens the results page on
//! success. The processing flag is true while, and only while, the sequence
//! is outstanding; any failure logs the cause, clears the flag so the input
//! screen comes back, and surfaces one generic child-friendly message. No
//! step is retried.

use anyhow::{anyhow, Result};

use crate::identity::ChildIdentity;
use crate::navigation::Navigate;
use crate::session::SessionStore;
use crate::story::client::StoryClient;
use crate::story::types::{CapturePayload, StoryRequest};

/// Message shown to the user when any step of the submission fails.
pub const SUBMIT_ERROR_MESSAGE: &str =
    "Oops! Something went wrong creating your story. Please try again.";

/// Coordinates recording completion, the service calls, and navigation.
pub struct StoryFlow<N, C> {
    client: StoryClient,
    navigator: N,
    identity: C,
    /// Mood tag captured once when the flow is created.
    mood: String,
    /// True while, and only while, the request sequence is outstanding.
    processing: bool,
}

impl<N: Navigate, C: ChildIdentity> StoryFlow<N, C> {
    /// Creates a flow, reading the session mood once from the store.
    pub fn new(client: StoryClient, navigator: N, identity: C, session: &SessionStore) -> Self {
        let mood = session.mood();
        tracing::debug!("Story flow ready (mood: {mood})");
        Self {
            client,
            navigator,
            identity,
            mood,
            processing: false,
        }
    }

    /// Mood captured at construction.
    pub fn mood(&self) -> &str {
        &self.mood
    }

    /// Handles a finished recording.
    ///
    /// Uploads the audio, requests story creation and opens the results page.
    /// The steps are strictly sequential and the first failure aborts the
    /// rest. On success the returned story id has also been recorded in the
    /// navigation path, and the flow stays in the processing state (the user
    /// has left for the results page). On failure the flow is back on the
    /// input screen and the error carries [`SUBMIT_ERROR_MESSAGE`].
    ///
    /// A completion that arrives while a submission is already in flight is
    /// ignored and returns `Ok(None)`.
    ///
    /// # Errors
    /// - If any step of the sequence fails
    pub async fn on_recording_complete(
        &mut self,
        capture: CapturePayload,
    ) -> Result<Option<String>> {
        if self.processing {
            tracing::warn!("Recording completion ignored: a submission is already in flight");
            return Ok(None);
        }
        self.processing = true;

        match self.submit(capture).await {
            Ok(story_id) => {
                tracing::info!("Story created: {story_id}");
                Ok(Some(story_id))
            }
            Err(e) => {
                tracing::error!("Story submission failed: {e:#}");
                self.processing = false;
                Err(anyhow!(SUBMIT_ERROR_MESSAGE))
            }
        }
    }

    /// Secondary action on the input screen: switch to typing the story on
    /// the website instead of recording it.
    ///
    /// # Errors
    /// - If the navigation target cannot be opened
    pub fn on_type_instead(&self) -> Result<()> {
        self.navigator.push("/kids/type")
    }

    /// The fallible step sequence. Upload must resolve before story creation
    /// is issued; navigation only happens once a story id is in hand.
    async fn submit(&self, capture: CapturePayload) -> Result<String> {
        let upload_url = self.client.upload_voice(capture).await?;
        let request = StoryRequest::new(
            upload_url,
            self.identity.child_id().to_string(),
            self.mood.clone(),
        );
        let story_id = self.client.create_story(&request).await?;
        self.navigator
            .push(&format!("/kids/story?id={}", urlencoding::encode(&story_id)))?;
        Ok(story_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ConfiguredChild;
    use axum::{
        extract::{Multipart, State},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    /// Scripted responses plus a record of everything the service saw.
    #[derive(Clone)]
    struct ServerState {
        upload_response: Arc<Mutex<(StatusCode, Value)>>,
        story_response: Arc<Mutex<(StatusCode, Value)>>,
        /// (field name, file name) for each multipart part received
        upload_parts: Arc<Mutex<Vec<(String, String)>>>,
        story_bodies: Arc<Mutex<Vec<Value>>>,
        upload_calls: Arc<Mutex<u32>>,
    }

    fn server_state(upload: (StatusCode, Value), story: (StatusCode, Value)) -> ServerState {
        ServerState {
            upload_response: Arc::new(Mutex::new(upload)),
            story_response: Arc::new(Mutex::new(story)),
            upload_parts: Arc::new(Mutex::new(Vec::new())),
            story_bodies: Arc::new(Mutex::new(Vec::new())),
            upload_calls: Arc::new(Mutex::new(0)),
        }
    }

    async fn handle_upload(
        State(state): State<ServerState>,
        mut multipart: Multipart,
    ) -> (StatusCode, Json<Value>) {
        *state.upload_calls.lock().await += 1;
        while let Some(field) = multipart.next_field().await.expect("multipart field") {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            let _ = field.bytes().await.expect("field bytes");
            state.upload_parts.lock().await.push((name, file_name));
        }
        let (status, body) = state.upload_response.lock().await.clone();
        (status, Json(body))
    }

    async fn handle_create(
        State(state): State<ServerState>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        state.story_bodies.lock().await.push(body);
        let (status, body) = state.story_response.lock().await.clone();
        (status, Json(body))
    }

    async fn spawn_story_server(state: ServerState) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = Router::new()
            .route("/api/voice/upload", post(handle_upload))
            .route("/api/story/create", post(handle_create))
            .with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    /// Navigator that records paths instead of opening a browser.
    #[derive(Clone, Default)]
    struct RecordedNavigator {
        pushes: Arc<StdMutex<Vec<String>>>,
    }

    impl Navigate for RecordedNavigator {
        fn push(&self, path: &str) -> Result<()> {
            self.pushes.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }

    fn flow_for(
        server_url: &str,
        mood: Option<&str>,
        navigator: RecordedNavigator,
    ) -> StoryFlow<RecordedNavigator, ConfiguredChild> {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = SessionStore::open_in(dir.path());
        if let Some(mood) = mood {
            session.set_mood(mood).expect("set mood");
        }
        let client =
            StoryClient::new(server_url, Duration::from_secs(5)).expect("client");
        StoryFlow::new(client, navigator, ConfiguredChild::new("demo_child_123"), &session)
    }

    fn capture() -> CapturePayload {
        CapturePayload::webm(vec![0u8; 64])
    }

    #[tokio::test]
    async fn flow_mood_defaults_to_neutral() {
        let flow = flow_for("http://127.0.0.1:1", None, RecordedNavigator::default());
        assert_eq!(flow.mood(), "neutral");
        assert!(!flow.processing);
    }

    #[tokio::test]
    async fn flow_mood_comes_from_session_store() {
        let flow = flow_for(
            "http://127.0.0.1:1",
            Some("excited"),
            RecordedNavigator::default(),
        );
        assert_eq!(flow.mood(), "excited");
    }

    #[tokio::test]
    async fn successful_submission_navigates_to_story_page() {
        let state = server_state(
            (StatusCode::OK, json!({"upload_url": "https://x/a.webm"})),
            (StatusCode::OK, json!({"story_id": "abc123"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let navigator = RecordedNavigator::default();
        let mut flow = flow_for(&url, None, navigator.clone());

        let story_id = flow
            .on_recording_complete(capture())
            .await
            .expect("submission");
        assert_eq!(story_id.as_deref(), Some("abc123"));

        // One navigation, carrying the story id; the flow stays on the
        // processing screen because the user has left for the results page.
        let pushes = navigator.pushes.lock().unwrap().clone();
        assert_eq!(pushes, vec!["/kids/story?id=abc123".to_string()]);
        assert!(flow.processing);

        // Upload was a single multipart part with the fixed field/file names.
        let parts = state.upload_parts.lock().await.clone();
        assert_eq!(
            parts,
            vec![("file".to_string(), "recording.webm".to_string())]
        );

        // The upload URL flows verbatim into the creation request.
        let bodies = state.story_bodies.lock().await.clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["audio_url"], json!("https://x/a.webm"));
    }

    #[tokio::test]
    async fn upload_http_error_aborts_before_story_creation() {
        let state = server_state(
            (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})),
            (StatusCode::OK, json!({"story_id": "abc123"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let navigator = RecordedNavigator::default();
        let mut flow = flow_for(&url, None, navigator.clone());

        let err = flow
            .on_recording_complete(capture())
            .await
            .expect_err("must fail");
        assert_eq!(err.to_string(), SUBMIT_ERROR_MESSAGE);

        assert!(state.story_bodies.lock().await.is_empty());
        assert!(navigator.pushes.lock().unwrap().is_empty());
        assert!(!flow.processing);
    }

    #[tokio::test]
    async fn upload_without_url_aborts_before_story_creation() {
        let state = server_state(
            (StatusCode::OK, json!({"status": "stored"})),
            (StatusCode::OK, json!({"story_id": "abc123"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let navigator = RecordedNavigator::default();
        let mut flow = flow_for(&url, None, navigator.clone());

        let err = flow
            .on_recording_complete(capture())
            .await
            .expect_err("must fail");
        assert_eq!(err.to_string(), SUBMIT_ERROR_MESSAGE);

        assert!(state.story_bodies.lock().await.is_empty());
        assert!(!flow.processing);
    }

    #[tokio::test]
    async fn missing_story_id_skips_navigation() {
        let state = server_state(
            (StatusCode::OK, json!({"upload_url": "https://x/a.webm"})),
            (StatusCode::OK, json!({"status": "queued"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let navigator = RecordedNavigator::default();
        let mut flow = flow_for(&url, None, navigator.clone());

        let err = flow
            .on_recording_complete(capture())
            .await
            .expect_err("must fail");
        assert_eq!(err.to_string(), SUBMIT_ERROR_MESSAGE);

        assert!(navigator.pushes.lock().unwrap().is_empty());
        assert!(!flow.processing);
    }

    #[tokio::test]
    async fn creation_request_carries_session_context_and_fixed_fields() {
        let state = server_state(
            (StatusCode::OK, json!({"upload_url": "https://x/a.webm"})),
            (StatusCode::OK, json!({"story_id": "abc123"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let mut flow = flow_for(&url, Some("excited"), RecordedNavigator::default());

        flow.on_recording_complete(capture())
            .await
            .expect("submission");

        let bodies = state.story_bodies.lock().await.clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["session_mood"], json!("excited"));
        assert_eq!(bodies[0]["child_id"], json!("demo_child_123"));
        assert_eq!(bodies[0]["educational_focus"], json!(["sharing", "nature"]));
        assert_eq!(bodies[0]["include_elements"], json!([]));
    }

    #[tokio::test]
    async fn completion_while_in_flight_is_ignored() {
        let state = server_state(
            (StatusCode::OK, json!({"upload_url": "https://x/a.webm"})),
            (StatusCode::OK, json!({"story_id": "abc123"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let mut flow = flow_for(&url, None, RecordedNavigator::default());
        flow.processing = true;

        let outcome = flow
            .on_recording_complete(capture())
            .await
            .expect("ignored, not failed");
        assert_eq!(outcome, None);
        assert_eq!(*state.upload_calls.lock().await, 0);
        assert!(flow.processing);
    }

    #[tokio::test]
    async fn story_id_is_percent_encoded_in_results_path() {
        let state = server_state(
            (StatusCode::OK, json!({"upload_url": "https://x/a.webm"})),
            (StatusCode::OK, json!({"story_id": "abc 123/x"})),
        );
        let url = spawn_story_server(state.clone()).await;
        let navigator = RecordedNavigator::default();
        let mut flow = flow_for(&url, None, navigator.clone());

        flow.on_recording_complete(capture())
            .await
            .expect("submission");

        let pushes = navigator.pushes.lock().unwrap().clone();
        assert_eq!(pushes, vec!["/kids/story?id=abc%20123%2Fx".to_string()]);
    }

    #[tokio::test]
    async fn type_instead_navigates_to_type_page() {
        let navigator = RecordedNavigator::default();
        let flow = flow_for("http://127.0.0.1:1", None, navigator.clone());

        flow.on_type_instead().expect("navigate");

        let pushes = navigator.pushes.lock().unwrap().clone();
        assert_eq!(pushes, vec!["/kids/type".to_string()]);
    }
}
