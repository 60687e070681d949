//! In-process stub of the token and trigger endpoints.
//!
//! Binds an axum router on an ephemeral localhost port and records every
//! request so tests can assert on the exact wire traffic.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tokio::task::JoinHandle;

pub const TOKEN_PATH: &str = "/oauth/token";

/// A trigger request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedTrigger {
    pub client_id: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct StubState {
    triggers: Arc<Mutex<Vec<RecordedTrigger>>>,
    token_forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    trigger_responses: Arc<Mutex<HashMap<String, (u16, String)>>>,
    token_response: Arc<Mutex<Option<(u16, String)>>>,
    trigger_delay: Arc<Mutex<Option<Duration>>>,
}

/// Running stub server. Shut down on drop.
pub struct StubServer {
    pub base_url: String,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Self {
        let state = StubState::default();

        let app = Router::new()
            .route("/data-exchange/trigger", get(trigger_handler))
            .route(TOKEN_PATH, post(token_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }

    /// Answer trigger calls for `client_id` with this status and body.
    pub fn set_trigger_response(&self, client_id: i64, status: u16, body: &str) {
        self.state
            .trigger_responses
            .lock()
            .unwrap()
            .insert(client_id.to_string(), (status, body.to_string()));
    }

    /// Answer token calls with this status and body instead of the default token.
    pub fn set_token_response(&self, status: u16, body: &str) {
        *self.state.token_response.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn set_trigger_delay(&self, delay: Duration) {
        *self.state.trigger_delay.lock().unwrap() = Some(delay);
    }

    pub fn trigger_requests(&self) -> Vec<RecordedTrigger> {
        self.state.triggers.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.token_forms.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn trigger_handler(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let client_id = params.get("clientId").cloned();
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.triggers.lock().unwrap().push(RecordedTrigger {
        client_id: client_id.clone(),
        authorization,
    });

    let delay = *state.trigger_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let configured = client_id
        .as_ref()
        .and_then(|id| state.trigger_responses.lock().unwrap().get(id).cloned());
    let (status, body) = configured.unwrap_or_else(|| {
        (
            200,
            format!(r#"{{"clientId":{}}}"#, client_id.unwrap_or_default()),
        )
    });

    (StatusCode::from_u16(status).unwrap(), body)
}

async fn token_handler(
    State(state): State<StubState>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.token_forms.lock().unwrap().push(form);

    let configured = state.token_response.lock().unwrap().clone();
    let (status, body) = configured
        .unwrap_or_else(|| (200, r#"{"access_token":"tok123","token_type":"Bearer"}"#.to_string()));

    (StatusCode::from_u16(status).unwrap(), body)
}
