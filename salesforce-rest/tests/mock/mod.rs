//! In-process Salesforce stand-in for integration tests.
//!
//! Every request is recorded; responses are looked up by method and path
//! from canned entries registered by the test.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub const ACCESS_TOKEN: &str = "00Dxx0000001gPL!AQ4AQFakeToken";
pub const CLIENT_ID: &str = "3MVG9test_client_id";
pub const CLIENT_SECRET: &str = "test_client_secret";
pub const USERNAME: &str = "test_user";
pub const PASSWORD: &str = "test_passwordSECURITYTOKEN";
pub const LEAD_ID: &str = "00Qxx0000001gP3EAI";

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Clone)]
enum Canned {
    Json(StatusCode, Value),
    /// Body served verbatim with the given content type.
    Raw(StatusCode, &'static str, String),
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<HashMap<(Method, String), Canned>>>,
}

/// Mock Salesforce server bound to an ephemeral local port.
pub struct MockSalesforce {
    pub base_url: String,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockSalesforce {
    pub async fn spawn() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(dispatch).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}:{}", addr.ip(), addr.port());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    /// Registers the response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.register(method, path, Canned::Json(status, body));
    }

    /// Registers a non-JSON (or empty) response for `method path`.
    pub fn respond_raw(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        content_type: &'static str,
        body: &str,
    ) {
        self.register(method, path, Canned::Raw(status, content_type, body.to_string()));
    }

    fn register(&self, method: Method, path: &str, canned: Canned) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), canned);
    }

    /// Registers a successful token response pointing back at this server.
    pub fn accept_login(&self) {
        self.respond(
            Method::POST,
            "/services/oauth2/token",
            StatusCode::OK,
            token_body(&self.base_url),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockSalesforce {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn dispatch(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body,
    });

    let canned = state.responses.lock().unwrap().get(&(method, path)).cloned();
    match canned {
        Some(Canned::Json(status, body)) => (status, Json(body)).into_response(),
        Some(Canned::Raw(status, content_type, body)) => {
            (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!([{"errorCode": "NOT_FOUND", "message": "The requested resource does not exist"}])),
        )
            .into_response(),
    }
}

pub fn token_body(instance_url: &str) -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "instance_url": instance_url,
        "id": "https://login.salesforce.com/id/00Dxx0000001gPL/005xx000001Sv6e",
        "token_type": "Bearer",
        "issued_at": "1701593100000",
        "signature": "c2lnbmF0dXJlLW9mLWlkLWFuZC1pc3N1ZWQtYXQ="
    })
}

pub fn credentials() -> salesforce_rest::config::Credentials {
    salesforce_rest::config::Credentials::password(CLIENT_ID, CLIENT_SECRET, USERNAME, PASSWORD)
}

pub fn lead_record(api_version: &str) -> Value {
    json!({
        "attributes": {
            "type": "Lead",
            "url": format!("/services/data/v{api_version}/sobjects/Lead/{LEAD_ID}")
        },
        "Id": LEAD_ID,
        "FirstName": "John",
        "LastName": "Doe",
        "Company": "Doe Enterprises",
        "Status": "Open - Not Contacted",
        "IsConverted": false
    })
}
