// ABOUTME: Test servers for geonotes-client integration tests
// ABOUTME: An axum json-server lookalike for /notes and a listener that never answers

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct MockState {
    pub notes: Vec<Value>,
    pub next_id: u64,
    /// Replaces the GET /notes body when set.
    pub list_body: Option<Value>,
    /// Makes GET /notes fail with this status when set.
    pub list_status: Option<u16>,
    /// Forces createdAt on created records when set.
    pub created_at: Option<String>,
    /// Method and path of every /notes request, in order.
    pub requests: Vec<String>,
    /// Bodies received by POST and PUT, in order.
    pub bodies: Vec<Value>,
}

type Shared = Arc<Mutex<MockState>>;

/// In-process notes API bound to an ephemeral port.
pub struct MockServer {
    pub url: String,
    state: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with(Vec::new()).await
    }

    pub async fn start_with(notes: Vec<Value>) -> Self {
        let state = Arc::new(Mutex::new(MockState {
            notes,
            next_id: 42,
            ..MockState::default()
        }));

        let app = Router::new()
            .route("/notes", get(list_notes).post(create_note))
            .route("/notes/{id}", axum::routing::put(update_note).delete(delete_note))
            .route("/echo-headers", get(echo_headers))
            .route("/garbage", get(garbage))
            .route("/empty", get(empty_ok))
            .route("/no-content", get(no_content))
            .route("/teapot", get(teapot))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn set_list_body(&self, body: Value) {
        self.state.lock().unwrap().list_body = Some(body);
    }

    pub fn set_list_status(&self, status: u16) {
        self.state.lock().unwrap().list_status = Some(status);
    }

    pub fn set_created_at(&self, created_at: &str) {
        self.state.lock().unwrap().created_at = Some(created_at.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.lock().unwrap().bodies.clone()
    }

    pub fn stored(&self) -> Vec<Value> {
        self.state.lock().unwrap().notes.clone()
    }
}

/// Accepts connections and holds them open without ever replying.
pub async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// An address nothing listens on.
pub fn closed_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn note_json(id: &str, title: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "photoUri": "",
        "location": null,
        "createdAt": created_at,
    })
}

async fn list_notes(State(state): State<Shared>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("GET /notes".into());
    if let Some(code) = s.list_status {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "list unavailable").into_response();
    }
    let body = s
        .list_body
        .clone()
        .unwrap_or_else(|| Value::Array(s.notes.clone()));
    Json(body).into_response()
}

async fn create_note(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push("POST /notes".into());
    s.bodies.push(body.clone());

    body["id"] = json!(s.next_id.to_string());
    s.next_id += 1;
    if let Some(ts) = s.created_at.clone() {
        body["createdAt"] = json!(ts);
    }
    s.notes.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_note(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push(format!("PUT /notes/{id}"));
    s.bodies.push(body.clone());

    let Some(slot) = s.notes.iter().position(|n| n["id"].as_str() == Some(id.as_str())) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    body["id"] = json!(id);
    s.notes[slot] = body.clone();
    Json(body).into_response()
}

async fn delete_note(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut s = state.lock().unwrap();
    s.requests.push(format!("DELETE /notes/{id}"));

    let before = s.notes.len();
    s.notes.retain(|n| n["id"].as_str() != Some(id.as_str()));
    if s.notes.len() == before {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "content-type": get(header::CONTENT_TYPE.as_str()),
        "accept": get(header::ACCEPT.as_str()),
        "x-trace": get("x-trace"),
    }))
}

async fn garbage() -> Response {
    (StatusCode::OK, "<html>not json</html>").into_response()
}

async fn empty_ok() -> Response {
    StatusCode::OK.into_response()
}

async fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn teapot() -> Response {
    (StatusCode::IM_A_TEAPOT, "short and stout").into_response()
}
