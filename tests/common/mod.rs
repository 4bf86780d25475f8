#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use arena_server::clients::LlmClients;
use arena_server::config::Config;
use arena_server::move_service::LlmMoveService;
use axum::{extract::State, http::StatusCode, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};

/// A running arena server and the URL it listens on.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
}

impl TestApp {
    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET")
            .json()
            .await
            .expect("Response was not JSON")
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to send POST")
    }

    /// Create a match and return its id.
    pub async fn create_match(&self, body: Value) -> u64 {
        let resp = self.post("/api/matches", body).await;
        assert_eq!(resp.status(), 200);
        let snapshot: Value = resp.json().await.unwrap();
        snapshot["id"].as_u64().expect("match id")
    }

    /// Poll a match until `done` holds or a couple of seconds pass.
    pub async fn wait_for(&self, id: u64, done: impl Fn(&Value) -> bool) -> Value {
        let path = format!("/api/matches/{id}");
        for _ in 0..100 {
            let snapshot = self.get_json(&path).await;
            if done(&snapshot) {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("match {id} never reached the expected state");
    }
}

/// What the fake LLM backend answers.
#[derive(Clone)]
pub enum StubReply {
    Text(&'static str),
    Failure,
}

/// Answers every provider's wire format at once with the same text.
async fn stub_handler(State(reply): State<Arc<StubReply>>) -> (StatusCode, Json<Value>) {
    match reply.as_ref() {
        StubReply::Text(text) => (
            StatusCode::OK,
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": text } }],
                "content": [{ "type": "text", "text": text }],
                "candidates": [{ "content": { "parts": [{ "text": text }] } }],
            })),
        ),
        StubReply::Failure => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "overloaded" })),
        ),
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start a fake LLM backend and return its base URL.
pub async fn spawn_llm_stub(reply: StubReply) -> String {
    let app = Router::new()
        .fallback(stub_handler)
        .with_state(Arc::new(reply));
    serve(app).await
}

/// Start the arena server with every provider pointed at a stub.
pub async fn spawn_app(reply: StubReply) -> TestApp {
    let llm_url = spawn_llm_stub(reply).await;
    let config = Config::with_stub_backend(&llm_url);
    let clients = LlmClients::new(&config).expect("Failed to build clients");
    let service = Arc::new(LlmMoveService::new(clients));
    let base_url = serve(arena_server::build_router(&config, service)).await;
    TestApp {
        base_url,
        client: Client::new(),
    }
}

pub fn starting_moves() -> Vec<&'static str> {
    vec![
        "a2a3", "a2a4", "b2b3", "b2b4", "c2c3", "c2c4", "d2d3", "d2d4", "e2e3", "e2e4", "f2f3",
        "f2f4", "g2g3", "g2g4", "h2h3", "h2h4", "b1a3", "b1c3", "g1f3", "g1h3",
    ]
}
