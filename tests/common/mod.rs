//! In-process mock node serving the broadcast and polling endpoints.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

pub const HASH: &str = "a022978a4cbd6e14e21928e29a756bad04f8e9be93bba91a67e4485e4e9a5875";

struct NodeState {
    broadcast_status: StatusCode,
    statuses: Mutex<VecDeque<&'static str>>,
    payloads: Mutex<Vec<Value>>,
    polls: AtomicUsize,
}

pub struct MockNode {
    addr: SocketAddr,
    state: Arc<NodeState>,
}

impl MockNode {
    /// Serve on an ephemeral port. Status queries for [`HASH`] answer with
    /// `statuses` in order, then `CONFIRMED`; any other hash is `DNE`.
    pub async fn spawn(broadcast_status: StatusCode, statuses: &[&'static str]) -> Self {
        let state = Arc::new(NodeState {
            broadcast_status,
            statuses: Mutex::new(statuses.iter().copied().collect()),
            payloads: Mutex::default(),
            polls: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/broadcast", post(broadcast))
            .route("/check/:hash", get(check))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn broadcast_url(&self) -> String {
        format!("http://{}/broadcast", self.addr)
    }

    pub fn polling_url(&self) -> String {
        format!("http://{}/check", self.addr)
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.state.payloads.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }
}

async fn broadcast(State(state): State<Arc<NodeState>>, Json(body): Json<Value>) -> Response {
    state.payloads.lock().unwrap().push(body);
    if state.broadcast_status != StatusCode::OK {
        return (state.broadcast_status, "broadcast rejected").into_response();
    }
    Json(json!({ "tx_hash": HASH })).into_response()
}

async fn check(State(state): State<Arc<NodeState>>, Path(hash): Path<String>) -> Response {
    state.polls.fetch_add(1, Ordering::SeqCst);
    let status = if hash == HASH {
        state
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or("CONFIRMED")
    } else {
        "DNE"
    };
    Json(json!({ "tx_status": status })).into_response()
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
