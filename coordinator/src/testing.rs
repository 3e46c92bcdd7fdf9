//! Workers falsos para los tests: servidores axum reales en 127.0.0.1:0.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use common::{wordcount, MappingRecord, ShuffleResult};
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::net::TcpListener;

use crate::discovery::{Endpoint, WorkerDiscovery};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub enum MockWorker {
    /// Tokeniza de verdad, salvo que el texto contenga "basura": ahí responde no-JSON.
    Map,
    Shuffle,
    Reduce,
    /// Siempre 500.
    Failing,
}

#[derive(Clone)]
struct MockState {
    kind: MockWorker,
    calls: Arc<AtomicUsize>,
}

pub struct MockHandle {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl MockHandle {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(format!("http://{}", self.addr))
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub async fn spawn_worker(kind: MockWorker) -> MockHandle {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route("/", post(handle)).with_state(MockState {
        kind,
        calls: calls.clone(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockHandle { addr, calls }
}

async fn handle(State(state): State<MockState>, body: Bytes) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    match state.kind {
        MockWorker::Map => {
            let text = String::from_utf8_lossy(&body);
            if text.contains("basura") {
                "blah blah".into_response()
            } else {
                Json(wordcount::map_text(&text)).into_response()
            }
        }
        MockWorker::Shuffle => match serde_json::from_slice::<Vec<MappingRecord>>(&body) {
            Ok(records) => Json(wordcount::shuffle_records(records)).into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        },
        MockWorker::Reduce => match serde_json::from_slice::<ShuffleResult>(&body) {
            Ok(shuffled) => match wordcount::reduce_values(shuffled) {
                Ok(counts) => Json(counts).into_response(),
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            },
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        },
        MockWorker::Failing => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Discovery con una lista fija de endpoints distintos (varios workers de shuffle).
pub struct StaticDiscovery(pub Vec<Endpoint>);

#[async_trait]
impl WorkerDiscovery for StaticDiscovery {
    async fn resolve(&self) -> Result<Vec<Endpoint>> {
        Ok(self.0.clone())
    }
}
