use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use clap::Parser;
use common::{wordcount, MappingRecord, ShuffleResult, Stage};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Worker de una etapa del pipeline. Cada proceso atiende una sola etapa;
/// no sabe nada de ruteo, sólo transforma lo que le llega.
#[derive(Debug, Clone, Parser)]
#[command(name = "worker")]
#[command(about = "Worker de map, shuffle o reduce para el word count distribuido")]
pub struct WorkerArgs {
    /// Etapa que atiende este proceso: map, shuffle o reduce
    #[arg(long, env = "WORKER_STAGE")]
    pub stage: Stage,

    /// Dirección donde escucha
    #[arg(long, env = "WORKER_BIND", default_value = "0.0.0.0:80")]
    pub bind: SocketAddr,
}

pub async fn run(args: WorkerArgs) -> Result<()> {
    // Nombre de host (solo para info)
    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let app = build_router(args.stage);
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", args.bind))?;

    info!(
        "worker {} escuchando en {} (host={})",
        args.stage,
        listener.local_addr()?,
        hostname
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(stage: Stage) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", any(handle))
        .with_state(stage)
}

async fn health() -> &'static str {
    "ok"
}

async fn handle(State(stage): State<Stage>, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        warn!("petición con método no permitido: {}", method);
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }

    match stage {
        Stage::Map => map(&body),
        Stage::Shuffle => shuffle(&body),
        Stage::Reduce => reduce(&body),
    }
}

fn map(body: &[u8]) -> Response {
    let text = String::from_utf8_lossy(body);
    let records = wordcount::map_text(&text);
    info!("map: {} tokens", records.len());
    Json(records).into_response()
}

fn shuffle(body: &[u8]) -> Response {
    let records: Vec<MappingRecord> = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return decode_error(Stage::Shuffle, e),
    };

    let shuffled = wordcount::shuffle_records(records);
    info!("shuffle: {} claves", shuffled.len());
    Json(shuffled).into_response()
}

fn reduce(body: &[u8]) -> Response {
    let shuffled: ShuffleResult = match serde_json::from_slice(body) {
        Ok(s) => s,
        Err(e) => return decode_error(Stage::Reduce, e),
    };

    let counts = match wordcount::reduce_values(shuffled) {
        Ok(c) => c,
        Err(e) => {
            error!("reduce: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };
    info!("reduce: {} claves", counts.len());
    Json(counts).into_response()
}

fn decode_error(stage: Stage, e: serde_json::Error) -> Response {
    error!("{}: error decodificando JSON: {}", stage, e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use common::WordCount;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(stage: Stage, method: Method, body: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method(method)
            .uri("/")
            .body(Body::from(body.to_string()))
            .unwrap();

        let resp = build_router(stage).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn map_tokeniza_en_registros_de_una_clave() {
        let (status, body) = call(Stage::Map, Method::POST, "Lorem, lorem!\nipsum").await;

        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, json!([{"lorem": 1}, {"lorem": 1}, {"ipsum": 1}]));
    }

    #[tokio::test]
    async fn shuffle_agrupa_valores_por_clave() {
        let (status, body) = call(
            Stage::Shuffle,
            Method::POST,
            r#"[{"lorem":1},{"ipsum":1},{"lorem":1}]"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let out: ShuffleResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(out["lorem"], vec![1, 1]);
        assert_eq!(out["ipsum"], vec![1]);
    }

    #[tokio::test]
    async fn reduce_suma_valores() {
        let (status, body) = call(
            Stage::Reduce,
            Method::POST,
            r#"{"lorem":[1,1,1],"sit":[1]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let out: WordCount = serde_json::from_slice(&body).unwrap();
        assert_eq!(out["lorem"], 3);
        assert_eq!(out["sit"], 1);
    }

    #[tokio::test]
    async fn json_invalido_responde_500() {
        let (status, _) = call(Stage::Shuffle, Method::POST, "blah blah").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = call(Stage::Reduce, Method::POST, r#"[{"lorem":1}]"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn reduce_con_suma_que_desborda_responde_500() {
        let body = format!(r#"{{"lorem":[{},1]}}"#, u64::MAX);
        let (status, body) = call(Stage::Reduce, Method::POST, &body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Internal Server Error");
    }

    #[tokio::test]
    async fn metodo_distinto_de_post_responde_405() {
        for stage in [Stage::Map, Stage::Shuffle, Stage::Reduce] {
            let (status, body) = call(stage, Method::GET, "").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body, b"Method Not Allowed");
        }
    }

    #[test]
    fn args_leen_la_etapa() {
        let args = WorkerArgs::try_parse_from(["worker", "--stage", "shuffle"]).unwrap();
        assert_eq!(args.stage, Stage::Shuffle);
        assert!(WorkerArgs::try_parse_from(["worker", "--stage", "join"]).is_err());
    }
}
