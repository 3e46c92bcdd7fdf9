use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use common::WordCount;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::state::AppState;

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        // el método se revisa antes de tocar el cuerpo
        .route("/", post(count_words).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed(method: Method) -> PipelineError {
    warn!("petición con método no permitido: {}", method);
    PipelineError::Method(method.to_string())
}

// Recibe el texto crudo y devuelve {palabra: conteo}
async fn count_words(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<WordCount>, PipelineError> {
    // un cuerpo que excede el límite también sale como 500 genérico
    let body = body.map_err(|rejection| {
        error!("cuerpo rechazado: {}", rejection.body_text());
        PipelineError::Body(rejection.body_text())
    })?;

    let content = String::from_utf8_lossy(&body);

    match state.orchestrator.run(&content).await {
        Ok(counts) => {
            let preview: String = content.chars().take(8).collect();
            info!("palabras contadas en: {}...", preview);
            Ok(Json(counts))
        }
        Err(e) => {
            error!("falló el conteo: {}", e);
            Err(e)
        }
    }
}
