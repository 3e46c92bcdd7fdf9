use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::Stage;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errores internos del pipeline. Nunca salen tal cual al cliente: el handler
/// los loguea y responde un 500 genérico.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage}: no se pudo contactar {endpoint}: {source}")]
    Transport {
        stage: Stage,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage}: {endpoint} respondió {status}")]
    WorkerStatus {
        stage: Stage,
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("{stage}: respuesta inválida de {endpoint}: {source}")]
    Decode {
        stage: Stage,
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{stage}: no se pudo serializar el payload: {source}")]
    Encode {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuración inválida: {0}")]
    Config(String),

    #[error("no se pudieron resolver los workers de {service}: {reason}")]
    Discovery { service: String, reason: String },

    #[error("método no permitido: {0}")]
    Method(String),

    #[error("no se pudo leer el cuerpo de la petición: {0}")]
    Body(String),

    #[error("{stage}: la clave {key:?} llegó desde más de un worker")]
    InvariantViolation { stage: Stage, key: String },

    #[error("{stage}: una tarea de despacho terminó sin reportar resultado")]
    WorkerTask { stage: Stage },
}

/// Hacia afuera sólo hay dos resultados posibles: éxito o un fallo opaco.
/// El detalle queda en los logs.
impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        match self {
            PipelineError::Method(_) => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        }
    }
}
