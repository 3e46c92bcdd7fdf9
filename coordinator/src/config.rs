use clap::Parser;
use std::net::SocketAddr;

use crate::error::{PipelineError, Result};

/// Configuración del coordinador. Se lee una sola vez al arrancar
/// (flags o variables de entorno) y se valida antes de levantar el servidor.
#[derive(Debug, Clone, Parser)]
#[command(name = "coordinator")]
#[command(about = "Coordinador del word count distribuido (map -> shuffle -> reduce)")]
pub struct CoordinatorConfig {
    /// Dirección donde escucha el coordinador
    #[arg(long, env = "COORDINATOR_BIND", default_value = "0.0.0.0:80")]
    pub bind: SocketAddr,

    /// Cantidad de peticiones por etapa para map y reduce
    #[arg(long, env = "HTTP_WORKERS_NUM", default_value_t = 3)]
    pub workers: usize,

    #[arg(long, env = "MAP_SVC_NAME", default_value = "map")]
    pub map_host: String,

    #[arg(long, env = "MAP_SVC_PORT", default_value_t = 80)]
    pub map_port: u16,

    /// Nombre DNS que resuelve a todos los workers de shuffle
    #[arg(long, env = "SHUFFLE_SVC_NAME", default_value = "shuffle")]
    pub shuffle_service: String,

    #[arg(long, env = "SHUFFLE_SVC_PORT", default_value_t = 80)]
    pub shuffle_port: u16,

    #[arg(long, env = "REDUCE_SVC_NAME", default_value = "reduce")]
    pub reduce_host: String,

    #[arg(long, env = "REDUCE_SVC_PORT", default_value_t = 80)]
    pub reduce_port: u16,

    /// Tamaño máximo del texto aceptado por petición
    #[arg(long, env = "COORDINATOR_MAX_BODY_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_body_bytes: usize,
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PipelineError::Config(
                "HTTP_WORKERS_NUM debe ser >= 1".to_string(),
            ));
        }

        if self.max_body_bytes == 0 {
            return Err(PipelineError::Config(
                "COORDINATOR_MAX_BODY_BYTES debe ser > 0".to_string(),
            ));
        }

        let ports = [
            ("MAP_SVC_PORT", self.map_port),
            ("SHUFFLE_SVC_PORT", self.shuffle_port),
            ("REDUCE_SVC_PORT", self.reduce_port),
        ];
        for (name, port) in ports {
            if port == 0 {
                return Err(PipelineError::Config(format!("{name} no puede ser 0")));
            }
        }

        let names = [
            ("MAP_SVC_NAME", &self.map_host),
            ("SHUFFLE_SVC_NAME", &self.shuffle_service),
            ("REDUCE_SVC_NAME", &self.reduce_host),
        ];
        for (name, value) in names {
            if value.trim().is_empty() {
                return Err(PipelineError::Config(format!("{name} está vacío")));
            }
        }

        Ok(())
    }
}
