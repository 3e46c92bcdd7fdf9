use async_trait::async_trait;
use std::{collections::HashSet, fmt};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// URL base de un worker, ej: `http://map:80`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self(base_url.into())
    }

    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self(format!("http://{}:{}", host, port))
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resuelve los endpoints vivos de una etapa, en un orden estable.
#[async_trait]
pub trait WorkerDiscovery: Send + Sync {
    async fn resolve(&self) -> Result<Vec<Endpoint>>;
}

/// Pool fijo: un único endpoint lógico repetido `size` veces.
/// El listener del otro lado se encarga de la concurrencia.
#[derive(Debug, Clone)]
pub struct FixedPool {
    endpoint: Endpoint,
    size: usize,
}

impl FixedPool {
    pub fn new(endpoint: Endpoint, size: usize) -> Self {
        Self { endpoint, size }
    }
}

#[async_trait]
impl WorkerDiscovery for FixedPool {
    async fn resolve(&self) -> Result<Vec<Endpoint>> {
        if self.size == 0 {
            return Err(PipelineError::Config(format!(
                "pool vacío para {}",
                self.endpoint
            )));
        }
        Ok(vec![self.endpoint.clone(); self.size])
    }
}

/// Descubrimiento por DNS: un worker por cada dirección distinta del servicio.
#[derive(Debug, Clone)]
pub struct DnsDiscovery {
    service: String,
    port: u16,
}

impl DnsDiscovery {
    pub fn new(service: impl Into<String>, port: u16) -> Self {
        Self {
            service: service.into(),
            port,
        }
    }
}

#[async_trait]
impl WorkerDiscovery for DnsDiscovery {
    async fn resolve(&self) -> Result<Vec<Endpoint>> {
        let addrs = tokio::net::lookup_host((self.service.as_str(), self.port))
            .await
            .map_err(|e| PipelineError::Discovery {
                service: self.service.clone(),
                reason: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        let endpoints: Vec<Endpoint> = addrs
            .filter(|addr| seen.insert(*addr))
            .map(|addr| Endpoint::new(format!("http://{}", addr)))
            .collect();

        if endpoints.is_empty() {
            return Err(PipelineError::Discovery {
                service: self.service.clone(),
                reason: "sin direcciones".to_string(),
            });
        }

        debug!("{} resolvió a {} workers", self.service, endpoints.len());
        Ok(endpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_pool_repite_el_endpoint() {
        let pool = FixedPool::new(Endpoint::from_host_port("map", 8080), 3);

        let eps = pool.resolve().await.unwrap();

        assert_eq!(eps.len(), 3);
        assert!(eps.iter().all(|e| e.url() == "http://map:8080"));
    }

    #[tokio::test]
    async fn fixed_pool_vacio_es_error() {
        let pool = FixedPool::new(Endpoint::from_host_port("map", 80), 0);
        assert!(matches!(pool.resolve().await, Err(PipelineError::Config(_))));
    }

    #[tokio::test]
    async fn dns_discovery_resuelve_ip_literal() {
        let dns = DnsDiscovery::new("127.0.0.1", 9000);

        let eps = dns.resolve().await.unwrap();

        assert_eq!(eps, vec![Endpoint::new("http://127.0.0.1:9000")]);
    }

    #[tokio::test]
    async fn dns_discovery_nombre_inexistente_es_error() {
        let dns = DnsDiscovery::new("shuffle.no-existe.invalid", 80);
        assert!(matches!(
            dns.resolve().await,
            Err(PipelineError::Discovery { .. })
        ));
    }
}
