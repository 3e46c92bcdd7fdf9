use common::{MappingRecord, ShuffleResult, WordCount};
use std::{fmt, sync::Arc, time::Instant};
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::discovery::{DnsDiscovery, Endpoint, FixedPool, WorkerDiscovery};
use crate::dispatcher::{MapStage, ReduceStage, ShuffleStage, StageDispatcher, WorkUnit};
use crate::error::Result;
use crate::partition::partition_content;
use crate::routing::{route_by_hash, route_round_robin};

/// Fases de un conteo. Sólo se avanza hacia adelante; FAILED y DONE son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Mapping,
    Shuffling,
    Reducing,
    Done,
    Failed,
}

impl JobPhase {
    pub fn next(self) -> JobPhase {
        match self {
            JobPhase::Mapping => JobPhase::Shuffling,
            JobPhase::Shuffling => JobPhase::Reducing,
            JobPhase::Reducing => JobPhase::Done,
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Done | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobPhase::Mapping => "MAPPING",
            JobPhase::Shuffling => "SHUFFLING",
            JobPhase::Reducing => "REDUCING",
            JobPhase::Done => "DONE",
            JobPhase::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Estado de un conteo en vuelo (sólo vive durante la petición).
#[derive(Debug)]
pub struct JobRun {
    pub id: String,
    pub phase: JobPhase,
}

impl JobRun {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            phase: JobPhase::Mapping,
        }
    }

    fn advance(&mut self) {
        let next = self.phase.next();
        debug!("job {}: {} -> {}", self.id, self.phase, next);
        self.phase = next;
    }

    fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = JobPhase::Failed;
        }
    }
}

/// Encadena map -> shuffle -> reduce con barrera entre etapas.
pub struct Orchestrator {
    map_pool: Arc<dyn WorkerDiscovery>,
    shuffle_pool: Arc<dyn WorkerDiscovery>,
    reduce_pool: Arc<dyn WorkerDiscovery>,
    dispatcher: StageDispatcher,
}

impl Orchestrator {
    pub fn new(
        map_pool: Arc<dyn WorkerDiscovery>,
        shuffle_pool: Arc<dyn WorkerDiscovery>,
        reduce_pool: Arc<dyn WorkerDiscovery>,
        dispatcher: StageDispatcher,
    ) -> Self {
        Self {
            map_pool,
            shuffle_pool,
            reduce_pool,
            dispatcher,
        }
    }

    pub fn from_config(config: &CoordinatorConfig) -> Self {
        let map_pool = FixedPool::new(
            Endpoint::from_host_port(&config.map_host, config.map_port),
            config.workers,
        );
        let shuffle_pool = DnsDiscovery::new(config.shuffle_service.clone(), config.shuffle_port);
        let reduce_pool = FixedPool::new(
            Endpoint::from_host_port(&config.reduce_host, config.reduce_port),
            config.workers,
        );

        Self::new(
            Arc::new(map_pool),
            Arc::new(shuffle_pool),
            Arc::new(reduce_pool),
            StageDispatcher::default(),
        )
    }

    /// Cuenta las palabras de `content`. Cualquier fallo corta el pipeline
    /// en esa etapa; nunca se devuelven resultados parciales.
    pub async fn run(&self, content: &str) -> Result<WordCount> {
        let mut job = JobRun::new();
        let started = Instant::now();
        info!("job {}: iniciando ({} bytes)", job.id, content.len());

        match self.run_stages(&mut job, content).await {
            Ok(counts) => {
                info!(
                    "job {}: {} con {} palabras distintas en {:?}",
                    job.id,
                    job.phase,
                    counts.len(),
                    started.elapsed()
                );
                Ok(counts)
            }
            Err(e) => {
                let failed_in = job.phase;
                job.fail();
                warn!("job {}: {} durante {}: {}", job.id, job.phase, failed_in, e);
                Err(e)
            }
        }
    }

    async fn run_stages(&self, job: &mut JobRun, content: &str) -> Result<WordCount> {
        let records = self.map(content).await?;
        job.advance();

        let shuffled = self.shuffle(records).await?;
        job.advance();

        let counts = self.reduce(shuffled).await?;
        job.advance();

        Ok(counts)
    }

    async fn map(&self, content: &str) -> Result<Vec<MappingRecord>> {
        let endpoints = self.map_pool.resolve().await?;
        let chunks = partition_content(content, endpoints.len())?;

        let units = endpoints
            .into_iter()
            .zip(chunks)
            .map(|(ep, chunk)| WorkUnit::new(ep, chunk))
            .collect();

        self.dispatcher.dispatch::<MapStage>(units).await
    }

    async fn shuffle(&self, records: Vec<MappingRecord>) -> Result<ShuffleResult> {
        // la cantidad de shufflers sale del discovery, no de la config
        let endpoints = self.shuffle_pool.resolve().await?;
        let batches = route_by_hash(records, endpoints.len())?;

        let units = endpoints
            .into_iter()
            .zip(batches)
            .map(|(ep, batch)| WorkUnit::new(ep, batch))
            .collect();

        self.dispatcher.dispatch::<ShuffleStage>(units).await
    }

    async fn reduce(&self, shuffled: ShuffleResult) -> Result<WordCount> {
        let endpoints = self.reduce_pool.resolve().await?;
        let parts = route_round_robin(shuffled, endpoints.len())?;

        let units = endpoints
            .into_iter()
            .zip(parts)
            .map(|(ep, part)| WorkUnit::new(ep, part))
            .collect();

        self.dispatcher.dispatch::<ReduceStage>(units).await
    }
}
