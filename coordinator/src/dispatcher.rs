use common::{MappingRecord, ShuffleResult, Stage, WordCount};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

use crate::discovery::Endpoint;
use crate::error::{PipelineError, Result};
use crate::task_group;

/// Contrato de una etapa: qué se manda, qué vuelve y cómo se fusiona.
pub trait StageSpec: Send + Sync + 'static {
    const STAGE: Stage;

    type Payload: Send + 'static;
    type Output: DeserializeOwned + Default + Send + 'static;

    /// false si la unidad no tiene trabajo: se salta sin llamar al worker.
    fn has_work(payload: &Self::Payload) -> bool;

    /// (content-type, cuerpo) de la petición.
    fn encode(payload: Self::Payload) -> Result<(&'static str, Vec<u8>)>;

    fn merge(acc: &mut Self::Output, part: Self::Output) -> Result<()>;
}

pub struct MapStage;
pub struct ShuffleStage;
pub struct ReduceStage;

impl StageSpec for MapStage {
    const STAGE: Stage = Stage::Map;
    type Payload = String;
    type Output = Vec<MappingRecord>;

    fn has_work(payload: &String) -> bool {
        !payload.is_empty()
    }

    fn encode(payload: String) -> Result<(&'static str, Vec<u8>)> {
        Ok(("text/plain", payload.into_bytes()))
    }

    fn merge(acc: &mut Vec<MappingRecord>, mut part: Vec<MappingRecord>) -> Result<()> {
        acc.append(&mut part);
        Ok(())
    }
}

impl StageSpec for ShuffleStage {
    const STAGE: Stage = Stage::Shuffle;
    type Payload = Vec<MappingRecord>;
    type Output = ShuffleResult;

    fn has_work(payload: &Vec<MappingRecord>) -> bool {
        !payload.is_empty()
    }

    fn encode(payload: Vec<MappingRecord>) -> Result<(&'static str, Vec<u8>)> {
        encode_json(Self::STAGE, &payload)
    }

    fn merge(acc: &mut ShuffleResult, part: ShuffleResult) -> Result<()> {
        merge_disjoint(Self::STAGE, acc, part)
    }
}

impl StageSpec for ReduceStage {
    const STAGE: Stage = Stage::Reduce;
    type Payload = ShuffleResult;
    type Output = WordCount;

    fn has_work(payload: &ShuffleResult) -> bool {
        !payload.is_empty()
    }

    fn encode(payload: ShuffleResult) -> Result<(&'static str, Vec<u8>)> {
        encode_json(Self::STAGE, &payload)
    }

    fn merge(acc: &mut WordCount, part: WordCount) -> Result<()> {
        merge_disjoint(Self::STAGE, acc, part)
    }
}

fn encode_json<T: serde::Serialize>(stage: Stage, payload: &T) -> Result<(&'static str, Vec<u8>)> {
    let body = serde_json::to_vec(payload).map_err(|source| PipelineError::Encode { stage, source })?;
    Ok(("application/json", body))
}

/// Fusiona dos mapas cuyas claves deberían ser disjuntas; una clave repetida es fatal.
fn merge_disjoint<V>(
    stage: Stage,
    acc: &mut BTreeMap<String, V>,
    part: BTreeMap<String, V>,
) -> Result<()> {
    for (key, value) in part {
        if acc.contains_key(&key) {
            return Err(PipelineError::InvariantViolation { stage, key });
        }
        acc.insert(key, value);
    }
    Ok(())
}

/// Una unidad de trabajo: a qué worker va y qué lleva.
#[derive(Debug, Clone)]
pub struct WorkUnit<P> {
    pub endpoint: Endpoint,
    pub payload: P,
}

impl<P> WorkUnit<P> {
    pub fn new(endpoint: Endpoint, payload: P) -> Self {
        Self { endpoint, payload }
    }
}

/// Fan-out/fan-in genérico: manda K unidades en paralelo, espera las K y fusiona.
#[derive(Debug, Clone, Default)]
pub struct StageDispatcher {
    client: Client,
}

impl StageDispatcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn dispatch<S: StageSpec>(&self, units: Vec<WorkUnit<S::Payload>>) -> Result<S::Output> {
        let total = units.len();
        let mut calls = Vec::with_capacity(total);

        for unit in units {
            if !S::has_work(&unit.payload) {
                continue;
            }
            let (content_type, body) = S::encode(unit.payload)?;
            calls.push(call_worker::<S>(
                self.client.clone(),
                unit.endpoint,
                content_type,
                body,
            ));
        }

        debug!(
            "{}: despachando {} de {} unidades",
            S::STAGE,
            calls.len(),
            total
        );

        let parts = task_group::run_all(calls, || PipelineError::WorkerTask { stage: S::STAGE }).await?;

        let mut merged = S::Output::default();
        for part in parts {
            S::merge(&mut merged, part)?;
        }
        Ok(merged)
    }
}

/// Un ida y vuelta contra un worker: POST, status, cuerpo, decode.
async fn call_worker<S: StageSpec>(
    client: Client,
    endpoint: Endpoint,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<S::Output> {
    let transport = |source| PipelineError::Transport {
        stage: S::STAGE,
        endpoint: endpoint.to_string(),
        source,
    };

    let resp = client
        .post(endpoint.url())
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .send()
        .await
        .map_err(transport)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PipelineError::WorkerStatus {
            stage: S::STAGE,
            endpoint: endpoint.to_string(),
            status,
        });
    }

    let bytes = resp.bytes().await.map_err(transport)?;

    serde_json::from_slice(&bytes).map_err(|source| PipelineError::Decode {
        stage: S::STAGE,
        endpoint: endpoint.to_string(),
        source,
    })
}
