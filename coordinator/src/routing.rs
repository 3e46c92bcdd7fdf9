use common::{MappingRecord, ShuffleResult};

use crate::error::{PipelineError, Result};

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Lote de shuffle: posición i = registros que van al worker i.
pub type ShuffleBatch = Vec<Vec<MappingRecord>>;

/// FNV-1a de 32 bits sobre los bytes UTF-8 de la clave.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET_BASIS, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(FNV32_PRIME)
    })
}

/// Worker de shuffle al que va una clave. Función pura de (clave, cantidad de workers).
pub fn shuffle_worker_for(key: &str, workers: usize) -> usize {
    fnv1a_32(key.as_bytes()) as usize % workers
}

/// Agrupa los registros del map por hash de clave, uno por worker de shuffle.
/// Todas las apariciones de una clave terminan en el mismo lote.
pub fn route_by_hash(records: Vec<MappingRecord>, workers: usize) -> Result<ShuffleBatch> {
    if workers == 0 {
        return Err(PipelineError::Config(
            "no hay workers de shuffle para rutear".to_string(),
        ));
    }

    let mut batches: ShuffleBatch = vec![Vec::new(); workers];
    for rec in records {
        let idx = shuffle_worker_for(rec.key(), workers);
        batches[idx].push(rec);
    }
    Ok(batches)
}

/// Reparte las claves del shuffle en round-robin: la clave i (en orden) va al worker i % n.
pub fn route_round_robin(shuffled: ShuffleResult, workers: usize) -> Result<Vec<ShuffleResult>> {
    if workers == 0 {
        return Err(PipelineError::Config(
            "no hay workers de reduce para rutear".to_string(),
        ));
    }

    let mut parts: Vec<ShuffleResult> = vec![ShuffleResult::new(); workers];
    for (i, (key, values)) in shuffled.into_iter().enumerate() {
        parts[i % workers].insert(key, values);
    }
    Ok(parts)
}
