use std::future::Future;
use tokio::sync::mpsc;
use tracing::warn;

/// Lanza cada futuro como una tarea independiente y espera los K resultados.
///
/// - Cada tarea reporta `(índice, resultado)` en un canal de capacidad K.
/// - El colector drena siempre K entradas, aunque ya haya visto un error,
///   así ninguna tarea queda abandonada.
/// - El primer error observado gana; los éxitos restantes se descartan.
/// - Si una tarea muere sin reportar (panic), se devuelve `on_lost()`.
///
/// Los éxitos se devuelven ordenados por índice de lanzamiento.
pub async fn run_all<T, E, F>(units: Vec<F>, on_lost: impl Fn() -> E) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let k = units.len();
    if k == 0 {
        return Ok(Vec::new());
    }

    let (tx, mut rx) = mpsc::channel::<(usize, Result<T, E>)>(k);

    for (idx, unit) in units.into_iter().enumerate() {
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = unit.await;
            // el colector nunca cierra antes de recibir K mensajes
            let _ = tx.send((idx, outcome)).await;
        });
    }
    drop(tx);

    let mut first_err: Option<E> = None;
    let mut done: Vec<(usize, T)> = Vec::with_capacity(k);

    for _ in 0..k {
        match rx.recv().await {
            Some((idx, Ok(value))) => {
                if first_err.is_none() {
                    done.push((idx, value));
                }
            }
            Some((_, Err(e))) => {
                if first_err.is_none() {
                    first_err = Some(e);
                    done.clear();
                }
            }
            None => {
                // todos los senders cayeron: alguna tarea terminó sin reportar
                warn!("una tarea terminó sin reportar resultado");
                if first_err.is_none() {
                    first_err = Some(on_lost());
                }
                break;
            }
        }
    }

    if let Some(e) = first_err {
        return Err(e);
    }

    done.sort_by_key(|(idx, _)| *idx);
    Ok(done.into_iter().map(|(_, v)| v).collect())
}
