// [apps/pipeline-worker/src/workers/mod.rs]
/*!
 * =================================================================
 * APARATO: WORKER REGISTRY (V3.0 - PIPELINE STRATA)
 * CLASIFICACIÓN: WORKER LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: ESQUELETO COMÚN Y EXPOSICIÓN DE LOS TRES WORKERS
 *
 * Contrato común por iteración: CLAIM (update condicional) -> GUARD
 * (existencia + quiescencia del artefacto) -> WORK (acotado) -> COMMIT
 * (una sentencia re-afirmando al claimant) -> FAIL/RELEASE sin claims
 * colgantes. Cadencia: backoff acotado sin trabajo, iteración inmediata
 * tras un lote no vacío.
 * =================================================================
 */

pub mod analysis;
pub mod conversion;
pub mod optimization;

pub use analysis::AnalysisWorker;
pub use conversion::ConversionWorker;
pub use optimization::OptimizationWorker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Identidad opaca del claimant: `{host}:{pid}`.
pub fn worker_instance_identity(worker_name: &str) -> String {
    let host = hostname::get()
        .ok()
        .and_then(|raw| raw.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string());
    format!("{host}:{}:{worker_name}", std::process::id())
}

/// Contexto compartido de cadencia y apagado de un worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub instance_identity: String,
    pub termination_signal: Arc<AtomicBool>,
    pub idle_interval: Duration,
}

impl WorkerContext {
    pub fn new(worker_name: &str, termination_signal: Arc<AtomicBool>, idle_interval: Duration) -> Self {
        Self {
            instance_identity: worker_instance_identity(worker_name),
            termination_signal,
            idle_interval,
        }
    }

    pub fn termination_requested(&self) -> bool {
        self.termination_signal.load(Ordering::SeqCst)
    }

    /// Pausa ociosa entre iteraciones sin trabajo disponible.
    pub async fn idle_backoff(&self) {
        tokio::time::sleep(self.idle_interval).await;
    }

    /// Backoff ante 'Unavailable' del Store (pool saturado o enlace caído).
    pub async fn unavailable_backoff(&self) {
        tokio::time::sleep(self.idle_interval.saturating_mul(2)).await;
    }
}
