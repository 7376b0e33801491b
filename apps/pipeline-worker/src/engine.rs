// [apps/pipeline-worker/src/engine.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE ENGINE (V7.0 - TRIPLE STRATA IGNITION)
 * CLASIFICACIÓN: WORKER LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: COMPOSICIÓN E IGNICIÓN DE LOS TRES WORKERS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SHARED RUNTIME: Los tres workers son tareas independientes del
 *    mismo runtime; coordinan exclusivamente a través del Store.
 * 2. BOOT RECOVERY: La recuperación de claims obsoletos es implícita:
 *    el predicado de claim roba sellos envejecidos desde la primera
 *    iteración tras el arranque.
 * 3. ORDERED SHUTDOWN: La señal atómica sella la iteración en curso;
 *    los claims restantes envejecen y serán robados.
 * =================================================================
 */

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use vigil_infra_artifacts::ArtifactVault;
use vigil_infra_db::repositories::EventRepository;
use vigil_infra_db::{DbError, StoreClient, StoreSettings};
use vigil_infra_media::FfmpegTranscoder;
use vigil_infra_vision::{VisionError, VisionHostClient};
use vigil_shared_config::SystemConfig;

use crate::workers::{AnalysisWorker, ConversionWorker, OptimizationWorker, WorkerContext};

/// Selección de estratos del pipeline a encender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSelection {
    Convert,
    Optimize,
    Analyze,
    All,
}

impl WorkerSelection {
    pub fn runs_conversion(&self) -> bool {
        matches!(self, WorkerSelection::Convert | WorkerSelection::All)
    }

    pub fn runs_optimization(&self) -> bool {
        matches!(self, WorkerSelection::Optimize | WorkerSelection::All)
    }

    pub fn runs_analysis(&self) -> bool {
        matches!(self, WorkerSelection::Analyze | WorkerSelection::All)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// Storage inalcanzable durante la ignición (exit code 3).
    #[error("[L1_ENGINE_FAULT]: STORE_IGNITION_REJECTED -> {0}")]
    Store(#[from] DbError),

    /// Enlace con el host de modelos no construible.
    #[error("[L1_ENGINE_FAULT]: VISION_UPLINK_REJECTED -> {0}")]
    Vision(#[from] VisionError),
}

pub struct PipelineEngine {
    config: Arc<SystemConfig>,
    termination_signal: Arc<AtomicBool>,
}

impl PipelineEngine {
    pub fn new(config: Arc<SystemConfig>, termination_signal: Arc<AtomicBool>) -> Self {
        Self { config, termination_signal }
    }

    /**
     * Ignición del pipeline: Store primero, luego los estratos elegidos.
     * Bloquea hasta que todos los workers sellan su apagado.
     */
    pub async fn ignite(self, selection: WorkerSelection) -> Result<(), EngineError> {
        let database_client = StoreClient::connect(StoreSettings {
            url: self.config.database.url.clone(),
            auth_token: self.config.database.auth_token.clone(),
            min_connections: self.config.database.min_connections,
            max_overflow: self.config.database.max_overflow,
            acquire_timeout: self.config.pool_acquire_timeout(),
        })
        .await?;

        let artifact_vault = ArtifactVault::new(self.config.artifacts.root.clone());
        let idle_interval = self.config.poll_idle_interval();
        let worker_config = self.config.workers.clone();

        let mut worker_handles = Vec::new();

        if selection.runs_conversion() {
            let worker = ConversionWorker::new(
                EventRepository::new(database_client.clone()),
                artifact_vault.clone(),
                FfmpegTranscoder::default(),
                worker_config.clone(),
                WorkerContext::new("convert", Arc::clone(&self.termination_signal), idle_interval),
            );
            worker_handles.push(tokio::spawn(worker.run()));
        }

        if selection.runs_optimization() {
            let worker = OptimizationWorker::new(
                EventRepository::new(database_client.clone()),
                artifact_vault.clone(),
                FfmpegTranscoder::default(),
                worker_config.clone(),
                WorkerContext::new("optimize", Arc::clone(&self.termination_signal), idle_interval),
            );
            worker_handles.push(tokio::spawn(worker.run()));
        }

        if selection.runs_analysis() {
            let annotation_backend = VisionHostClient::new(
                worker_config.ai_endpoint_url.clone(),
                worker_config.ai_vision_model.clone(),
                worker_config.ai_text_model.clone(),
                Duration::from_secs(worker_config.ai_call_timeout_seconds),
            )?;

            let worker = AnalysisWorker::new(
                EventRepository::new(database_client.clone()),
                artifact_vault.clone(),
                annotation_backend,
                worker_config.clone(),
                WorkerContext::new("analyze", Arc::clone(&self.termination_signal), idle_interval),
            );
            worker_handles.push(tokio::spawn(worker.run()));
        }

        info!("🚀 [ENGINE]: {} worker strata ignited.", worker_handles.len());

        for handle in worker_handles {
            handle.await.ok();
        }

        info!("🏁 [ENGINE]: All worker strata sealed. Pipeline offline.");
        Ok(())
    }
}
