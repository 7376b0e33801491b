// [apps/pipeline-worker/src/workers/optimization.rs]
/*!
 * =================================================================
 * APARATO: OPTIMIZATION WORKER (V6.1 - SIZE PROFILE MASTER)
 * CLASIFICACIÓN: WORKER LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: RE-CODIFICACIÓN DEL MP4 A PERFIL REDUCIDO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TEMP + RENAME: La re-codificación escribe un temporal hermano y
 *    lo renombra sobre el original sólo si es no-vacío; el visor jamás
 *    observa un MP4 a medio escribir.
 * 2. CLAIM HOLD: El sub-estado permanece 'complete' durante el trabajo;
 *    la propiedad se sostiene por las columnas de claim y el commit
 *    avanza a 'optimized' re-afirmando al claimant.
 * =================================================================
 */

use std::time::Duration;
use tracing::{error, info, instrument, warn};

use vigil_domain_models::event::EventRecord;
use vigil_infra_artifacts::ArtifactVault;
use vigil_infra_db::repositories::EventRepository;
use vigil_infra_db::DbError;
use vigil_infra_media::MediaTranscoder;
use vigil_shared_config::WorkerConfig;

use super::WorkerContext;

/// Sufijo del temporal de re-codificación, hermano del MP4 original.
const OPTIMIZATION_TEMP_SUFFIX: &str = ".opt.mp4";

pub struct OptimizationWorker<T: MediaTranscoder> {
    event_repository: EventRepository,
    artifact_vault: ArtifactVault,
    transcoder: T,
    worker_config: WorkerConfig,
    context: WorkerContext,
}

impl<T: MediaTranscoder> OptimizationWorker<T> {
    pub fn new(
        event_repository: EventRepository,
        artifact_vault: ArtifactVault,
        transcoder: T,
        worker_config: WorkerConfig,
        context: WorkerContext,
    ) -> Self {
        Self { event_repository, artifact_vault, transcoder, worker_config, context }
    }

    pub async fn run(self) {
        info!("🗜️ [OPTIMIZER]: Unit [{}] operational.", self.context.instance_identity);

        while !self.context.termination_requested() {
            match self.run_single_iteration().await {
                Ok(0) => self.context.idle_backoff().await,
                Ok(_) => {}
                Err(DbError::Unavailable(reason)) => {
                    warn!("⏳ [OPTIMIZER]: Store unavailable ({reason}); backing off.");
                    self.context.unavailable_backoff().await;
                }
                Err(other_fault) => {
                    error!("💀 [OPTIMIZER]: Iteration collapsed: {other_fault}");
                    self.context.unavailable_backoff().await;
                }
            }
        }

        info!("🏁 [OPTIMIZER]: Unit [{}] sealed and offline.", self.context.instance_identity);
    }

    pub async fn run_single_iteration(&self) -> Result<usize, DbError> {
        let claimed_events = self
            .event_repository
            .claim_for_optimization(
                &self.context.instance_identity,
                self.worker_config.batch_size,
                Duration::from_secs(self.worker_config.reclaim_horizon_seconds),
            )
            .await?;

        let batch_size = claimed_events.len();
        for event in claimed_events {
            if self.context.termination_requested() {
                break;
            }
            self.process_claimed_event(event).await;
        }
        Ok(batch_size)
    }

    #[instrument(skip(self, event), fields(event_id = event.id))]
    async fn process_claimed_event(&self, event: EventRecord) {
        let Some(mp4_relative) = event.video_mp4_path.clone() else {
            let _ = self
                .event_repository
                .release_optimization_claim(event.id, &self.context.instance_identity)
                .await;
            return;
        };

        // --- GUARD: el MP4 del conversor debe existir y estar quiescente ---
        let quiescence_window = Duration::from_secs(self.worker_config.quiescence_seconds);
        match self.artifact_vault.is_quiescent(&mp4_relative, quiescence_window).await {
            Ok(true) => {}
            Ok(false) => {
                let _ = self
                    .event_repository
                    .release_optimization_claim(event.id, &self.context.instance_identity)
                    .await;
                return;
            }
            Err(vault_fault) => {
                error!("❌ [OPTIMIZER]: Event {} guard rejected: {}", event.id, vault_fault);
                let _ = self
                    .event_repository
                    .fail_optimization(event.id, &self.context.instance_identity)
                    .await;
                return;
            }
        }

        // --- WORK: re-codificación hacia un temporal hermano ---
        let temp_relative = format!("{mp4_relative}{OPTIMIZATION_TEMP_SUFFIX}");
        let work_outcome = self.execute_optimization(&mp4_relative, &temp_relative).await;

        match work_outcome {
            Ok(()) => {
                match self
                    .event_repository
                    .commit_optimization(event.id, &self.context.instance_identity, &mp4_relative)
                    .await
                {
                    Ok(()) => {
                        info!("✅ [OPTIMIZER]: Event {} re-encoded to size profile.", event.id);
                    }
                    Err(DbError::ClaimLost) => {
                        warn!("♻️ [OPTIMIZER]: Event {} ownership lost before commit.", event.id);
                    }
                    Err(commit_fault) => {
                        error!("💀 [OPTIMIZER]: Event {} commit collapsed: {}", event.id, commit_fault);
                    }
                }
            }
            Err(work_fault) => {
                error!("❌ [OPTIMIZER]: Event {} optimization rejected: {}", event.id, work_fault);
                let _ = self.artifact_vault.remove(&temp_relative).await;
                let _ = self
                    .event_repository
                    .fail_optimization(event.id, &self.context.instance_identity)
                    .await;
            }
        }
    }

    /// Re-codifica hacia el temporal y lo renombra sobre el original.
    async fn execute_optimization(
        &self,
        mp4_relative: &str,
        temp_relative: &str,
    ) -> Result<(), String> {
        let input_physical = self
            .artifact_vault
            .resolve(mp4_relative)
            .map_err(|fault| fault.to_string())?;
        let temp_physical = self
            .artifact_vault
            .resolve(temp_relative)
            .map_err(|fault| fault.to_string())?;

        self.transcoder
            .optimize_mp4(
                &input_physical,
                &temp_physical,
                Duration::from_secs(self.worker_config.per_event_timeout_seconds),
            )
            .await
            .map_err(|fault| fault.to_string())?;

        let optimized_size = self
            .artifact_vault
            .size_bytes(temp_relative)
            .await
            .map_err(|fault| fault.to_string())?
            .unwrap_or(0);

        if optimized_size == 0 {
            return Err("optimized output is empty".into());
        }

        tokio::fs::rename(&temp_physical, &input_physical)
            .await
            .map_err(|fault| fault.to_string())
    }
}
