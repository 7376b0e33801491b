// [apps/pipeline-worker/src/workers/analysis.rs]
/*!
 * =================================================================
 * APARATO: ANALYSIS WORKER (V8.2 - SINGLE LATCH MASTER)
 * CLASIFICACIÓN: WORKER LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: ANOTACIÓN DE ESCENA VÍA HOST DE MODELOS EXTERNOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE LATCH: 'ai_processed' es un latch único; todas las
 *    anotaciones viajan en la misma sentencia que lo voltea. Jamás
 *    hay reproceso, ni siquiera tras fallo.
 * 2. BUDGETED RETRY: Los reintentos de red viven DENTRO de una
 *    iteración; agotado el presupuesto se sella 'ai_error' con
 *    descripción nula y el evento no vuelve a seleccionarse.
 * 3. GUARD RELEASE: Imágenes ausentes o inquietas liberan el claim
 *    sin latch; otra iteración lo reintentará.
 * =================================================================
 */

use std::time::Duration;
use tracing::{error, info, instrument, warn};

use vigil_domain_models::event::{AiAnnotations, EventRecord};
use vigil_infra_artifacts::ArtifactVault;
use vigil_infra_db::repositories::EventRepository;
use vigil_infra_db::DbError;
use vigil_infra_vision::{AnnotationBackend, SceneNarrative, SceneSignals, VisionError};
use vigil_shared_config::WorkerConfig;

use super::WorkerContext;

/// Pausa entre reintentos de red dentro de una iteración.
const RETRY_PAUSE_MILLIS: u64 = 750;

pub struct AnalysisWorker<B: AnnotationBackend> {
    event_repository: EventRepository,
    artifact_vault: ArtifactVault,
    annotation_backend: B,
    worker_config: WorkerConfig,
    context: WorkerContext,
}

impl<B: AnnotationBackend> AnalysisWorker<B> {
    pub fn new(
        event_repository: EventRepository,
        artifact_vault: ArtifactVault,
        annotation_backend: B,
        worker_config: WorkerConfig,
        context: WorkerContext,
    ) -> Self {
        Self { event_repository, artifact_vault, annotation_backend, worker_config, context }
    }

    pub async fn run(self) {
        info!("🧠 [ANALYST]: Unit [{}] operational.", self.context.instance_identity);

        while !self.context.termination_requested() {
            match self.run_single_iteration().await {
                Ok(0) => self.context.idle_backoff().await,
                Ok(_) => {}
                Err(DbError::Unavailable(reason)) => {
                    warn!("⏳ [ANALYST]: Store unavailable ({reason}); backing off.");
                    self.context.unavailable_backoff().await;
                }
                Err(other_fault) => {
                    error!("💀 [ANALYST]: Iteration collapsed: {other_fault}");
                    self.context.unavailable_backoff().await;
                }
            }
        }

        info!("🏁 [ANALYST]: Unit [{}] sealed and offline.", self.context.instance_identity);
    }

    pub async fn run_single_iteration(&self) -> Result<usize, DbError> {
        let claimed_events = self
            .event_repository
            .claim_for_analysis(
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
        // --- GUARD: ambas imágenes presentes y quiescentes ---
        let frames = match self.load_guarded_frames(&event).await {
            Some(frames) => frames,
            None => {
                let _ = self
                    .event_repository
                    .release_analysis_claim(event.id, &self.context.instance_identity)
                    .await;
                return;
            }
        };

        // --- WORK: visión + narrativa con presupuesto de reintentos ---
        let annotations = match self.annotate_with_budget(&frames.0, &frames.1).await {
            AnnotationOutcome::Complete(annotations) => annotations,
            AnnotationOutcome::BudgetExhausted(last_fault) => {
                warn!(
                    "🔒 [ANALYST]: Event {} retry budget exhausted; sealing error latch: {}",
                    event.id, last_fault
                );
                AiAnnotations {
                    person_detected: None,
                    confidence: None,
                    objects: None,
                    description: None,
                    phrase: None,
                    error: Some(last_fault),
                }
            }
        };

        // --- COMMIT: latch + anotaciones en una sentencia ---
        match self
            .event_repository
            .commit_analysis(event.id, &self.context.instance_identity, &annotations)
            .await
        {
            Ok(()) => {
                info!("✅ [ANALYST]: Event {} annotated (latch sealed).", event.id);
            }
            Err(DbError::ClaimLost) => {
                warn!("♻️ [ANALYST]: Event {} ownership lost before commit.", event.id);
            }
            Err(commit_fault) => {
                error!("💀 [ANALYST]: Event {} commit collapsed: {}", event.id, commit_fault);
            }
        }
    }

    /// Carga ambas imágenes si superan la guardia de quiescencia.
    async fn load_guarded_frames(&self, event: &EventRecord) -> Option<(Vec<u8>, Vec<u8>)> {
        let image_a_relative = event.image_a_path.as_deref()?;
        let image_b_relative = event.image_b_path.as_deref()?;

        let quiescence_window = Duration::from_secs(self.worker_config.quiescence_seconds);
        for relative in [image_a_relative, image_b_relative] {
            match self.artifact_vault.is_quiescent(relative, quiescence_window).await {
                Ok(true) => {}
                _ => return None,
            }
        }

        let image_a = self.read_frame(image_a_relative).await?;
        let image_b = self.read_frame(image_b_relative).await?;
        Some((image_a, image_b))
    }

    async fn read_frame(&self, relative: &str) -> Option<Vec<u8>> {
        let physical = self.artifact_vault.resolve(relative).ok()?;
        tokio::fs::read(&physical).await.ok()
    }

    /**
     * Ejecuta visión + narrativa con el presupuesto de reintentos de la
     * configuración. Todo fallo del host (red, rechazo, respuesta
     * malformada) consume un intento; el presupuesto agotado devuelve
     * el último fallo para el latch de error.
     */
    async fn annotate_with_budget(&self, image_a: &[u8], image_b: &[u8]) -> AnnotationOutcome {
        let attempt_budget = self.worker_config.ai_retry_budget.max(1);
        let mut last_fault = String::new();

        for attempt in 1..=attempt_budget {
            match self.execute_annotation_pass(image_a, image_b).await {
                Ok(annotations) => return AnnotationOutcome::Complete(annotations),
                Err(vision_fault) => {
                    last_fault = vision_fault.to_string();
                    warn!(
                        "🔁 [ANALYST]: Annotation attempt {}/{} rejected: {}",
                        attempt, attempt_budget, last_fault
                    );
                    if attempt < attempt_budget {
                        tokio::time::sleep(Duration::from_millis(RETRY_PAUSE_MILLIS)).await;
                    }
                }
            }
        }

        AnnotationOutcome::BudgetExhausted(last_fault)
    }

    async fn execute_annotation_pass(
        &self,
        image_a: &[u8],
        image_b: &[u8],
    ) -> Result<AiAnnotations, VisionError> {
        let signals: SceneSignals = self.annotation_backend.analyze_scene(image_a, image_b).await?;
        let narrative: SceneNarrative = self.annotation_backend.narrate_scene(&signals).await?;

        Ok(AiAnnotations {
            person_detected: Some(signals.person_detected),
            confidence: Some(signals.confidence),
            objects: Some(signals.objects),
            description: Some(narrative.description),
            phrase: Some(narrative.phrase),
            error: None,
        })
    }
}

enum AnnotationOutcome {
    Complete(AiAnnotations),
    BudgetExhausted(String),
}
