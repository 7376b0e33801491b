// [apps/pipeline-worker/src/workers/conversion.rs]
/*!
 * =================================================================
 * APARATO: CONVERSION WORKER (V9.0 - H264 REWRAP MASTER)
 * CLASIFICACIÓN: WORKER LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: CONVERSIÓN H.264 -> MP4 CON FAST-START
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. QUIESCENCE GUARD: El artefacto debe existir y superar la ventana
 *    de quiescencia ANTES de confiar en la ruta del Ledger; cubre la
 *    carrera entre el flip de bandera y la llegada física del fichero.
 * 2. SOURCE HYGIENE: La fuente H.264 sólo se elimina tras verificar
 *    que el MP4 producido es no-vacío; un fallo de borrado retiene la
 *    fuente sin invalidar el commit.
 * 3. CLAIM DISCIPLINE: Un commit rechazado (claim robado o evento
 *    desaparecido por cascade) es un no-op silencioso.
 *
 * # Mathematical Proof (Restartability):
 * Matar el worker entre claim y commit deja la fila en 'processing' con
 * sello de claim envejecido; cualquier iteración posterior la roba tras
 * el horizonte y re-convierte. Como la ruta MP4 deriva determinista de
 * la H.264, el re-trabajo converge al mismo fichero único.
 * =================================================================
 */

use chrono::Utc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use vigil_domain_models::event::EventRecord;
use vigil_domain_models::time;
use vigil_infra_artifacts::{layout, ArtifactVault};
use vigil_infra_db::repositories::EventRepository;
use vigil_infra_db::DbError;
use vigil_infra_media::MediaTranscoder;
use vigil_shared_config::WorkerConfig;

use super::WorkerContext;

/// Duración por defecto cuando ni el sondeo ni la cámara aportan una.
const FALLBACK_DURATION_SECONDS: f64 = 60.0;

pub struct ConversionWorker<T: MediaTranscoder> {
    event_repository: EventRepository,
    artifact_vault: ArtifactVault,
    transcoder: T,
    worker_config: WorkerConfig,
    context: WorkerContext,
}

impl<T: MediaTranscoder> ConversionWorker<T> {
    pub fn new(
        event_repository: EventRepository,
        artifact_vault: ArtifactVault,
        transcoder: T,
        worker_config: WorkerConfig,
        context: WorkerContext,
    ) -> Self {
        Self { event_repository, artifact_vault, transcoder, worker_config, context }
    }

    /// Bucle principal: claim -> guard -> work -> commit, con cadencia acotada.
    pub async fn run(self) {
        info!("🎞️ [CONVERTER]: Unit [{}] operational.", self.context.instance_identity);

        while !self.context.termination_requested() {
            match self.run_single_iteration().await {
                Ok(0) => self.context.idle_backoff().await,
                Ok(_) => {} // Lote no vacío: iteración inmediata.
                Err(DbError::Unavailable(reason)) => {
                    warn!("⏳ [CONVERTER]: Store unavailable ({reason}); backing off.");
                    self.context.unavailable_backoff().await;
                }
                Err(other_fault) => {
                    error!("💀 [CONVERTER]: Iteration collapsed: {other_fault}");
                    self.context.unavailable_backoff().await;
                }
            }
        }

        info!("🏁 [CONVERTER]: Unit [{}] sealed and offline.", self.context.instance_identity);
    }

    /**
     * Una iteración completa; devuelve el tamaño del lote reclamado.
     * Expuesta para el Proving Grounds (una iteración determinista).
     */
    pub async fn run_single_iteration(&self) -> Result<usize, DbError> {
        let claimed_events = self
            .event_repository
            .claim_for_conversion(
                &self.context.instance_identity,
                self.worker_config.batch_size,
                Duration::from_secs(self.worker_config.reclaim_horizon_seconds),
            )
            .await?;

        let batch_size = claimed_events.len();
        for event in claimed_events {
            if self.context.termination_requested() {
                // Apagado en caliente: el claim envejece y será robado después.
                break;
            }
            self.process_claimed_event(event).await;
        }
        Ok(batch_size)
    }

    #[instrument(skip(self, event), fields(event_id = event.id))]
    async fn process_claimed_event(&self, event: EventRecord) {
        let Some(h264_relative) = event.video_h264_path.clone() else {
            // El predicado de claim exige ruta no nula; una fila sin ella es ruido.
            let _ = self
                .event_repository
                .fail_conversion(event.id, &self.context.instance_identity)
                .await;
            return;
        };

        // --- GUARD: existencia + quiescencia del artefacto ---
        match self.guard_source_artifact(&event, &h264_relative).await {
            GuardVerdict::Ready => {}
            GuardVerdict::Retry => {
                let _ = self
                    .event_repository
                    .release_conversion_claim(event.id, &self.context.instance_identity)
                    .await;
                return;
            }
            GuardVerdict::Expired(reason) => {
                warn!("💀 [CONVERTER]: Event {} source expired: {}", event.id, reason);
                let _ = self
                    .event_repository
                    .fail_conversion(event.id, &self.context.instance_identity)
                    .await;
                return;
            }
        }

        // --- WORK: remux acotado por el presupuesto por evento ---
        let mp4_relative = layout::mp4_sibling(&h264_relative);
        let physical_pair = self
            .artifact_vault
            .resolve(&h264_relative)
            .and_then(|input| self.artifact_vault.resolve(&mp4_relative).map(|output| (input, output)));

        let (input_physical, output_physical) = match physical_pair {
            Ok(pair) => pair,
            Err(path_fault) => {
                error!("❌ [CONVERTER]: Event {} path rejected: {}", event.id, path_fault);
                let _ = self
                    .event_repository
                    .fail_conversion(event.id, &self.context.instance_identity)
                    .await;
                return;
            }
        };

        let transcode_outcome = self
            .transcoder
            .remux_to_mp4(
                &input_physical,
                &output_physical,
                Duration::from_secs(self.worker_config.per_event_timeout_seconds),
            )
            .await;

        if let Err(transcode_fault) = transcode_outcome {
            error!("❌ [CONVERTER]: Event {} transcode rejected: {}", event.id, transcode_fault);
            let _ = self
                .event_repository
                .fail_conversion(event.id, &self.context.instance_identity)
                .await;
            return;
        }

        // --- DURATION: sondeo -> duración de cámara -> default fijo ---
        let duration_seconds = self.resolve_duration(&event, &mp4_relative).await;

        // --- COMMIT: una sentencia re-afirmando al claimant ---
        match self
            .event_repository
            .commit_conversion(
                event.id,
                &self.context.instance_identity,
                &mp4_relative,
                duration_seconds,
            )
            .await
        {
            Ok(()) => {
                info!("✅ [CONVERTER]: Event {} sealed as MP4 [{}].", event.id, mp4_relative);
                self.cleanup_source(&h264_relative, &mp4_relative).await;
            }
            Err(DbError::ClaimLost) => {
                // Claim robado o evento desaparecido (cascade): no-op por contrato.
                warn!("♻️ [CONVERTER]: Event {} ownership lost before commit.", event.id);
            }
            Err(commit_fault) => {
                error!("💀 [CONVERTER]: Event {} commit collapsed: {}", event.id, commit_fault);
            }
        }
    }

    async fn guard_source_artifact(&self, event: &EventRecord, h264_relative: &str) -> GuardVerdict {
        let quiescence_window = Duration::from_secs(self.worker_config.quiescence_seconds);

        match self.artifact_vault.is_quiescent(h264_relative, quiescence_window).await {
            Ok(true) => GuardVerdict::Ready,
            Ok(false) => {
                // Ausente o aún en escritura. Si la fila espera desde antes del
                // horizonte de reclamación, el fichero ya no va a llegar.
                let event_age_exceeded = time::parse_rfc3339(&event.created_at)
                    .map(|created| {
                        let horizon =
                            chrono::Duration::seconds(self.worker_config.reclaim_horizon_seconds as i64);
                        Utc::now() - created > horizon
                    })
                    .unwrap_or(false);

                let physically_present = self
                    .artifact_vault
                    .exists(h264_relative)
                    .await
                    .unwrap_or(false);

                if !physically_present && event_age_exceeded {
                    GuardVerdict::Expired("source never arrived within the reclaim horizon".into())
                } else {
                    GuardVerdict::Retry
                }
            }
            Err(vault_fault) => GuardVerdict::Expired(vault_fault.to_string()),
        }
    }

    async fn resolve_duration(&self, event: &EventRecord, mp4_relative: &str) -> f64 {
        let probed = match self.artifact_vault.resolve(mp4_relative) {
            Ok(output_physical) => self
                .transcoder
                .probe_duration_seconds(&output_physical)
                .await
                .ok()
                .flatten(),
            Err(_) => None,
        };

        probed
            .or(event.video_duration_seconds)
            .unwrap_or(FALLBACK_DURATION_SECONDS)
    }

    /// Borra la fuente H.264 sólo si el MP4 producido es no-vacío.
    async fn cleanup_source(&self, h264_relative: &str, mp4_relative: &str) {
        let produced_size = self
            .artifact_vault
            .size_bytes(mp4_relative)
            .await
            .ok()
            .flatten()
            .unwrap_or(0);

        if produced_size == 0 {
            warn!("🛡️ [CONVERTER]: Produced MP4 [{}] is empty; retaining source.", mp4_relative);
            return;
        }

        if let Err(removal_fault) = self.artifact_vault.remove(h264_relative).await {
            warn!(
                "🛡️ [CONVERTER]: Source [{}] retained (removal rejected: {}).",
                h264_relative, removal_fault
            );
        }
    }
}

enum GuardVerdict {
    /// Artefacto presente y quiescente: proceder.
    Ready,
    /// Aún no confiable: liberar claim y reintentar en otra iteración.
    Retry,
    /// Nunca llegará: latch de fallo con razón opaca.
    Expired(String),
}
