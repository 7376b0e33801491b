// [tests/mirror/apps/pipeline_worker/conversion_worker.test.rs]
/**
 * =================================================================
 * APARATO: CONVERSION WORKER CERTIFICATION (V3.0 - FULL CYCLE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L1-MIRROR)
 * RESPONSABILIDAD: CLAIM -> GUARD -> WORK -> COMMIT CON TRANSCODER SINTÉTICO
 *
 * El transcodificador sintético escribe un MP4 no-vacío y reporta una
 * duración fija, certificando el ciclo sin binarios de ffmpeg.
 * =================================================================
 */

use std::future::Future;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use vigil_domain_models::event::{ArtifactKind, Mp4Status};
use vigil_infra_artifacts::ArtifactVault;
use vigil_infra_db::repositories::{CameraRepository, EventRepository};
use vigil_infra_db::{StoreClient, StoreSettings};
use vigil_infra_media::{MediaError, MediaTranscoder};
use vigil_pipeline_worker::workers::{ConversionWorker, WorkerContext};
use vigil_shared_config::WorkerConfig;

/// Transcodificador sintético: escribe payloads fijos y sondea 61.2s.
struct SyntheticTranscoder;

impl MediaTranscoder for SyntheticTranscoder {
    fn remux_to_mp4(
        &self,
        _input: &Path,
        output: &Path,
        _budget: Duration,
    ) -> impl Future<Output = Result<(), MediaError>> + Send {
        let output = output.to_path_buf();
        async move {
            tokio::fs::write(&output, b"SYNTHETIC_MP4_PAYLOAD")
                .await
                .map_err(MediaError::Io)
        }
    }

    fn optimize_mp4(
        &self,
        _input: &Path,
        output: &Path,
        _budget: Duration,
    ) -> impl Future<Output = Result<(), MediaError>> + Send {
        let output = output.to_path_buf();
        async move { tokio::fs::write(&output, b"OPT").await.map_err(MediaError::Io) }
    }

    fn probe_duration_seconds(
        &self,
        _input: &Path,
    ) -> impl Future<Output = Result<Option<f64>, MediaError>> + Send {
        async { Ok(Some(61.2)) }
    }
}

fn worker_config() -> WorkerConfig {
    WorkerConfig {
        batch_size: 4,
        quiescence_seconds: 0,
        reclaim_horizon_seconds: 600,
        poll_idle_seconds: 0.05,
        per_event_timeout_seconds: 30,
        ai_endpoint_url: "http://127.0.0.1:1".into(),
        ai_vision_model: "llava".into(),
        ai_text_model: "llama3".into(),
        ai_retry_budget: 2,
        ai_call_timeout_seconds: 5,
    }
}

async fn connect_memory(name: &str) -> StoreClient {
    StoreClient::connect(StoreSettings {
        url: format!("file:{name}?mode=memory&cache=shared"),
        auth_token: None,
        min_connections: 1,
        max_overflow: 4,
        acquire_timeout: Duration::from_secs(5),
    })
    .await
    .expect("FALLO_CRÍTICO: No se pudo anclar el Ledger en RAM.")
}

async fn seed_event_with_video(client: &StoreClient, relative: &str) -> i64 {
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", None, None)
        .await
        .ok();

    let events = EventRepository::new(client.clone());
    let record = events
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 187.5, None)
        .await
        .unwrap();
    events
        .update_file_status(record.id, ArtifactKind::VideoH264, relative, Some(99.0))
        .await
        .unwrap();
    record.id
}

#[tokio::test]
async fn certify_full_conversion_cycle() {
    println!("\n🧪 [PROVING_GROUNDS]: Running a full conversion iteration...");

    let scratch = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(scratch.path().join("camera_1/videos")).await.unwrap();

    let h264_relative = "camera_1/videos/1_20251126_143022_video.h264";
    tokio::fs::write(scratch.path().join(h264_relative), b"H264_ELEMENTARY").await.unwrap();

    let client = connect_memory("converter_cycle").await;
    let event_id = seed_event_with_video(&client, h264_relative).await;

    let worker = ConversionWorker::new(
        EventRepository::new(client.clone()),
        ArtifactVault::new(scratch.path()),
        SyntheticTranscoder,
        worker_config(),
        WorkerContext::new("convert", Arc::new(AtomicBool::new(false)), Duration::from_millis(50)),
    );

    let processed = worker.run_single_iteration().await.unwrap();
    assert_eq!(processed, 1);

    let record = EventRepository::new(client.clone()).get_event(event_id).await.unwrap();
    assert_eq!(record.mp4_conversion_status, Mp4Status::Complete);
    assert_eq!(
        record.video_mp4_path.as_deref(),
        Some("camera_1/videos/1_20251126_143022_video.mp4")
    );
    assert_eq!(record.video_duration_seconds, Some(61.2), "L1_DURATION: probe verdict ignored.");
    assert!(record.mp4_converted_at.is_some());
    assert!(record.mp4_claimed_by.is_none());

    // Exactamente un MP4 final; la fuente H.264 consumida.
    let mp4_physical = scratch.path().join("camera_1/videos/1_20251126_143022_video.mp4");
    assert!(mp4_physical.exists());
    assert!(!scratch.path().join(h264_relative).exists(), "L1_HYGIENE: source retained after verified MP4.");

    // Iteración siguiente: sin candidatos.
    let idle = worker.run_single_iteration().await.unwrap();
    assert_eq!(idle, 0);

    println!("   ✅ [VERDICT]: Conversion cycle certified.");
}

#[tokio::test]
async fn certify_missing_source_releases_claim() {
    let scratch = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(scratch.path().join("camera_1/videos")).await.unwrap();

    let client = connect_memory("converter_release").await;
    // Bandera sellada pero el fichero aún no aterriza en el storage compartido.
    let event_id = seed_event_with_video(&client, "camera_1/videos/9_video.h264").await;

    let worker = ConversionWorker::new(
        EventRepository::new(client.clone()),
        ArtifactVault::new(scratch.path()),
        SyntheticTranscoder,
        worker_config(),
        WorkerContext::new("convert", Arc::new(AtomicBool::new(false)), Duration::from_millis(50)),
    );

    // La iteración reclama y libera: la fila regresa a 'pending' sin claim.
    let processed = worker.run_single_iteration().await.unwrap();
    assert_eq!(processed, 1);

    let record = EventRepository::new(client.clone()).get_event(event_id).await.unwrap();
    assert_eq!(record.mp4_conversion_status, Mp4Status::Pending, "L1_GUARD: premature fail latch.");
    assert!(record.mp4_claimed_by.is_none(), "L1_GUARD: dangling claim after release.");
}

#[tokio::test]
async fn certify_expired_source_latches_failed() {
    let scratch = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(scratch.path().join("camera_1/videos")).await.unwrap();

    let client = connect_memory("converter_expired").await;
    let event_id = seed_event_with_video(&client, "camera_1/videos/9_video.h264").await;

    // Envejecimiento forzado del alta: el fichero ya no va a llegar.
    let raw_connection = client.acquire().await.unwrap();
    raw_connection
        .execute(
            "UPDATE events SET created_at = '2000-01-01T00:00:00.000000+00:00' WHERE id = ?1",
            [event_id],
        )
        .await
        .unwrap();
    drop(raw_connection);

    let worker = ConversionWorker::new(
        EventRepository::new(client.clone()),
        ArtifactVault::new(scratch.path()),
        SyntheticTranscoder,
        worker_config(),
        WorkerContext::new("convert", Arc::new(AtomicBool::new(false)), Duration::from_millis(50)),
    );

    worker.run_single_iteration().await.unwrap();

    let record = EventRepository::new(client.clone()).get_event(event_id).await.unwrap();
    assert_eq!(record.mp4_conversion_status, Mp4Status::Failed, "L1_GUARD: expired source not latched.");
    assert!(record.mp4_claimed_by.is_none());
}
