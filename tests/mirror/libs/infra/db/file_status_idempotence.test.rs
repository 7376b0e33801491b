// [tests/mirror/libs/infra/db/file_status_idempotence.test.rs]
/**
 * =================================================================
 * APARATO: FILE TRANSFER IDEMPOTENCE CERTIFICATION (V2.2)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: NO-OP EN REENVÍO EXACTO, CONFLICT EN DIVERGENCIA
 * =================================================================
 */

use std::time::Duration;

use vigil_domain_models::event::ArtifactKind;
use vigil_infra_db::repositories::{CameraRepository, EventRepository};
use vigil_infra_db::{DbError, StoreClient, StoreSettings};

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

async fn seed_event(client: &StoreClient) -> i64 {
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", None, None)
        .await
        .unwrap();
    EventRepository::new(client.clone())
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 187.5, None)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn certify_flag_flip_and_exact_resend_noop() {
    println!("\n🧪 [PROVING_GROUNDS]: Validating progressive transfer idempotence...");

    let client = connect_memory("transfer_idempotence").await;
    let event_id = seed_event(&client).await;
    let events = EventRepository::new(client.clone());

    let picture_path = "camera_1/pictures/1_20251126_143022_a.jpg";

    // Primer sellado: bandera voltea y la ruta queda fija.
    let (record, changed) = events
        .update_file_status(event_id, ArtifactKind::ImageA, picture_path, None)
        .await
        .unwrap();
    assert!(changed);
    assert!(record.image_a_transferred);
    assert_eq!(record.image_a_path.as_deref(), Some(picture_path));

    // Reenvío exacto: éxito sin cambio observable.
    let (record, changed) = events
        .update_file_status(event_id, ArtifactKind::ImageA, picture_path, None)
        .await
        .unwrap();
    assert!(!changed, "L3_TRANSFER: exact resend reported as mutation.");
    assert!(record.image_a_transferred);

    // Ruta divergente para el mismo artefacto: Conflict sin efecto lateral.
    let divergent = events
        .update_file_status(event_id, ArtifactKind::ImageA, "camera_1/pictures/other.jpg", None)
        .await;
    assert!(matches!(divergent, Err(DbError::Conflict(_))), "L3_TRANSFER: divergent path accepted.");

    let untouched = events.get_event(event_id).await.unwrap();
    assert_eq!(untouched.image_a_path.as_deref(), Some(picture_path));

    println!("   ✅ [VERDICT]: Idempotence law certified.");
}

#[tokio::test]
async fn certify_video_transfer_stamps_duration() {
    let client = connect_memory("transfer_video").await;
    let event_id = seed_event(&client).await;
    let events = EventRepository::new(client.clone());

    let (record, changed) = events
        .update_file_status(
            event_id,
            ArtifactKind::VideoH264,
            "camera_1/videos/1_20251126_143022_video.h264",
            Some(61.2),
        )
        .await
        .unwrap();

    assert!(changed);
    assert!(record.video_transferred);
    assert_eq!(record.video_duration_seconds, Some(61.2));
    // El sub-estado MP4 queda al menos en 'pending' para el conversor.
    assert_eq!(record.mp4_conversion_status.as_str(), "pending");
}

#[tokio::test]
async fn certify_each_artifact_slot_is_independent() {
    let client = connect_memory("transfer_slots").await;
    let event_id = seed_event(&client).await;
    let events = EventRepository::new(client.clone());

    events
        .update_file_status(event_id, ArtifactKind::ImageA, "camera_1/pictures/1_a.jpg", None)
        .await
        .unwrap();
    events
        .update_file_status(event_id, ArtifactKind::ImageB, "camera_1/pictures/1_b.jpg", None)
        .await
        .unwrap();
    events
        .update_file_status(event_id, ArtifactKind::Thumbnail, "camera_1/thumbs/1_thumb.jpg", None)
        .await
        .unwrap();

    let record = events.get_event(event_id).await.unwrap();
    assert!(record.image_a_transferred && record.image_b_transferred && record.thumbnail_transferred);
    assert!(!record.video_transferred, "L3_TRANSFER: untouched slot mutated.");

    // Invariante: bandera en true implica ruta no vacía en la misma fila.
    assert!(record.image_a_path.is_some());
    assert!(record.image_b_path.is_some());
    assert!(record.thumbnail_path.is_some());
}

#[tokio::test]
async fn certify_missing_event_is_not_found() {
    let client = connect_memory("transfer_ghost").await;
    seed_event(&client).await;
    let events = EventRepository::new(client.clone());

    let ghost = events
        .update_file_status(777, ArtifactKind::ImageA, "camera_1/pictures/ghost.jpg", None)
        .await;
    assert!(matches!(ghost, Err(DbError::NotFound)));
}
