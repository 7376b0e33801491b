// [tests/mirror/libs/infra/db/event_lifecycle.test.rs]
/**
 * =================================================================
 * APARATO: EVENT LIFECYCLE CERTIFICATION (V3.1 - TERMINAL EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: ALTA, TRANSICIONES TERMINALES Y ORTOGONALIDAD MP4
 * =================================================================
 */

use std::time::Duration;

use vigil_domain_models::event::{ArtifactKind, EventStatus, Mp4Status};
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

#[tokio::test]
async fn certify_creation_defaults() {
    let client = connect_memory("lifecycle_defaults").await;
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", Some("Entry"), Some("192.168.1.201"))
        .await
        .unwrap();

    let events = EventRepository::new(client.clone());
    let record = events
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 187.5, Some(80.0))
        .await
        .unwrap();

    assert_eq!(record.id, 1, "L3_LEDGER: first event must take id 1.");
    assert_eq!(record.status, EventStatus::Processing);
    assert_eq!(record.mp4_conversion_status, Mp4Status::Pending);
    assert!(!record.image_a_transferred && !record.image_b_transferred);
    assert!(!record.thumbnail_transferred && !record.video_transferred);
    assert!(record.image_a_path.is_none() && record.video_h264_path.is_none());
    assert!(!record.ai_processed);
    assert_eq!(record.confidence_score, Some(80.0));
}

#[tokio::test]
async fn certify_unknown_camera_is_not_found() {
    let client = connect_memory("lifecycle_fk").await;
    let events = EventRepository::new(client.clone());

    let verdict = events
        .create_event("ghost_camera", "2025-11-26T14:30:22.000000+00:00", 10.0, None)
        .await;
    assert!(matches!(verdict, Err(DbError::NotFound)), "L3_FK: orphan event accepted.");
}

#[tokio::test]
async fn certify_terminal_transition_discipline() {
    println!("\n🧪 [PROVING_GROUNDS]: Validating terminal absorption in the Ledger...");

    let client = connect_memory("lifecycle_terminal").await;
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", None, None)
        .await
        .unwrap();

    let events = EventRepository::new(client.clone());
    let record = events
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 42.0, None)
        .await
        .unwrap();

    // processing -> complete: legal.
    let sealed = events.update_event_status(record.id, EventStatus::Complete).await.unwrap();
    assert_eq!(sealed.status, EventStatus::Complete);

    // Terminal repetido y terminal cruzado: ambos Conflict.
    let duplicate = events.update_event_status(record.id, EventStatus::Complete).await;
    assert!(matches!(duplicate, Err(DbError::Conflict(_))), "L3_DAG: terminal re-entry accepted.");

    let crossed = events.update_event_status(record.id, EventStatus::Interrupted).await;
    assert!(matches!(crossed, Err(DbError::Conflict(_))), "L3_DAG: terminal crossover accepted.");

    // Identificador inexistente: NotFound.
    let ghost = events.update_event_status(9999, EventStatus::Failed).await;
    assert!(matches!(ghost, Err(DbError::NotFound)));

    println!("   ✅ [VERDICT]: Terminal discipline certified.");
}

#[tokio::test]
async fn certify_mp4_column_is_orthogonal_to_terminal_status() {
    let client = connect_memory("lifecycle_orthogonal").await;
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", None, None)
        .await
        .unwrap();

    let events = EventRepository::new(client.clone());
    let record = events
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 42.0, None)
        .await
        .unwrap();

    events
        .update_file_status(
            record.id,
            ArtifactKind::VideoH264,
            "camera_1/videos/1_20251126_143022_video.h264",
            Some(61.2),
        )
        .await
        .unwrap();

    // La cámara sella terminal mientras el MP4 sigue en vuelo.
    events.update_event_status(record.id, EventStatus::Complete).await.unwrap();

    // Los workers completan su paso con normalidad: las columnas son independientes.
    let claimed = events
        .claim_for_conversion("host:1:convert", 4, Duration::from_secs(600))
        .await
        .unwrap();
    assert_eq!(claimed.len(), 1);

    events
        .commit_conversion(record.id, "host:1:convert", "camera_1/videos/1_20251126_143022_video.mp4", 61.2)
        .await
        .unwrap();

    let final_record = events.get_event(record.id).await.unwrap();
    assert_eq!(final_record.status, EventStatus::Complete);
    assert_eq!(final_record.mp4_conversion_status, Mp4Status::Complete);
}
