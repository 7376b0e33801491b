// [tests/mirror/libs/infra/db/analysis_latch.test.rs]
/**
 * =================================================================
 * APARATO: AI LATCH CERTIFICATION (V2.2 - SINGLE WRITE EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: ESCRITURA ATÓMICA ÚNICA Y NO-RESELECCIÓN
 *
 * # Mathematical Proof (Latch Monotonicity):
 * 'ai_processed' sólo transita 0 -> 1 y el predicado de claim exige 0;
 * por inducción, ningún evento sellado vuelve a ser seleccionado y las
 * anotaciones se escriben exactamente una vez.
 * =================================================================
 */

use std::time::Duration;

use vigil_domain_models::event::{AiAnnotations, ArtifactKind};
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

/// Evento con ambas imágenes transferidas (predicado del worker de IA).
async fn seed_analyzable_event(client: &StoreClient) -> i64 {
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", None, None)
        .await
        .ok();

    let events = EventRepository::new(client.clone());
    let record = events
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 50.0, None)
        .await
        .unwrap();

    events
        .update_file_status(record.id, ArtifactKind::ImageA, &format!("camera_1/pictures/{}_a.jpg", record.id), None)
        .await
        .unwrap();
    events
        .update_file_status(record.id, ArtifactKind::ImageB, &format!("camera_1/pictures/{}_b.jpg", record.id), None)
        .await
        .unwrap();

    record.id
}

#[tokio::test]
async fn certify_predicate_requires_both_images() {
    let client = connect_memory("latch_predicate").await;
    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", None, None)
        .await
        .unwrap();

    let events = EventRepository::new(client.clone());
    let record = events
        .create_event("camera_1", "2025-11-26T14:30:22.000000+00:00", 50.0, None)
        .await
        .unwrap();

    // Una sola imagen: candidato invisible.
    events
        .update_file_status(record.id, ArtifactKind::ImageA, "camera_1/pictures/1_a.jpg", None)
        .await
        .unwrap();
    let premature = events
        .claim_for_analysis("host:1:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();
    assert!(premature.is_empty(), "L3_CLAIM: single-image event selected.");

    events
        .update_file_status(record.id, ArtifactKind::ImageB, "camera_1/pictures/1_b.jpg", None)
        .await
        .unwrap();
    let ready = events
        .claim_for_analysis("host:1:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();
    assert_eq!(ready.len(), 1);
}

#[tokio::test]
async fn certify_successful_latch_is_final() {
    println!("\n🧪 [PROVING_GROUNDS]: Validating single-write AI latch...");

    let client = connect_memory("latch_success").await;
    let event_id = seed_analyzable_event(&client).await;
    let events = EventRepository::new(client.clone());

    events
        .claim_for_analysis("host:1:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();

    events
        .commit_analysis(
            event_id,
            "host:1:analyze",
            &AiAnnotations {
                person_detected: Some(true),
                confidence: Some(0.91),
                objects: Some(r#"["person","package"]"#.to_string()),
                description: Some("A courier left a package at the door.".to_string()),
                phrase: Some("Courier drop-off at front door.".to_string()),
                error: None,
            },
        )
        .await
        .unwrap();

    let sealed = events.get_event(event_id).await.unwrap();
    assert!(sealed.ai_processed);
    assert!(sealed.ai_processed_at.is_some());
    assert_eq!(sealed.ai_person_detected, Some(true));
    assert_eq!(sealed.ai_confidence, Some(0.91));
    assert!(sealed.ai_phrase.is_some() && sealed.ai_description.is_some());
    assert!(sealed.ai_claimed_by.is_none(), "L3_CLAIM: dangling AI claim after latch.");

    // Jamás re-seleccionado, jamás re-escrito.
    let reselect = events
        .claim_for_analysis("host:2:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();
    assert!(reselect.is_empty(), "L3_LATCH: sealed event reselected.");

    let rewrite = events
        .commit_analysis(event_id, "host:1:analyze", &AiAnnotations::default())
        .await;
    assert!(matches!(rewrite, Err(DbError::ClaimLost)), "L3_LATCH: double write accepted.");

    println!("   ✅ [VERDICT]: Single-write latch certified.");
}

#[tokio::test]
async fn certify_error_latch_blocks_reprocessing() {
    let client = connect_memory("latch_error").await;
    let event_id = seed_analyzable_event(&client).await;
    let events = EventRepository::new(client.clone());

    events
        .claim_for_analysis("host:1:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();

    // Presupuesto agotado: latch con error y descripción nula.
    events
        .commit_analysis(
            event_id,
            "host:1:analyze",
            &AiAnnotations {
                error: Some("[L3_VISION_FAULT]: MODEL_HOST_UNREACHABLE -> budget exhausted".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let sealed = events.get_event(event_id).await.unwrap();
    assert!(sealed.ai_processed, "L3_LATCH: error path must still seal the latch.");
    assert!(sealed.ai_error.is_some());
    assert!(sealed.ai_description.is_none());

    let reselect = events
        .claim_for_analysis("host:2:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();
    assert!(reselect.is_empty(), "L3_LATCH: failed event reattempted.");
}

#[tokio::test]
async fn certify_release_allows_retry_without_latch() {
    let client = connect_memory("latch_release").await;
    let event_id = seed_analyzable_event(&client).await;
    let events = EventRepository::new(client.clone());

    events
        .claim_for_analysis("host:1:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();

    // Fallo de red dentro del presupuesto: liberar sin latch.
    let released = events
        .release_analysis_claim(event_id, "host:1:analyze")
        .await
        .unwrap();
    assert!(released);

    let record = events.get_event(event_id).await.unwrap();
    assert!(!record.ai_processed);
    assert!(record.ai_claimed_by.is_none());

    // Reintentable por cualquier instancia.
    let retried = events
        .claim_for_analysis("host:2:analyze", 4, Duration::from_secs(600))
        .await
        .unwrap();
    assert_eq!(retried.len(), 1);
}
