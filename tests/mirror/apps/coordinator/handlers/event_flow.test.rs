// [tests/mirror/apps/coordinator/handlers/event_flow.test.rs]
/**
 * =================================================================
 * APARATO: EVENT FLOW GATEWAY TEST (V3.0 - HAPPY PATH EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: ESCENARIO COMPLETO DE UN EVENTO VÍA HANDLERS
 *
 * Reproduce el flujo de un incidente real: alta, llegada progresiva de
 * artefactos, sellado terminal y los conflictos de repetición.
 * =================================================================
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use vigil_coordinator::handlers::events::EventLifecycleHandler;
use vigil_coordinator::state::AppState;
use vigil_domain_contracts::event::{
    CreateEventRequest, NeighborQuery, UpdateEventStatusRequest, UpdateFileStatusRequest,
};
use vigil_infra_db::repositories::CameraRepository;
use vigil_infra_db::{StoreClient, StoreSettings};
use vigil_shared_config::{
    ArtifactConfig, DatabaseConfig, HttpConfig, RetentionConfig, SystemConfig, WorkerConfig,
};

fn test_config() -> Arc<SystemConfig> {
    Arc::new(SystemConfig {
        database: DatabaseConfig {
            url: "unused-by-handlers".into(),
            auth_token: None,
            min_connections: 1,
            max_overflow: 4,
            acquire_timeout_seconds: 5.0,
        },
        http: HttpConfig {
            bind_host: "127.0.0.1".into(),
            bind_port: 0,
            allowed_origins: vec!["*".into()],
            request_timeout_seconds: 30.0,
            health_probe_timeout_seconds: 2.0,
        },
        artifacts: ArtifactConfig { root: PathBuf::from("/tmp/vigil-test") },
        workers: WorkerConfig {
            batch_size: 4,
            quiescence_seconds: 0,
            reclaim_horizon_seconds: 600,
            poll_idle_seconds: 0.1,
            per_event_timeout_seconds: 30,
            ai_endpoint_url: "http://127.0.0.1:1".into(),
            ai_vision_model: "llava".into(),
            ai_text_model: "llama3".into(),
            ai_retry_budget: 2,
            ai_call_timeout_seconds: 5,
        },
        retention: RetentionConfig { max_days: None },
    })
}

async fn test_state(name: &str) -> AppState {
    let client = StoreClient::connect(StoreSettings {
        url: format!("file:{name}?mode=memory&cache=shared"),
        auth_token: None,
        min_connections: 1,
        max_overflow: 4,
        acquire_timeout: Duration::from_secs(5),
    })
    .await
    .expect("FALLO_CRÍTICO: No se pudo anclar el Ledger en RAM.");

    CameraRepository::new(client.clone())
        .register("camera_1", "Front Door", Some("Entry"), Some("192.168.1.201"))
        .await
        .unwrap();

    AppState::new(client, test_config())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn file_update(artifact: &str, path: &str, duration: Option<f64>) -> UpdateFileStatusRequest {
    UpdateFileStatusRequest {
        artifact: artifact.to_string(),
        path: path.to_string(),
        duration_seconds: duration,
    }
}

#[tokio::test]
async fn certify_single_event_happy_path() {
    println!("\n🧪 [PROVING_GROUNDS]: Replaying the canonical single-event flow...");

    let application_state = test_state("flow_happy").await;

    // 1. ALTA EN DETECCIÓN DE MOVIMIENTO
    let creation = EventLifecycleHandler::handle_create(
        State(application_state.clone()),
        Json(CreateEventRequest {
            camera_id: "camera_1".into(),
            timestamp: "2025-11-26T14:30:22Z".into(),
            motion_score: 187.5,
            confidence_score: None,
        }),
    )
    .await
    .into_response();

    assert_eq!(creation.status(), StatusCode::CREATED);
    let creation_body = body_json(creation).await;
    assert_eq!(creation_body["event_id"], 1);
    assert_eq!(creation_body["status"], "processing");
    assert_eq!(creation_body["mp4_conversion_status"], "pending");

    // 2. LLEGADA PROGRESIVA DE ARTEFACTOS
    for (artifact, path, duration) in [
        ("image_a", "camera_1/pictures/1_20251126_143022_a.jpg", None),
        ("image_b", "camera_1/pictures/1_20251126_143022_b.jpg", None),
        ("thumbnail", "camera_1/thumbs/1_20251126_143022_thumb.jpg", None),
        ("video_h264", "camera_1/videos/1_20251126_143022_video.h264", Some(61.2)),
    ] {
        let transfer = EventLifecycleHandler::handle_file_status(
            State(application_state.clone()),
            Path(1i64),
            Json(file_update(artifact, path, duration)),
        )
        .await
        .into_response();
        assert_eq!(transfer.status(), StatusCode::OK, "L3_FLOW: {artifact} rejected.");
    }

    let fetched = EventLifecycleHandler::handle_get(State(application_state.clone()), Path(1i64))
        .await
        .into_response();
    let event_body = body_json(fetched).await;
    assert_eq!(event_body["image_a_transferred"], true);
    assert_eq!(event_body["image_b_transferred"], true);
    assert_eq!(event_body["thumbnail_transferred"], true);
    assert_eq!(event_body["video_transferred"], true);
    assert_eq!(event_body["video_duration_seconds"], 61.2);

    // 3. SELLADO TERMINAL POR LA CÁMARA
    let sealing = EventLifecycleHandler::handle_status(
        State(application_state.clone()),
        Path(1i64),
        Json(UpdateEventStatusRequest { status: "complete".into() }),
    )
    .await
    .into_response();
    assert_eq!(sealing.status(), StatusCode::OK);
    assert_eq!(body_json(sealing).await["status"], "complete");

    println!("   ✅ [VERDICT]: Canonical flow certified.");
}

#[tokio::test]
async fn certify_duplicate_terminal_commit_conflicts() {
    let application_state = test_state("flow_terminal_conflict").await;

    EventLifecycleHandler::handle_create(
        State(application_state.clone()),
        Json(CreateEventRequest {
            camera_id: "camera_1".into(),
            timestamp: "2025-11-26T14:30:22Z".into(),
            motion_score: 10.0,
            confidence_score: None,
        }),
    )
    .await
    .into_response();

    EventLifecycleHandler::handle_status(
        State(application_state.clone()),
        Path(1i64),
        Json(UpdateEventStatusRequest { status: "complete".into() }),
    )
    .await
    .into_response();

    // Repetir 'complete' y cruzar a 'interrupted': ambos 409.
    for target in ["complete", "interrupted"] {
        let verdict = EventLifecycleHandler::handle_status(
            State(application_state.clone()),
            Path(1i64),
            Json(UpdateEventStatusRequest { status: target.into() }),
        )
        .await
        .into_response();
        assert_eq!(verdict.status(), StatusCode::CONFLICT, "L3_FLOW: duplicate '{target}' accepted.");
    }

    // Objetivo no terminal: 400 con campo nombrado.
    let illegal = EventLifecycleHandler::handle_status(
        State(application_state.clone()),
        Path(1i64),
        Json(UpdateEventStatusRequest { status: "processing".into() }),
    )
    .await
    .into_response();
    assert_eq!(illegal.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn certify_conflicting_artifact_path() {
    let application_state = test_state("flow_path_conflict").await;

    EventLifecycleHandler::handle_create(
        State(application_state.clone()),
        Json(CreateEventRequest {
            camera_id: "camera_1".into(),
            timestamp: "2025-11-26T14:30:22Z".into(),
            motion_score: 10.0,
            confidence_score: None,
        }),
    )
    .await
    .into_response();

    let original_path = "camera_1/pictures/1_20251126_143022_a.jpg";
    EventLifecycleHandler::handle_file_status(
        State(application_state.clone()),
        Path(1i64),
        Json(file_update("image_a", original_path, None)),
    )
    .await
    .into_response();

    // Ruta divergente: 409.
    let divergent = EventLifecycleHandler::handle_file_status(
        State(application_state.clone()),
        Path(1i64),
        Json(file_update("image_a", "camera_1/pictures/other.jpg", None)),
    )
    .await
    .into_response();
    assert_eq!(divergent.status(), StatusCode::CONFLICT);

    // Reenvío exacto: 200 con changed=false.
    let resend = EventLifecycleHandler::handle_file_status(
        State(application_state.clone()),
        Path(1i64),
        Json(file_update("image_a", original_path, None)),
    )
    .await
    .into_response();
    assert_eq!(resend.status(), StatusCode::OK);
    assert_eq!(body_json(resend).await["changed"], false);

    // Ruta absoluta: rechazo de validación pura.
    let absolute = EventLifecycleHandler::handle_file_status(
        State(application_state.clone()),
        Path(1i64),
        Json(file_update("image_b", "/etc/passwd", None)),
    )
    .await
    .into_response();
    assert_eq!(absolute.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn certify_neighbor_navigation_endpoint() {
    let application_state = test_state("flow_neighbors").await;

    for second in ["22", "23", "24"] {
        EventLifecycleHandler::handle_create(
            State(application_state.clone()),
            Json(CreateEventRequest {
                camera_id: "camera_1".into(),
                timestamp: format!("2025-11-26T14:30:{second}Z"),
                motion_score: 10.0,
                confidence_score: None,
            }),
        )
        .await
        .into_response();
    }

    let navigation = EventLifecycleHandler::handle_neighbors(
        State(application_state),
        Path(2i64),
        Query(NeighborQuery { camera_id: Some("camera_1".into()) }),
    )
    .await
    .into_response();

    assert_eq!(navigation.status(), StatusCode::OK);
    let body = body_json(navigation).await;
    assert_eq!(body["previous_id"], 1);
    assert_eq!(body["next_id"], 3);
}
