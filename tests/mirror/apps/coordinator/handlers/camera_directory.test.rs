// [tests/mirror/apps/coordinator/handlers/camera_directory.test.rs]
/**
 * =================================================================
 * APARATO: CAMERA DIRECTORY GATEWAY TEST (V2.1 - REGISTRY EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA RUTA VALIDACIÓN -> STORE -> HTTP
 * =================================================================
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use vigil_coordinator::handlers::cameras::CameraDirectoryHandler;
use vigil_coordinator::state::AppState;
use vigil_domain_contracts::camera::RegisterCameraRequest;
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

    AppState::new(client, test_config())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn certify_register_and_lookup_roundtrip() {
    println!("\n🧪 [PROVING_GROUNDS]: Initiating Camera Directory Gateway Audit...");

    let application_state = test_state("gateway_register").await;

    let response = CameraDirectoryHandler::handle_register(
        State(application_state.clone()),
        Json(RegisterCameraRequest {
            camera_id: "camera_1".into(),
            display_name: "Front Door".into(),
            location: Some("Entry".into()),
            network_address: Some("192.168.1.201".into()),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["camera_id"], "camera_1");
    assert_eq!(body["display_name"], "Front Door");
    assert_eq!(body["status"], "online");

    // El directorio devuelve exactamente una cámara con ese identificador.
    let listing = CameraDirectoryHandler::handle_list(State(application_state.clone()))
        .await
        .into_response();
    assert_eq!(listing.status(), StatusCode::OK);
    let listing_body = body_json(listing).await;
    assert_eq!(listing_body["total_count"], 1);
    assert_eq!(listing_body["cameras"][0]["camera_id"], "camera_1");

    let lookup = CameraDirectoryHandler::handle_get(
        State(application_state),
        Path("camera_1".to_string()),
    )
    .await
    .into_response();
    assert_eq!(lookup.status(), StatusCode::OK);

    println!("   ✅ [VERDICT]: Registry roundtrip certified.");
}

#[tokio::test]
async fn certify_pattern_rejection_names_field() {
    let application_state = test_state("gateway_pattern").await;

    let response = CameraDirectoryHandler::handle_register(
        State(application_state),
        Json(RegisterCameraRequest {
            camera_id: "camera-1!".into(),
            display_name: "Bad".into(),
            location: None,
            network_address: None,
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "camera_id");
}

#[tokio::test]
async fn certify_missing_camera_is_404() {
    let application_state = test_state("gateway_missing").await;

    let response = CameraDirectoryHandler::handle_get(
        State(application_state),
        Path("camera_9".to_string()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}
