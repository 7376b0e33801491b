// [tests/mirror/apps/coordinator/health_probe.test.rs]
/**
 * =================================================================
 * APARATO: HEALTH PROBE CERTIFICATION (V1.1 - BOUNDED EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: VEREDICTO 'healthy' CON STORE VIVO Y SONDEO ACOTADO
 * =================================================================
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use vigil_coordinator::handlers::health;
use vigil_coordinator::state::AppState;
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

#[tokio::test]
async fn certify_healthy_verdict_with_live_store() {
    println!("\n🧪 [PROVING_GROUNDS]: Probing the coordination core health gate...");

    let client = StoreClient::connect(StoreSettings {
        url: "file:health_probe?mode=memory&cache=shared".into(),
        auth_token: None,
        min_connections: 1,
        max_overflow: 4,
        acquire_timeout: Duration::from_secs(5),
    })
    .await
    .expect("FALLO_CRÍTICO: No se pudo anclar el Ledger en RAM.");

    let application_state = AppState::new(client, test_config());

    let response = health::handle_health(State(application_state)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body.get("reason").is_none(), "L3_HEALTH: healthy verdict must omit reason.");

    println!("   ✅ [VERDICT]: Health gate certified.");
}
