// [tests/mirror/apps/coordinator/handlers/log_gateway.test.rs]
/**
 * =================================================================
 * APARATO: LOG GATEWAY TEST (V2.2 - INGEST & TAIL EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L3-MIRROR)
 * RESPONSABILIDAD: INGESTA ATÓMICA, MARCA DE AGUA Y RECHAZO DE LOTE
 * =================================================================
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use vigil_coordinator::handlers::logs;
use vigil_coordinator::state::AppState;
use vigil_domain_contracts::log::{LogIngestRequest, LogLineInput, LogQuery, LogsSinceQuery};
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

fn wire_line(source: &str, level: &str, message: &str) -> LogLineInput {
    LogLineInput {
        source: source.to_string(),
        timestamp: "2025-11-26T14:30:22Z".to_string(),
        level: level.to_string(),
        message: message.to_string(),
    }
}

#[tokio::test]
async fn certify_batch_ingest_and_since_tail() {
    println!("\n🧪 [PROVING_GROUNDS]: Initiating Log Gateway watermark audit...");

    let application_state = test_state("log_gateway_happy").await;

    // Escenario canónico: 3 líneas mixtas.
    let ingest = logs::handle_log_ingestion(
        State(application_state.clone()),
        Json(LogIngestRequest {
            lines: vec![
                wire_line("camera_1", "INFO", "a"),
                wire_line("camera_1", "WARNING", "b"),
                wire_line("central", "ERROR", "c"),
            ],
        }),
    )
    .await
    .into_response();

    assert_eq!(ingest.status(), StatusCode::CREATED);
    let ingest_body = body_json(ingest).await;
    assert_eq!(ingest_body["accepted_count"], 3);
    let first_id = ingest_body["first_id"].as_i64().unwrap();
    let last_id = ingest_body["last_id"].as_i64().unwrap();
    assert_eq!(last_id, first_id + 2);

    // 'since k-1' con los tres niveles y fuente 'all': exactamente esas tres.
    let tail = logs::handle_logs_since(
        State(application_state.clone()),
        Query(LogsSinceQuery {
            after_id: first_id - 1,
            source: Some("all".into()),
            levels: Some("INFO,WARNING,ERROR".into()),
            limit: Some(50),
        }),
    )
    .await
    .into_response();

    assert_eq!(tail.status(), StatusCode::OK);
    let tail_body = body_json(tail).await;
    let lines = tail_body.as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"].as_i64().unwrap(), first_id);
    assert_eq!(lines[2]["id"].as_i64().unwrap(), last_id);
    assert_eq!(lines[2]["source"], "central");

    println!("   ✅ [VERDICT]: Watermark tail certified ({first_id}..{last_id}).");
}

#[tokio::test]
async fn certify_poisoned_batch_rejected_atomically() {
    let application_state = test_state("log_gateway_atomic").await;

    // Una línea con severidad ilegal veta el lote completo.
    let ingest = logs::handle_log_ingestion(
        State(application_state.clone()),
        Json(LogIngestRequest {
            lines: vec![
                wire_line("camera_1", "INFO", "fine"),
                wire_line("camera_1", "VERBOSE", "poison"),
            ],
        }),
    )
    .await
    .into_response();

    assert_eq!(ingest.status(), StatusCode::BAD_REQUEST);
    let body = body_json(ingest).await;
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "lines[1].level");

    // Nada persistió: el Ledger sigue vacío.
    let query = logs::handle_log_query(
        State(application_state),
        Query(LogQuery::default()),
    )
    .await
    .into_response();
    assert_eq!(body_json(query).await["total_count"], 0);
}

#[tokio::test]
async fn certify_source_pattern_rejection() {
    let application_state = test_state("log_gateway_source").await;

    let ingest = logs::handle_log_ingestion(
        State(application_state),
        Json(LogIngestRequest {
            lines: vec![wire_line("not a source!", "INFO", "x")],
        }),
    )
    .await
    .into_response();

    assert_eq!(ingest.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(ingest).await["field"], "lines[0].source");
}

#[tokio::test]
async fn certify_query_filters_and_order() {
    let application_state = test_state("log_gateway_query").await;

    logs::handle_log_ingestion(
        State(application_state.clone()),
        Json(LogIngestRequest {
            lines: vec![
                wire_line("camera_1", "INFO", "a"),
                wire_line("central", "ERROR", "b"),
            ],
        }),
    )
    .await
    .into_response();

    // Filtro de fuente + orden ascendente explícito.
    let query = logs::handle_log_query(
        State(application_state),
        Query(LogQuery {
            source: Some("central".into()),
            levels: Some("ERROR".into()),
            order: Some("asc".into()),
            ..Default::default()
        }),
    )
    .await
    .into_response();

    assert_eq!(query.status(), StatusCode::OK);
    let body = body_json(query).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["lines"][0]["message"], "b");
}
