// [apps/coordinator/src/handlers/health.rs]
/*!
 * =================================================================
 * APARATO: HEALTH PROBE GATEWAY (V2.1 - BOUNDED VERDICT)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: VEREDICTO DE SALUD ACOTADO CONTRA EL STORE
 * =================================================================
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/**
 * Endpoint: GET /api/v1/health
 *
 * 'healthy' sólo si el Store responde al sondeo trivial dentro del
 * presupuesto configurado; cualquier otra cosa es 'unhealthy' con razón.
 */
pub async fn handle_health(State(application_state): State<AppState>) -> impl IntoResponse {
    let probe_budget = application_state.config.health_probe_timeout();

    let verdict = tokio::time::timeout(probe_budget, application_state.database_client.ping()).await;

    match verdict {
        Ok(Ok(())) => (StatusCode::OK, Json(HealthResponse { status: "healthy", reason: None })),
        Ok(Err(store_fault)) => {
            warn!("🏥 [HEALTH]: Store probe rejected: {}", store_fault);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "unhealthy", reason: Some(store_fault.to_string()) }),
            )
        }
        Err(_elapsed) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "unhealthy", reason: Some("store probe timed out".into()) }),
        ),
    }
}
