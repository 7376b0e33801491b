// [apps/coordinator/src/routes.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN ROUTING MATRIX (V6.0 - RESOURCE TOPOLOGY)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE ENDPOINTS BAJO EL PREFIJO /api/v1
 *
 * VISION HIPER-HOLÍSTICA:
 * La topología agrupa por recurso (cámaras, eventos, logs, salud,
 * estadísticas) y aplica tres escudos globales: CORS configurado,
 * rastro HTTP y presupuesto de petición.
 * =================================================================
 */

use crate::handlers::{cameras, events, health, logs, stats};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(application_shared_state: AppState) -> Router {
    // Escudo de Red: CORS para el visor y herramientas de operación.
    let configured_origins = &application_shared_state.config.http.allowed_origins;
    let origin_policy = if configured_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            configured_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    let network_security_shield = CorsLayer::new()
        .allow_origin(origin_policy)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let request_budget_shield =
        TimeoutLayer::new(application_shared_state.config.request_timeout());

    // ESTRATO DE DIRECTORIO: Cámaras
    let camera_stratum = Router::new()
        .route(
            "/cameras",
            get(cameras::CameraDirectoryHandler::handle_list)
                .post(cameras::CameraDirectoryHandler::handle_register),
        )
        .route(
            "/cameras/:camera_id",
            get(cameras::CameraDirectoryHandler::handle_get)
                .delete(cameras::CameraDirectoryHandler::handle_delete),
        )
        .route(
            "/cameras/:camera_id/heartbeat",
            post(cameras::CameraDirectoryHandler::handle_heartbeat),
        );

    // ESTRATO DE CICLO DE VIDA: Eventos
    let event_stratum = Router::new()
        .route(
            "/events",
            get(events::EventLifecycleHandler::handle_list)
                .post(events::EventLifecycleHandler::handle_create),
        )
        .route("/events/:event_id", get(events::EventLifecycleHandler::handle_get))
        .route("/events/:event_id/neighbors", get(events::EventLifecycleHandler::handle_neighbors))
        .route("/events/:event_id/files", post(events::EventLifecycleHandler::handle_file_status))
        .route("/events/:event_id/status", post(events::EventLifecycleHandler::handle_status));

    // ESTRATO DE OBSERVABILIDAD: Pipeline de logs
    let log_stratum = Router::new()
        .route("/logs", get(logs::handle_log_query).post(logs::handle_log_ingestion))
        .route("/logs/since", get(logs::handle_logs_since));

    // ESTRATO DE AGREGADOS: Estadísticas de solo lectura
    let stats_stratum = Router::new()
        .route("/stats/overview", get(stats::handle_overview))
        .route("/stats/cameras", get(stats::handle_camera_stats))
        .route("/stats/daily", get(stats::handle_daily_stats));

    // COMPOSICIÓN GLOBAL (Root Topology)
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(camera_stratum)
                .merge(event_stratum)
                .merge(log_stratum)
                .merge(stats_stratum)
                .route("/health", get(health::handle_health)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(request_budget_shield)
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
