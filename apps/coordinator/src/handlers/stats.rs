// [apps/coordinator/src/handlers/stats.rs]
/*!
 * =================================================================
 * APARATO: STATISTICS GATEWAY (V2.2 - READ-ONLY COUNTERS)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: AGREGADOS DE SOLO LECTURA PARA EL VISOR
 * =================================================================
 */

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration as ChronoDuration, Utc};

use vigil_domain_contracts::stats::{
    CameraStatsEntry, CameraStatsQuery, CameraStatsResponse, DailyStatsEntry, DailyStatsQuery,
    DailyStatsResponse, OverviewStatsResponse,
};
use vigil_domain_contracts::validation;
use vigil_domain_models::time;
use vigil_infra_db::repositories::StatsRepository;

use crate::errors::ApiError;
use crate::state::AppState;

/// Tope duro de la serie diaria.
const MAX_DAILY_WINDOW: u32 = 90;

/// Endpoint: GET /api/v1/stats/overview
pub async fn handle_overview(
    State(application_state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats_repository = StatsRepository::new(application_state.database_client.clone());
    let counters = stats_repository.overview().await?;

    Ok(Json(OverviewStatsResponse {
        total_cameras: counters.total_cameras,
        total_events: counters.total_events,
        events_by_status: counters.events_by_status,
        events_by_mp4_status: counters.events_by_mp4_status,
        ai_processed_count: counters.ai_processed_count,
        total_log_lines: counters.total_log_lines,
    }))
}

/// Endpoint: GET /api/v1/stats/cameras — desglose paginado por cámara.
pub async fn handle_camera_stats(
    State(application_state): State<AppState>,
    Query(stats_query): Query<CameraStatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = validation::effective_page_limit(stats_query.limit);
    let offset = stats_query.offset.unwrap_or(0);

    let stats_repository = StatsRepository::new(application_state.database_client.clone());
    let (entries, total_count) = stats_repository.per_camera(limit, offset).await?;

    Ok(Json(CameraStatsResponse {
        cameras: entries
            .into_iter()
            .map(|entry| CameraStatsEntry {
                camera_id: entry.camera_id,
                total_events: entry.total_events,
                events_by_status: entry.events_by_status,
            })
            .collect(),
        total_count,
        limit,
        offset,
    }))
}

/// Endpoint: GET /api/v1/stats/daily — serie de eventos por día UTC.
pub async fn handle_daily_stats(
    State(application_state): State<AppState>,
    Query(stats_query): Query<DailyStatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let window_days = stats_query.days.unwrap_or(7).min(MAX_DAILY_WINDOW);
    let cutoff_stamp = time::to_canonical(Utc::now() - ChronoDuration::days(i64::from(window_days)));

    let stats_repository = StatsRepository::new(application_state.database_client.clone());
    let counters = stats_repository.daily_since(&cutoff_stamp).await?;

    Ok(Json(DailyStatsResponse {
        days: counters
            .into_iter()
            .map(|counter| DailyStatsEntry { day: counter.day, event_count: counter.event_count })
            .collect(),
    }))
}
