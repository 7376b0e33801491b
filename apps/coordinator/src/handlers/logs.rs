// [apps/coordinator/src/handlers/logs.rs]
/*!
 * =================================================================
 * APARATO: LOG PIPELINE GATEWAY (V5.1 - WATERMARK TAIL)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: INGESTA ATÓMICA Y CONSULTA ORDENADA DE LOGS
 *
 * # Logic:
 * No existe cola en memoria: el Store ES la cola. El visor consume con
 * la marca de agua 'since' en orden ascendente de ID, inmune a inserts
 * concurrentes.
 * =================================================================
 */

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use vigil_domain_contracts::log::{
    LogIngestRequest, LogIngestResponse, LogLineResponse, LogOrder, LogPageResponse, LogQuery,
    LogQueryFilters, LogsSinceQuery,
};
use vigil_infra_db::repositories::{LogFilters, LogRepository, NewLogLine, QueryOrder};

use crate::errors::ApiError;
use crate::state::AppState;

fn to_store_filters(filters: LogQueryFilters) -> LogFilters {
    LogFilters {
        source: filters.source,
        levels: filters.levels,
        start: filters.start,
        end: filters.end,
        order: match filters.order {
            LogOrder::Asc => QueryOrder::Ascending,
            LogOrder::Desc => QueryOrder::Descending,
        },
        limit: filters.limit,
        offset: filters.offset,
    }
}

/**
 * Endpoint: POST /api/v1/logs
 *
 * Ingesta por lotes todo-o-nada; el acuse reporta el conteo aceptado y
 * el rango contiguo de IDs asignado.
 */
#[instrument(skip(application_state, request_payload), fields(batch = request_payload.lines.len()))]
pub async fn handle_log_ingestion(
    State(application_state): State<AppState>,
    Json(request_payload): Json<LogIngestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let validated_lines = request_payload.validate()?;

    let store_lines: Vec<NewLogLine> = validated_lines
        .into_iter()
        .map(|line| NewLogLine {
            source: line.source,
            timestamp: line.timestamp,
            level: line.level,
            message: line.message,
        })
        .collect();

    let log_repository = LogRepository::new(application_state.database_client.clone());
    let (accepted_count, first_id, last_id) = log_repository.batch_insert(&store_lines).await?;

    Ok((
        StatusCode::CREATED,
        Json(LogIngestResponse { accepted_count, first_id, last_id }),
    ))
}

/// Endpoint: GET /api/v1/logs — consulta paginada con filtros y orden.
pub async fn handle_log_query(
    State(application_state): State<AppState>,
    Query(log_query): Query<LogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filters = log_query.validate()?;
    let limit = filters.limit;
    let offset = filters.offset;

    let log_repository = LogRepository::new(application_state.database_client.clone());
    let (records, total_count) = log_repository.query(&to_store_filters(filters)).await?;

    Ok(Json(LogPageResponse {
        lines: records.into_iter().map(LogLineResponse::from).collect(),
        total_count,
        limit,
        offset,
    }))
}

/**
 * Endpoint: GET /api/v1/logs/since
 *
 * Cola por marca de agua: IDs estrictamente mayores que 'after_id' en
 * orden ascendente, honrando filtros de fuente y severidad.
 */
#[instrument(skip(application_state, since_query), fields(after_id = since_query.after_id))]
pub async fn handle_logs_since(
    State(application_state): State<AppState>,
    Query(since_query): Query<LogsSinceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filters = since_query.validate()?;
    let after_id = since_query.after_id;

    let log_repository = LogRepository::new(application_state.database_client.clone());
    let records = log_repository.since_id(after_id, &to_store_filters(filters)).await?;

    let lines: Vec<LogLineResponse> = records.into_iter().map(LogLineResponse::from).collect();
    Ok(Json(lines))
}
