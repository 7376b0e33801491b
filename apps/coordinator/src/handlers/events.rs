// [apps/coordinator/src/handlers/events.rs]
/*!
 * =================================================================
 * APARATO: EVENT LIFECYCLE HANDLER (V7.2 - PROGRESSIVE TRANSFER)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ALTA, CONSULTA Y TRANSICIONES DE EVENTOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ORDERED PIPELINE: La cámara escribe el artefacto en el storage
 *    ANTES de voltear la bandera aquí; los workers cubren la carrera
 *    restante con la ventana de quiescencia.
 * 2. IDEMPOTENT TRANSFER: Repetir la misma ruta es un no-op; una ruta
 *    divergente responde 409 sin efecto lateral.
 * 3. TERMINAL DISCIPLINE: Las transiciones de estado sólo aceptan
 *    objetivos terminales y sólo desde 'processing'.
 * =================================================================
 */

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, instrument};

use vigil_domain_contracts::event::{
    CreateEventRequest, CreateEventResponse, EventListQuery, EventPageResponse, EventResponse,
    NeighborQuery, NeighborResponse, UpdateEventStatusRequest, UpdateFileStatusRequest,
    UpdateFileStatusResponse,
};
use vigil_domain_contracts::validation;
use vigil_infra_db::repositories::{EventFilters, EventRepository};

use crate::errors::ApiError;
use crate::state::AppState;

pub struct EventLifecycleHandler;

impl EventLifecycleHandler {
    /**
     * Endpoint: POST /api/v1/events
     *
     * Alta en detección de movimiento: estado 'processing', sub-estado
     * MP4 'pending', artefactos ausentes, banderas en cero.
     */
    #[instrument(skip(application_state, request_payload), fields(camera = %request_payload.camera_id))]
    pub async fn handle_create(
        State(application_state): State<AppState>,
        Json(request_payload): Json<CreateEventRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let canonical_timestamp = request_payload.validate()?;

        let event_repository = EventRepository::new(application_state.database_client.clone());
        let record = event_repository
            .create_event(
                &request_payload.camera_id,
                &canonical_timestamp,
                request_payload.motion_score,
                request_payload.confidence_score,
            )
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(CreateEventResponse {
                event_id: record.id,
                status: record.status,
                mp4_conversion_status: record.mp4_conversion_status,
                created_at: record.created_at,
            }),
        ))
    }

    /// Endpoint: GET /api/v1/events — paginado, más reciente primero.
    pub async fn handle_list(
        State(application_state): State<AppState>,
        Query(list_query): Query<EventListQuery>,
    ) -> Result<impl IntoResponse, ApiError> {
        let filters = list_query.validate()?;

        let event_repository = EventRepository::new(application_state.database_client.clone());
        let (records, total_count) = event_repository
            .list_events(&EventFilters {
                camera_id: filters.camera_id,
                start: filters.start,
                end: filters.end,
                status: filters.status,
                mp4_status: filters.mp4_status,
                ai_processed: filters.ai_processed,
                limit: filters.limit,
                offset: filters.offset,
            })
            .await?;

        Ok(Json(EventPageResponse {
            events: records.into_iter().map(EventResponse::from).collect(),
            total_count,
            limit: filters.limit,
            offset: filters.offset,
        }))
    }

    /// Endpoint: GET /api/v1/events/{event_id}
    #[instrument(skip(application_state))]
    pub async fn handle_get(
        State(application_state): State<AppState>,
        Path(event_id): Path<i64>,
    ) -> Result<impl IntoResponse, ApiError> {
        let event_repository = EventRepository::new(application_state.database_client.clone());
        let record = event_repository.get_event(event_id).await?;
        Ok(Json(EventResponse::from(record)))
    }

    /**
     * Endpoint: GET /api/v1/events/{event_id}/neighbors
     *
     * Vecinos por orden de ID (coincide con el orden de creación);
     * llegadas fuera de orden producen navegación fuera de orden.
     */
    #[instrument(skip(application_state, neighbor_query))]
    pub async fn handle_neighbors(
        State(application_state): State<AppState>,
        Path(event_id): Path<i64>,
        Query(neighbor_query): Query<NeighborQuery>,
    ) -> Result<impl IntoResponse, ApiError> {
        if let Some(camera_id) = &neighbor_query.camera_id {
            validation::validate_camera_identifier("camera_id", camera_id)?;
        }

        let event_repository = EventRepository::new(application_state.database_client.clone());
        let (previous_id, next_id) = event_repository
            .neighbor_ids(event_id, neighbor_query.camera_id.as_deref())
            .await?;

        Ok(Json(NeighborResponse { previous_id, next_id }))
    }

    /**
     * Endpoint: POST /api/v1/events/{event_id}/files
     *
     * Sella la ruta del artefacto y voltea su bandera de transferencia.
     * Para 'video_h264' el sub-estado MP4 queda al menos en 'pending',
     * donde el worker de conversión lo recogerá.
     */
    #[instrument(skip(application_state, request_payload), fields(artifact = %request_payload.artifact))]
    pub async fn handle_file_status(
        State(application_state): State<AppState>,
        Path(event_id): Path<i64>,
        Json(request_payload): Json<UpdateFileStatusRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let artifact_kind = request_payload.validate()?;

        let event_repository = EventRepository::new(application_state.database_client.clone());
        let (record, changed) = event_repository
            .update_file_status(
                event_id,
                artifact_kind,
                &request_payload.path,
                request_payload.duration_seconds,
            )
            .await?;

        if changed {
            info!(
                "📦 [TRANSFER]: Event {} artifact {} sealed at [{}].",
                event_id,
                artifact_kind.as_str(),
                request_payload.path
            );
        }

        Ok(Json(UpdateFileStatusResponse {
            event_id: record.id,
            artifact: artifact_kind,
            path: request_payload.path,
            changed,
        }))
    }

    /**
     * Endpoint: POST /api/v1/events/{event_id}/status
     *
     * Transición terminal de la cámara; 409 si el evento ya selló un
     * estado terminal, 400 si el objetivo no es terminal.
     */
    #[instrument(skip(application_state, request_payload))]
    pub async fn handle_status(
        State(application_state): State<AppState>,
        Path(event_id): Path<i64>,
        Json(request_payload): Json<UpdateEventStatusRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let target_status = request_payload.validate()?;

        let event_repository = EventRepository::new(application_state.database_client.clone());
        let record = event_repository.update_event_status(event_id, target_status).await?;
        Ok(Json(EventResponse::from(record)))
    }
}
