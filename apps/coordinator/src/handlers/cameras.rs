// [apps/coordinator/src/handlers/cameras.rs]
/*!
 * =================================================================
 * APARATO: CAMERA DIRECTORY HANDLER (V5.0 - REGISTRY GATEWAY)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ALTA IDEMPOTENTE, DIRECTORIO Y LATIDOS DE CÁMARAS
 *
 * # Logic:
 * Toda petición atraviesa la capa de validación pura antes de tocar el
 * Store; el registro es un upsert last-write-wins por identificador
 * estable y el borrado arrastra los eventos por cascade.
 * =================================================================
 */

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use vigil_domain_contracts::camera::{
    CameraListResponse, CameraResponse, HeartbeatRequest, RegisterCameraRequest,
};
use vigil_domain_contracts::validation;
use vigil_infra_db::repositories::CameraRepository;

use crate::errors::ApiError;
use crate::state::AppState;

pub struct CameraDirectoryHandler;

impl CameraDirectoryHandler {
    /**
     * Endpoint: POST /api/v1/cameras
     *
     * Upsert por identificador estable: en colisión se actualizan los
     * campos mutables y se devuelve el mismo registro canónico.
     */
    #[instrument(skip(application_state, request_payload), fields(camera = %request_payload.camera_id))]
    pub async fn handle_register(
        State(application_state): State<AppState>,
        Json(request_payload): Json<RegisterCameraRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        request_payload.validate()?;

        let camera_repository = CameraRepository::new(application_state.database_client.clone());
        let record = camera_repository
            .register(
                &request_payload.camera_id,
                &request_payload.display_name,
                request_payload.location.as_deref(),
                request_payload.network_address.as_deref(),
            )
            .await?;

        Ok((StatusCode::OK, Json(CameraResponse::from(record))))
    }

    /// Endpoint: GET /api/v1/cameras — directorio completo por identificador.
    pub async fn handle_list(
        State(application_state): State<AppState>,
    ) -> Result<impl IntoResponse, ApiError> {
        let camera_repository = CameraRepository::new(application_state.database_client.clone());
        let cameras: Vec<CameraResponse> = camera_repository
            .list()
            .await?
            .into_iter()
            .map(CameraResponse::from)
            .collect();

        let total_count = cameras.len() as u64;
        Ok(Json(CameraListResponse { cameras, total_count }))
    }

    /// Endpoint: GET /api/v1/cameras/{camera_id}
    #[instrument(skip(application_state))]
    pub async fn handle_get(
        State(application_state): State<AppState>,
        Path(camera_id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        validation::validate_camera_identifier("camera_id", &camera_id)?;

        let camera_repository = CameraRepository::new(application_state.database_client.clone());
        let record = camera_repository.get(&camera_id).await?;
        Ok(Json(CameraResponse::from(record)))
    }

    /**
     * Endpoint: POST /api/v1/cameras/{camera_id}/heartbeat
     *
     * Latido consultivo: sella el estado de red reportado y la marca de
     * último contacto. Ninguna transición del pipeline depende de él.
     */
    #[instrument(skip(application_state, request_payload))]
    pub async fn handle_heartbeat(
        State(application_state): State<AppState>,
        Path(camera_id): Path<String>,
        Json(request_payload): Json<HeartbeatRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        validation::validate_camera_identifier("camera_id", &camera_id)?;
        let reported_status = request_payload.validated_status()?;

        let camera_repository = CameraRepository::new(application_state.database_client.clone());
        let record = camera_repository.heartbeat(&camera_id, reported_status).await?;
        Ok(Json(CameraResponse::from(record)))
    }

    /// Endpoint: DELETE /api/v1/cameras/{camera_id} — baja con cascade de eventos.
    #[instrument(skip(application_state))]
    pub async fn handle_delete(
        State(application_state): State<AppState>,
        Path(camera_id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        validation::validate_camera_identifier("camera_id", &camera_id)?;

        let camera_repository = CameraRepository::new(application_state.database_client.clone());
        camera_repository.delete(&camera_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
