// [apps/coordinator/src/errors.rs]
/*!
 * =================================================================
 * APARATO: API ERROR SHAPER (V5.3 - TAXONOMY GATEWAY)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CONVERSIÓN DE FALLOS INTERNOS A RESPUESTAS HTTP
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TAXONOMY MAPPING: Validation->400, NotFound->404, Conflict->409,
 *    ConstraintViolation->422, Unavailable->503, Internal->500.
 * 2. CORRELATION SHIELD: Los fallos inesperados viajan con un ID de
 *    correlación opaco; el detalle queda en el rastro del servidor,
 *    jamás en el cable.
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use vigil_domain_contracts::ValidationError;
use vigil_infra_db::DbError;

/// Cuerpo estructurado de todo fallo del API.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Clase de error legible por máquina.
    pub error: &'static str,
    /// Mensaje humano de una línea.
    pub message: String,
    /// Campo ofensor (sólo fallos de validación).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// ID opaco de correlación (sólo fallos internos).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Validation { field: String, reason: String },
    NotFound(String),
    Conflict(String),
    ConstraintViolation(String),
    Unavailable(String),
    Internal { correlation_id: String },
}

impl ApiError {
    /// Fallo interno con rastro forense y correlación opaca.
    pub fn internal(context: impl std::fmt::Display) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        error!("💀 [API_FAULT]: correlation={} detail={}", correlation_id, context);
        ApiError::Internal { correlation_id }
    }
}

impl From<ValidationError> for ApiError {
    fn from(fault: ValidationError) -> Self {
        ApiError::Validation { field: fault.field, reason: fault.reason }
    }
}

impl From<DbError> for ApiError {
    fn from(fault: DbError) -> Self {
        match fault {
            DbError::NotFound => ApiError::NotFound("referenced entity does not exist".into()),
            DbError::Conflict(reason) => ApiError::Conflict(reason),
            DbError::ConstraintViolation(reason) => ApiError::ConstraintViolation(reason),
            DbError::Unavailable(reason) => ApiError::Unavailable(reason),
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "validation",
                    message: format!("{field}: {reason}"),
                    field: Some(field),
                    correlation_id: None,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody { error: "not_found", message, field: None, correlation_id: None },
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorBody { error: "conflict", message, field: None, correlation_id: None },
            ),
            ApiError::ConstraintViolation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody { error: "constraint_violation", message, field: None, correlation_id: None },
            ),
            ApiError::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody { error: "unavailable", message, field: None, correlation_id: None },
            ),
            ApiError::Internal { correlation_id } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "internal",
                    message: "unexpected coordinator failure".into(),
                    field: None,
                    correlation_id: Some(correlation_id),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
