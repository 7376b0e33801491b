// [libs/domain/contracts/src/camera.rs]
/*!
 * =================================================================
 * APARATO: CAMERA TRANSPORT SHAPES (V3.1 - REGISTRY CONTRACTS)
 * CLASIFICACIÓN: DOMAIN CONTRACTS (ESTRATO L2)
 * RESPONSABILIDAD: PAYLOADS DEL DIRECTORIO DE CÁMARAS
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use vigil_domain_models::camera::{CameraRecord, CameraStatus};

use crate::validation::{self, ValidationError};

/// Petición de registro idempotente (upsert por identificador estable).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCameraRequest {
    pub camera_id: String,
    pub display_name: String,
    pub location: Option<String>,
    pub network_address: Option<String>,
}

impl RegisterCameraRequest {
    /// Validación pura previa a cualquier acceso al Store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_camera_identifier("camera_id", &self.camera_id)?;
        validation::validate_display_name("display_name", &self.display_name)?;
        Ok(())
    }
}

/// Latido consultivo de una cámara registrada.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatRequest {
    /// Estado de red reportado; ausente equivale a `online`.
    pub status: Option<String>,
}

impl HeartbeatRequest {
    pub fn validated_status(&self) -> Result<CameraStatus, ValidationError> {
        match self.status.as_deref() {
            None => Ok(CameraStatus::Online),
            Some(raw) => CameraStatus::parse(raw)
                .ok_or_else(|| ValidationError::new("status", "must be one of online, offline, error")),
        }
    }
}

/// Forma canónica de cámara devuelta por todos los endpoints del directorio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraResponse {
    pub id: i64,
    pub camera_id: String,
    pub display_name: String,
    pub location: Option<String>,
    pub network_address: Option<String>,
    pub status: CameraStatus,
    pub created_at: String,
    pub updated_at: String,
    pub last_heartbeat_at: Option<String>,
}

impl From<CameraRecord> for CameraResponse {
    fn from(record: CameraRecord) -> Self {
        Self {
            id: record.id,
            camera_id: record.camera_id,
            display_name: record.display_name,
            location: record.location,
            network_address: record.network_address,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            last_heartbeat_at: record.last_heartbeat_at,
        }
    }
}

/// Listado completo del directorio, ordenado por identificador estable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraListResponse {
    pub cameras: Vec<CameraResponse>,
    pub total_count: u64,
}
