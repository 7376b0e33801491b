// [libs/domain/models/src/camera.rs]
/*!
 * =================================================================
 * APARATO: CAMERA DOMAIN MODELS (V4.2 - REGISTRY MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: ENTIDAD DE CÁMARA Y SU ESTADO CONSULTIVO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL IDENTITY: Clave sustituta entera + identificador estable humano
 *    ('camera_1'); los eventos referencian el identificador estable.
 * 2. ADVISORY STATUS: El estado de red es puramente consultivo; ninguna
 *    transición del pipeline depende de él.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Estado de red consultivo de un punto de ingesta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
    Error,
}

impl CameraStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraStatus::Online => "online",
            CameraStatus::Offline => "offline",
            CameraStatus::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "online" => Some(CameraStatus::Online),
            "offline" => Some(CameraStatus::Offline),
            "error" => Some(CameraStatus::Error),
            _ => None,
        }
    }
}

/// Registro de persistencia de una cámara (propiedad del Store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecord {
    /// Clave sustituta asignada por el Store.
    pub id: i64,
    /// Identificador estable elegido por el operador (`[A-Za-z0-9_]+`).
    pub camera_id: String,
    pub display_name: String,
    pub location: Option<String>,
    pub network_address: Option<String>,
    pub status: CameraStatus,
    pub created_at: String,
    pub updated_at: String,
    pub last_heartbeat_at: Option<String>,
}
