// [libs/domain/models/src/log.rs]
/*!
 * =================================================================
 * APARATO: LOG DOMAIN MODELS (V3.0 - APPEND-ONLY LEDGER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: LÍNEA DE LOG Y SU SEVERIDAD CANÓNICA
 *
 * El identificador entero asignado por el Store es la clave de orden:
 * dentro de una fuente, el orden de IDs coincide con el de inserción.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Fuente reservada para los componentes centrales (no-cámara).
pub const CENTRAL_SOURCE: &str = "central";

/// Severidad canónica de una línea de log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INFO" => Some(LogLevel::Info),
            "WARNING" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Registro de persistencia de una línea de log (propiedad del Store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLineRecord {
    /// Identificador monotónico asignado por el Store.
    pub id: i64,
    /// Identificador estable de cámara o el literal `central`.
    pub source: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}
