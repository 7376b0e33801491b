// [libs/domain/contracts/src/validation.rs]
/*!
 * =================================================================
 * APARATO: PURE VALIDATION LAYER (V7.1 - ZERO SIDE EFFECTS)
 * CLASIFICACIÓN: DOMAIN CONTRACTS (ESTRATO L2)
 * RESPONSABILIDAD: RECHAZO TEMPRANO DE PAYLOADS MALFORMADOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FIELD TRIAGE: Cada rechazo nombra el campo ofensor y la razón
 *    exacta para diagnóstico inmediato en el agente de cámara.
 * 2. PATH SHIELD: Toda ruta persistida es relativa; se veta el prefijo
 *    absoluto, los componentes '..' y los separadores invertidos.
 * 3. PURITY: Ninguna función de este aparato realiza I/O ni muta estado.
 * =================================================================
 */

use thiserror::Error;
use vigil_domain_models::event::{ArtifactKind, EventStatus, Mp4Status};
use vigil_domain_models::log::{LogLevel, CENTRAL_SOURCE};
use vigil_domain_models::time;

/// Tope duro de cualquier página devuelta por el API.
pub const MAX_PAGE_LIMIT: u32 = 500;
/// Límite por defecto cuando el llamador no especifica uno.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;
/// Longitud máxima de la frase corta de IA.
pub const MAX_AI_PHRASE_CHARS: usize = 500;

const MAX_IDENTIFIER_CHARS: usize = 64;
const MAX_DISPLAY_NAME_CHARS: usize = 128;
const MAX_PATH_CHARS: usize = 512;
const MAX_MESSAGE_CHARS: usize = 8192;

/// Rechazo de validación: campo ofensor + razón legible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[L2_VALIDATION_FAULT]: {field} -> {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self { field: field.to_string(), reason: reason.into() }
    }
}

/// Certifica un identificador estable de cámara (`[A-Za-z0-9_]+`).
pub fn validate_camera_identifier(field: &str, raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if raw.len() > MAX_IDENTIFIER_CHARS {
        return Err(ValidationError::new(field, format!("must not exceed {MAX_IDENTIFIER_CHARS} characters")));
    }
    if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new(field, "must match [A-Za-z0-9_]+"));
    }
    Ok(())
}

/// Certifica una fuente de log: patrón de cámara o el literal reservado `central`.
pub fn validate_log_source(field: &str, raw: &str) -> Result<(), ValidationError> {
    if raw == CENTRAL_SOURCE {
        return Ok(());
    }
    validate_camera_identifier(field, raw)
}

/// Certifica una ruta de artefacto relativa a la raíz de almacenamiento.
pub fn validate_relative_path(field: &str, raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if raw.len() > MAX_PATH_CHARS {
        return Err(ValidationError::new(field, format!("must not exceed {MAX_PATH_CHARS} characters")));
    }
    if raw.starts_with('/') {
        return Err(ValidationError::new(field, "absolute paths are forbidden"));
    }
    if raw.contains('\\') {
        return Err(ValidationError::new(field, "backslash separators are forbidden"));
    }
    if raw.split('/').any(|component| component == "..") {
        return Err(ValidationError::new(field, "'..' components are forbidden"));
    }
    if raw.split('/').any(|component| component.is_empty()) {
        return Err(ValidationError::new(field, "empty path components are forbidden"));
    }
    Ok(())
}

/// Certifica la puntuación de movimiento cruda (float finito, no negativo).
pub fn validate_motion_score(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

/// Certifica la puntuación normalizada a nivel de evento (`[0, 100]`).
pub fn validate_confidence_score(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::new(field, "must lie within [0, 100]"));
    }
    Ok(())
}

/// Certifica la duración de vídeo reportada por la cámara.
pub fn validate_duration_seconds(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, "must be a non-negative finite number"));
    }
    Ok(())
}

/// Parsea y canoniza una marca temporal RFC 3339 de entrada.
pub fn validate_timestamp(field: &str, raw: &str) -> Result<String, ValidationError> {
    time::canonicalize(raw)
        .ok_or_else(|| ValidationError::new(field, "must be a valid RFC 3339 timestamp"))
}

/// Canoniza el fin inclusivo de un rango (granularidad de segundo).
pub fn validate_range_end(field: &str, raw: &str) -> Result<String, ValidationError> {
    time::canonicalize_range_end(raw)
        .ok_or_else(|| ValidationError::new(field, "must be a valid RFC 3339 timestamp"))
}

/// Certifica un nombre de despliegue legible.
pub fn validate_display_name(field: &str, raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if raw.len() > MAX_DISPLAY_NAME_CHARS {
        return Err(ValidationError::new(field, format!("must not exceed {MAX_DISPLAY_NAME_CHARS} characters")));
    }
    Ok(())
}

/// Certifica el cuerpo de una línea de log.
pub fn validate_log_message(field: &str, raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if raw.len() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::new(field, format!("must not exceed {MAX_MESSAGE_CHARS} characters")));
    }
    Ok(())
}

/// Parsea la severidad canónica de una línea de log.
pub fn parse_log_level(field: &str, raw: &str) -> Result<LogLevel, ValidationError> {
    LogLevel::parse(raw)
        .ok_or_else(|| ValidationError::new(field, "must be one of INFO, WARNING, ERROR"))
}

/// Parsea un conjunto de severidades separado por comas (filtros de consulta).
pub fn parse_log_level_set(field: &str, raw: &str) -> Result<Vec<LogLevel>, ValidationError> {
    let mut levels = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        let level = parse_log_level(field, token)?;
        if !levels.contains(&level) {
            levels.push(level);
        }
    }
    if levels.is_empty() {
        return Err(ValidationError::new(field, "must contain at least one level"));
    }
    Ok(levels)
}

/// Parsea el estado terminal solicitado por la cámara.
pub fn parse_terminal_event_status(field: &str, raw: &str) -> Result<EventStatus, ValidationError> {
    let status = EventStatus::parse(raw)
        .ok_or_else(|| ValidationError::new(field, "must be one of complete, interrupted, failed"))?;
    if !status.is_terminal() {
        return Err(ValidationError::new(field, "must be a terminal status"));
    }
    Ok(status)
}

/// Parsea un estado de evento arbitrario (filtros de consulta).
pub fn parse_event_status(field: &str, raw: &str) -> Result<EventStatus, ValidationError> {
    EventStatus::parse(raw)
        .ok_or_else(|| ValidationError::new(field, "must be one of processing, complete, interrupted, failed"))
}

/// Parsea un sub-estado MP4 (filtros de consulta).
pub fn parse_mp4_status(field: &str, raw: &str) -> Result<Mp4Status, ValidationError> {
    Mp4Status::parse(raw)
        .ok_or_else(|| ValidationError::new(field, "must be one of pending, processing, complete, optimized, failed"))
}

/// Parsea el discriminador de artefacto de una actualización de ficheros.
pub fn parse_artifact_kind(field: &str, raw: &str) -> Result<ArtifactKind, ValidationError> {
    ArtifactKind::parse(raw)
        .ok_or_else(|| ValidationError::new(field, "must be one of image_a, image_b, thumbnail, video_h264"))
}

/// Resuelve el límite efectivo de página: default si ausente, tope duro siempre.
pub fn effective_page_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
}
