// [libs/domain/contracts/src/event.rs]
/*!
 * =================================================================
 * APARATO: EVENT TRANSPORT SHAPES (V6.2 - LIFECYCLE CONTRACTS)
 * CLASIFICACIÓN: DOMAIN CONTRACTS (ESTRATO L2)
 * RESPONSABILIDAD: PAYLOADS DEL CICLO DE VIDA DE EVENTOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SPLIT DISCIPLINE: Ningún registro de persistencia cruza el cable;
 *    'EventResponse' es una proyección explícita del EventRecord.
 * 2. PROGRESSIVE TRANSFER: 'UpdateFileStatusRequest' transporta un solo
 *    artefacto por llamada, reflejando la llegada progresiva real.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use vigil_domain_models::event::{ArtifactKind, EventRecord, EventStatus, Mp4Status};

use crate::validation::{self, ValidationError};

/// Alta de un incidente de movimiento.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub camera_id: String,
    /// Marca de pared del incidente, RFC 3339.
    pub timestamp: String,
    pub motion_score: f64,
    /// Puntuación normalizada opcional, convención porcentual `[0, 100]`.
    pub confidence_score: Option<f64>,
}

impl CreateEventRequest {
    /// Valida y devuelve la marca temporal canonizada.
    pub fn validate(&self) -> Result<String, ValidationError> {
        validation::validate_camera_identifier("camera_id", &self.camera_id)?;
        validation::validate_motion_score("motion_score", self.motion_score)?;
        if let Some(confidence) = self.confidence_score {
            validation::validate_confidence_score("confidence_score", confidence)?;
        }
        validation::validate_timestamp("timestamp", &self.timestamp)
    }
}

/// Acuse de alta con los sellos asignados por el Store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub event_id: i64,
    pub status: EventStatus,
    pub mp4_conversion_status: Mp4Status,
    pub created_at: String,
}

/// Actualización progresiva de transferencia de un artefacto.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFileStatusRequest {
    /// Discriminador: `image_a | image_b | thumbnail | video_h264`.
    pub artifact: String,
    /// Ruta relativa a la raíz de almacenamiento.
    pub path: String,
    /// Duración en segundos; sólo significativa para `video_h264`.
    pub duration_seconds: Option<f64>,
}

impl UpdateFileStatusRequest {
    pub fn validate(&self) -> Result<ArtifactKind, ValidationError> {
        let kind = validation::parse_artifact_kind("artifact", &self.artifact)?;
        validation::validate_relative_path("path", &self.path)?;
        if let Some(duration) = self.duration_seconds {
            if kind != ArtifactKind::VideoH264 {
                return Err(ValidationError::new(
                    "duration_seconds",
                    "only meaningful for the video_h264 artifact",
                ));
            }
            validation::validate_duration_seconds("duration_seconds", duration)?;
        }
        Ok(kind)
    }
}

/// Acuse idempotente de una actualización de ficheros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFileStatusResponse {
    pub event_id: i64,
    pub artifact: ArtifactKind,
    pub path: String,
    /// `false` cuando la petición repitió una ruta ya sellada (no-op).
    pub changed: bool,
}

/// Transición terminal solicitada por la cámara.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventStatusRequest {
    /// Objetivo: `complete | interrupted | failed`.
    pub status: String,
}

impl UpdateEventStatusRequest {
    pub fn validate(&self) -> Result<EventStatus, ValidationError> {
        validation::parse_terminal_event_status("status", &self.status)
    }
}

/// Proyección completa de un evento hacia el visor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: i64,
    pub camera_id: String,
    pub event_timestamp: String,
    pub motion_score: f64,
    pub confidence_score: Option<f64>,
    pub status: EventStatus,

    pub image_a_path: Option<String>,
    pub image_b_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub video_h264_path: Option<String>,
    pub video_mp4_path: Option<String>,
    pub video_duration_seconds: Option<f64>,

    pub image_a_transferred: bool,
    pub image_b_transferred: bool,
    pub thumbnail_transferred: bool,
    pub video_transferred: bool,

    pub mp4_conversion_status: Mp4Status,
    pub mp4_converted_at: Option<String>,

    pub ai_processed: bool,
    pub ai_processed_at: Option<String>,
    pub ai_person_detected: Option<bool>,
    pub ai_confidence: Option<f64>,
    pub ai_objects: Option<String>,
    pub ai_description: Option<String>,
    pub ai_phrase: Option<String>,
    pub ai_error: Option<String>,

    pub created_at: String,
}

impl From<EventRecord> for EventResponse {
    fn from(record: EventRecord) -> Self {
        Self {
            id: record.id,
            camera_id: record.camera_id,
            event_timestamp: record.event_timestamp,
            motion_score: record.motion_score,
            confidence_score: record.confidence_score,
            status: record.status,
            image_a_path: record.image_a_path,
            image_b_path: record.image_b_path,
            thumbnail_path: record.thumbnail_path,
            video_h264_path: record.video_h264_path,
            video_mp4_path: record.video_mp4_path,
            video_duration_seconds: record.video_duration_seconds,
            image_a_transferred: record.image_a_transferred,
            image_b_transferred: record.image_b_transferred,
            thumbnail_transferred: record.thumbnail_transferred,
            video_transferred: record.video_transferred,
            mp4_conversion_status: record.mp4_conversion_status,
            mp4_converted_at: record.mp4_converted_at,
            ai_processed: record.ai_processed,
            ai_processed_at: record.ai_processed_at,
            ai_person_detected: record.ai_person_detected,
            ai_confidence: record.ai_confidence,
            ai_objects: record.ai_objects,
            ai_description: record.ai_description,
            ai_phrase: record.ai_phrase,
            ai_error: record.ai_error,
            created_at: record.created_at,
        }
    }
}

/// Filtros de listado de eventos (query string).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    pub camera_id: Option<String>,
    /// Inicio inclusivo del rango temporal, RFC 3339.
    pub start: Option<String>,
    /// Fin inclusivo del rango temporal, RFC 3339.
    pub end: Option<String>,
    pub status: Option<String>,
    pub mp4_status: Option<String>,
    pub ai_processed: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Filtros ya validados y canonizados, listos para el Store.
#[derive(Debug, Clone, Default)]
pub struct EventListFilters {
    pub camera_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub status: Option<EventStatus>,
    pub mp4_status: Option<Mp4Status>,
    pub ai_processed: Option<bool>,
    pub limit: u32,
    pub offset: u32,
}

impl EventListQuery {
    pub fn validate(&self) -> Result<EventListFilters, ValidationError> {
        if let Some(camera_id) = &self.camera_id {
            validation::validate_camera_identifier("camera_id", camera_id)?;
        }
        let start = self.start.as_deref()
            .map(|raw| validation::validate_timestamp("start", raw))
            .transpose()?;
        let end = self.end.as_deref()
            .map(|raw| validation::validate_range_end("end", raw))
            .transpose()?;
        let status = self.status.as_deref()
            .map(|raw| validation::parse_event_status("status", raw))
            .transpose()?;
        let mp4_status = self.mp4_status.as_deref()
            .map(|raw| validation::parse_mp4_status("mp4_status", raw))
            .transpose()?;

        Ok(EventListFilters {
            camera_id: self.camera_id.clone(),
            start,
            end,
            status,
            mp4_status,
            ai_processed: self.ai_processed,
            limit: validation::effective_page_limit(self.limit),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Página de eventos, más reciente primero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPageResponse {
    pub events: Vec<EventResponse>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Filtro opcional de navegación entre vecinos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NeighborQuery {
    pub camera_id: Option<String>,
}

/// Identificadores adyacentes por orden de ID (navegación del visor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborResponse {
    pub previous_id: Option<i64>,
    pub next_id: Option<i64>,
}
