// [libs/domain/models/src/event.rs]
/*!
 * =================================================================
 * APARATO: EVENT DOMAIN MODELS (V9.3 - STATE MACHINE MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: ENTIDAD DE EVENTO Y MÁQUINAS DE ESTADO DEL PIPELINE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ORTHOGONAL COLUMNS: El estado del evento (cámara) y el sub-estado
 *    MP4 (workers) co-evolucionan sin acoplarse; el latch de IA es una
 *    tercera dimensión independiente.
 * 2. FORWARD-ONLY DAG: Las transiciones legales están codificadas en
 *    tipos; el Store las refuerza con updates condicionales.
 * 3. NOMINAL PRECISION: Nomenclatura nominal absoluta en todos los campos.
 *
 * # Mathematical Proof (Terminal Absorption):
 * Sea S = {processing, complete, interrupted, failed}. Los estados
 * terminales son absorbentes: ninguna arista sale de ellos, por lo que
 * cualquier secuencia de transiciones legales converge y jamás revierte.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Estado de procesamiento del evento (gobernado por la cámara).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Processing,
    Complete,
    Interrupted,
    Failed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Processing => "processing",
            EventStatus::Complete => "complete",
            EventStatus::Interrupted => "interrupted",
            EventStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "processing" => Some(EventStatus::Processing),
            "complete" => Some(EventStatus::Complete),
            "interrupted" => Some(EventStatus::Interrupted),
            "failed" => Some(EventStatus::Failed),
            _ => None,
        }
    }

    /// Un estado terminal es absorbente: ninguna transición sale de él.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventStatus::Processing)
    }

    /// Certifica la legalidad de una transición solicitada por la cámara.
    pub fn can_transition_to(&self, target: EventStatus) -> bool {
        matches!(self, EventStatus::Processing) && target.is_terminal()
    }
}

/// Sub-estado del ciclo de vida MP4 (gobernado por los workers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mp4Status {
    Pending,
    Processing,
    Complete,
    Optimized,
    Failed,
}

impl Mp4Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mp4Status::Pending => "pending",
            Mp4Status::Processing => "processing",
            Mp4Status::Complete => "complete",
            Mp4Status::Optimized => "optimized",
            Mp4Status::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Mp4Status::Pending),
            "processing" => Some(Mp4Status::Processing),
            "complete" => Some(Mp4Status::Complete),
            "optimized" => Some(Mp4Status::Optimized),
            "failed" => Some(Mp4Status::Failed),
            _ => None,
        }
    }

    /// Aristas legales del DAG: pending→processing→complete→optimized,
    /// con pending/processing/complete autorizados a alcanzar failed.
    pub fn can_transition_to(&self, target: Mp4Status) -> bool {
        matches!(
            (self, target),
            (Mp4Status::Pending, Mp4Status::Processing)
                | (Mp4Status::Processing, Mp4Status::Complete)
                | (Mp4Status::Complete, Mp4Status::Optimized)
                | (Mp4Status::Pending, Mp4Status::Failed)
                | (Mp4Status::Processing, Mp4Status::Failed)
                | (Mp4Status::Complete, Mp4Status::Failed)
        )
    }
}

/// Artefactos producidos por un incidente de movimiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ImageA,
    ImageB,
    Thumbnail,
    VideoH264,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::ImageA => "image_a",
            ArtifactKind::ImageB => "image_b",
            ArtifactKind::Thumbnail => "thumbnail",
            ArtifactKind::VideoH264 => "video_h264",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "image_a" => Some(ArtifactKind::ImageA),
            "image_b" => Some(ArtifactKind::ImageB),
            "thumbnail" => Some(ArtifactKind::Thumbnail),
            "video_h264" => Some(ArtifactKind::VideoH264),
            _ => None,
        }
    }
}

/// Anotaciones producidas por el worker de análisis (escritura atómica única).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiAnnotations {
    pub person_detected: Option<bool>,
    /// Confianza del modelo de visión, convención fraccional `[0, 1]`.
    pub confidence: Option<f64>,
    /// Payload estructurado de objetos (JSON serializado).
    pub objects: Option<String>,
    pub description: Option<String>,
    /// Frase corta (≤ 500 caracteres).
    pub phrase: Option<String>,
    pub error: Option<String>,
}

/// Registro de persistencia de un evento (propiedad del Store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub camera_id: String,
    pub event_timestamp: String,
    pub motion_score: f64,
    /// Puntuación normalizada a nivel de evento, convención porcentual `[0, 100]`.
    pub confidence_score: Option<f64>,
    pub status: EventStatus,

    // --- ARTEFACTOS (rutas relativas a la raíz de almacenamiento) ---
    pub image_a_path: Option<String>,
    pub image_b_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub video_h264_path: Option<String>,
    pub video_mp4_path: Option<String>,
    pub video_duration_seconds: Option<f64>,

    // --- BANDERAS DE TRANSFERENCIA ---
    pub image_a_transferred: bool,
    pub image_b_transferred: bool,
    pub thumbnail_transferred: bool,
    pub video_transferred: bool,

    // --- CICLO DE VIDA MP4 (workers de conversión/optimización) ---
    pub mp4_conversion_status: Mp4Status,
    pub mp4_converted_at: Option<String>,
    pub mp4_claimed_by: Option<String>,
    pub mp4_claimed_at: Option<String>,

    // --- CICLO DE VIDA DE IA (latch único) ---
    pub ai_processed: bool,
    pub ai_processed_at: Option<String>,
    pub ai_person_detected: Option<bool>,
    pub ai_confidence: Option<f64>,
    pub ai_objects: Option<String>,
    pub ai_description: Option<String>,
    pub ai_phrase: Option<String>,
    pub ai_error: Option<String>,
    pub ai_claimed_by: Option<String>,
    pub ai_claimed_at: Option<String>,

    pub created_at: String,
}

impl EventRecord {
    /// Ruta y bandera de transferencia del artefacto solicitado.
    pub fn artifact_slot(&self, kind: ArtifactKind) -> (Option<&str>, bool) {
        match kind {
            ArtifactKind::ImageA => (self.image_a_path.as_deref(), self.image_a_transferred),
            ArtifactKind::ImageB => (self.image_b_path.as_deref(), self.image_b_transferred),
            ArtifactKind::Thumbnail => (self.thumbnail_path.as_deref(), self.thumbnail_transferred),
            ArtifactKind::VideoH264 => (self.video_h264_path.as_deref(), self.video_transferred),
        }
    }
}
