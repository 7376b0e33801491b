// [libs/infra/db/src/repositories/event/queries.rs]
/*!
 * =================================================================
 * APARATO: EVENT SQL REGISTRY (V6.3 - CONDITIONAL CLAIM MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO NOMINAL DE CONSULTAS DEL CICLO DE EVENTOS
 *
 * # Mathematical Proof (Single Claim):
 * Todo claim es un UPDATE condicional único: el predicado de elegibilidad
 * se re-evalúa en la cláusula WHERE exterior dentro de la misma sentencia,
 * por lo que dos workers concurrentes jamás obtienen la misma fila; el
 * perdedor simplemente afecta cero filas. Los commits re-afirman el
 * claimant, de modo que un claim robado colapsa en 'ClaimLost' y no en
 * una doble escritura.
 * =================================================================
 */

/// Proyección canónica de la fila de evento; el orden es contrato del mapper.
pub const EVENT_COLUMNS: &str = "\
id, camera_id, event_timestamp, motion_score, confidence_score, status, \
image_a_path, image_b_path, thumbnail_path, video_h264_path, video_mp4_path, \
video_duration_seconds, image_a_transferred, image_b_transferred, \
thumbnail_transferred, video_transferred, mp4_conversion_status, \
mp4_converted_at, mp4_claimed_by, mp4_claimed_at, ai_processed, \
ai_processed_at, ai_person_detected, ai_confidence, ai_objects, \
ai_description, ai_phrase, ai_error, ai_claimed_by, ai_claimed_at, created_at";

pub const INSERT_EVENT: &str = "\
INSERT INTO events (camera_id, event_timestamp, motion_score, confidence_score, created_at) \
VALUES (?1, ?2, ?3, ?4, ?5) \
RETURNING ";

pub const SELECT_EVENT_BY_ID: &str = "SELECT {COLUMNS} FROM events WHERE id = ?1";

/// Filtros nulos = sin filtro; el orden es más-reciente-primero con ID como desempate.
pub const LIST_EVENTS: &str = "\
SELECT {COLUMNS} FROM events \
WHERE (?1 IS NULL OR camera_id = ?1) \
  AND (?2 IS NULL OR event_timestamp >= ?2) \
  AND (?3 IS NULL OR event_timestamp <= ?3) \
  AND (?4 IS NULL OR status = ?4) \
  AND (?5 IS NULL OR mp4_conversion_status = ?5) \
  AND (?6 IS NULL OR ai_processed = ?6) \
ORDER BY event_timestamp DESC, id DESC \
LIMIT ?7 OFFSET ?8";

pub const COUNT_EVENTS: &str = "\
SELECT COUNT(*) FROM events \
WHERE (?1 IS NULL OR camera_id = ?1) \
  AND (?2 IS NULL OR event_timestamp >= ?2) \
  AND (?3 IS NULL OR event_timestamp <= ?3) \
  AND (?4 IS NULL OR status = ?4) \
  AND (?5 IS NULL OR mp4_conversion_status = ?5) \
  AND (?6 IS NULL OR ai_processed = ?6)";

pub const NEIGHBOR_PREVIOUS: &str = "\
SELECT MAX(id) FROM events WHERE id < ?1 AND (?2 IS NULL OR camera_id = ?2)";

pub const NEIGHBOR_NEXT: &str = "\
SELECT MIN(id) FROM events WHERE id > ?1 AND (?2 IS NULL OR camera_id = ?2)";

/// Transición terminal de cámara; sólo legal desde 'processing'.
pub const COMMIT_TERMINAL_STATUS: &str = "\
UPDATE events SET status = ?2 WHERE id = ?1 AND status = 'processing'";

// --- PRIMITIVO DE CLAIM: CONVERSIÓN ---

pub const CLAIM_FOR_CONVERSION: &str = "\
UPDATE events SET mp4_conversion_status = 'processing', mp4_claimed_by = ?1, mp4_claimed_at = ?2 \
WHERE id IN ( \
    SELECT id FROM events \
    WHERE (mp4_conversion_status = 'pending' AND video_transferred = 1 AND video_h264_path IS NOT NULL) \
       OR (mp4_conversion_status = 'processing' AND mp4_claimed_at IS NOT NULL AND mp4_claimed_at < ?3) \
    ORDER BY id \
    LIMIT ?4 \
) \
AND ( \
    (mp4_conversion_status = 'pending' AND video_transferred = 1 AND video_h264_path IS NOT NULL) \
    OR (mp4_conversion_status = 'processing' AND mp4_claimed_at IS NOT NULL AND mp4_claimed_at < ?3) \
) \
RETURNING ";

pub const RELEASE_CONVERSION_CLAIM: &str = "\
UPDATE events SET mp4_conversion_status = 'pending', mp4_claimed_by = NULL, mp4_claimed_at = NULL \
WHERE id = ?1 AND mp4_claimed_by = ?2 AND mp4_conversion_status = 'processing'";

pub const COMMIT_CONVERSION: &str = "\
UPDATE events SET mp4_conversion_status = 'complete', video_mp4_path = ?3, \
video_duration_seconds = ?4, mp4_converted_at = ?5, mp4_claimed_by = NULL, mp4_claimed_at = NULL \
WHERE id = ?1 AND mp4_claimed_by = ?2 AND mp4_conversion_status = 'processing'";

pub const FAIL_CONVERSION: &str = "\
UPDATE events SET mp4_conversion_status = 'failed', mp4_claimed_by = NULL, mp4_claimed_at = NULL \
WHERE id = ?1 AND mp4_claimed_by = ?2 AND mp4_conversion_status = 'processing'";

// --- PRIMITIVO DE CLAIM: OPTIMIZACIÓN ---
// El sub-estado permanece 'complete' durante el trabajo; la propiedad se
// sostiene exclusivamente por las columnas de claim.

pub const CLAIM_FOR_OPTIMIZATION: &str = "\
UPDATE events SET mp4_claimed_by = ?1, mp4_claimed_at = ?2 \
WHERE id IN ( \
    SELECT id FROM events \
    WHERE mp4_conversion_status = 'complete' AND video_mp4_path IS NOT NULL \
      AND (mp4_claimed_at IS NULL OR mp4_claimed_at < ?3) \
    ORDER BY id \
    LIMIT ?4 \
) \
AND mp4_conversion_status = 'complete' \
AND (mp4_claimed_at IS NULL OR mp4_claimed_at < ?3) \
RETURNING ";

pub const RELEASE_OPTIMIZATION_CLAIM: &str = "\
UPDATE events SET mp4_claimed_by = NULL, mp4_claimed_at = NULL \
WHERE id = ?1 AND mp4_claimed_by = ?2 AND mp4_conversion_status = 'complete'";

pub const COMMIT_OPTIMIZATION: &str = "\
UPDATE events SET mp4_conversion_status = 'optimized', video_mp4_path = ?3, \
mp4_claimed_by = NULL, mp4_claimed_at = NULL \
WHERE id = ?1 AND mp4_claimed_by = ?2 AND mp4_conversion_status = 'complete'";

pub const FAIL_OPTIMIZATION: &str = "\
UPDATE events SET mp4_conversion_status = 'failed', mp4_claimed_by = NULL, mp4_claimed_at = NULL \
WHERE id = ?1 AND mp4_claimed_by = ?2 AND mp4_conversion_status = 'complete'";

// --- PRIMITIVO DE CLAIM: ANÁLISIS DE IA (LATCH ÚNICO) ---

pub const CLAIM_FOR_ANALYSIS: &str = "\
UPDATE events SET ai_claimed_by = ?1, ai_claimed_at = ?2 \
WHERE id IN ( \
    SELECT id FROM events \
    WHERE ai_processed = 0 AND image_a_transferred = 1 AND image_b_transferred = 1 \
      AND (ai_claimed_at IS NULL OR ai_claimed_at < ?3) \
    ORDER BY id \
    LIMIT ?4 \
) \
AND ai_processed = 0 \
AND (ai_claimed_at IS NULL OR ai_claimed_at < ?3) \
RETURNING ";

pub const RELEASE_ANALYSIS_CLAIM: &str = "\
UPDATE events SET ai_claimed_by = NULL, ai_claimed_at = NULL \
WHERE id = ?1 AND ai_claimed_by = ?2 AND ai_processed = 0";

/// Escritura atómica de todas las anotaciones + latch en una sentencia.
pub const COMMIT_ANALYSIS: &str = "\
UPDATE events SET ai_processed = 1, ai_processed_at = ?3, ai_person_detected = ?4, \
ai_confidence = ?5, ai_objects = ?6, ai_description = ?7, ai_phrase = ?8, ai_error = ?9, \
ai_claimed_by = NULL, ai_claimed_at = NULL \
WHERE id = ?1 AND ai_claimed_by = ?2 AND ai_processed = 0";
