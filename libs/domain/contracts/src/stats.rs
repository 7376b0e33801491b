// [libs/domain/contracts/src/stats.rs]
/*!
 * =================================================================
 * APARATO: STATISTICS TRANSPORT SHAPES (V2.0 - READ-ONLY COUNTERS)
 * CLASIFICACIÓN: DOMAIN CONTRACTS (ESTRATO L2)
 * RESPONSABILIDAD: AGREGADOS DE SOLO LECTURA PARA EL VISOR
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totales globales del despliegue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewStatsResponse {
    pub total_cameras: u64,
    pub total_events: u64,
    pub events_by_status: BTreeMap<String, u64>,
    pub events_by_mp4_status: BTreeMap<String, u64>,
    pub ai_processed_count: u64,
    pub total_log_lines: u64,
}

/// Desglose de una cámara individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraStatsEntry {
    pub camera_id: String,
    pub total_events: u64,
    pub events_by_status: BTreeMap<String, u64>,
}

/// Página de desgloses por cámara, ordenada por identificador estable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraStatsResponse {
    pub cameras: Vec<CameraStatsEntry>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Conteo de eventos de un día UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatsEntry {
    /// Día UTC en formato `YYYY-MM-DD`.
    pub day: String,
    pub event_count: u64,
}

/// Serie diaria, día más reciente primero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatsResponse {
    pub days: Vec<DailyStatsEntry>,
}

/// Parámetros de la serie diaria.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyStatsQuery {
    /// Días hacia atrás desde hoy; tope duro de 90.
    pub days: Option<u32>,
}

/// Parámetros de paginación del desglose por cámara.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CameraStatsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
