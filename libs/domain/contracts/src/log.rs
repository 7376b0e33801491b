// [libs/domain/contracts/src/log.rs]
/*!
 * =================================================================
 * APARATO: LOG TRANSPORT SHAPES (V4.0 - WATERMARK CONTRACTS)
 * CLASIFICACIÓN: DOMAIN CONTRACTS (ESTRATO L2)
 * RESPONSABILIDAD: INGESTA POR LOTES Y CONSULTA ORDENADA DE LOGS
 *
 * # Logic:
 * La ingesta es atómica: una línea inválida rechaza el lote completo,
 * preservando limpia la marca de agua (watermark) del consumidor.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use vigil_domain_models::log::{LogLevel, LogLineRecord};

use crate::validation::{self, ValidationError};

/// Línea individual dentro de un lote de ingesta.
#[derive(Debug, Clone, Deserialize)]
pub struct LogLineInput {
    /// Identificador estable de cámara o el literal `central`.
    pub source: String,
    /// Marca RFC 3339 del emisor.
    pub timestamp: String,
    /// `INFO | WARNING | ERROR`.
    pub level: String,
    pub message: String,
}

/// Línea validada y canonizada, lista para el insert por lotes.
#[derive(Debug, Clone)]
pub struct ValidatedLogLine {
    pub source: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Lote de ingesta (todo-o-nada).
#[derive(Debug, Clone, Deserialize)]
pub struct LogIngestRequest {
    pub lines: Vec<LogLineInput>,
}

impl LogIngestRequest {
    /**
     * Valida cada línea de forma independiente; el primer rechazo veta
     * el lote entero y nombra el índice ofensor.
     */
    pub fn validate(&self) -> Result<Vec<ValidatedLogLine>, ValidationError> {
        if self.lines.is_empty() {
            return Err(ValidationError::new("lines", "batch must contain at least one line"));
        }

        let mut validated = Vec::with_capacity(self.lines.len());
        for (index, line) in self.lines.iter().enumerate() {
            let prefix = format!("lines[{index}]");
            validation::validate_log_source(&format!("{prefix}.source"), &line.source)?;
            let timestamp = validation::validate_timestamp(&format!("{prefix}.timestamp"), &line.timestamp)?;
            let level = validation::parse_log_level(&format!("{prefix}.level"), &line.level)?;
            validation::validate_log_message(&format!("{prefix}.message"), &line.message)?;

            validated.push(ValidatedLogLine {
                source: line.source.clone(),
                timestamp,
                level,
                message: line.message.clone(),
            });
        }
        Ok(validated)
    }
}

/// Acuse de ingesta con el rango de IDs asignado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogIngestResponse {
    pub accepted_count: u64,
    pub first_id: i64,
    pub last_id: i64,
}

/// Orden de devolución de una consulta de logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOrder {
    Asc,
    Desc,
}

/// Filtros de consulta paginada (query string).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    /// Fuente exacta, o el literal `all`.
    pub source: Option<String>,
    /// Subconjunto de severidades separado por comas, p.ej. `INFO,ERROR`.
    pub levels: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// `asc | desc`; por defecto `desc` (más reciente primero).
    pub order: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Filtros validados, listos para el Store.
#[derive(Debug, Clone)]
pub struct LogQueryFilters {
    pub source: Option<String>,
    pub levels: Option<Vec<LogLevel>>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub order: LogOrder,
    pub limit: u32,
    pub offset: u32,
}

impl LogQuery {
    pub fn validate(&self) -> Result<LogQueryFilters, ValidationError> {
        let source = match self.source.as_deref() {
            None | Some("all") => None,
            Some(raw) => {
                validation::validate_log_source("source", raw)?;
                Some(raw.to_string())
            }
        };
        let levels = self.levels.as_deref()
            .map(|raw| validation::parse_log_level_set("levels", raw))
            .transpose()?;
        let start = self.start.as_deref()
            .map(|raw| validation::validate_timestamp("start", raw))
            .transpose()?;
        let end = self.end.as_deref()
            .map(|raw| validation::validate_range_end("end", raw))
            .transpose()?;
        let order = match self.order.as_deref() {
            None | Some("desc") => LogOrder::Desc,
            Some("asc") => LogOrder::Asc,
            Some(_) => return Err(ValidationError::new("order", "must be one of asc, desc")),
        };

        Ok(LogQueryFilters {
            source,
            levels,
            start,
            end,
            order,
            limit: validation::effective_page_limit(self.limit),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Consulta de cola por marca de agua (tail sin re-escaneo).
#[derive(Debug, Clone, Deserialize)]
pub struct LogsSinceQuery {
    /// Marca de agua: se devuelven IDs estrictamente mayores.
    pub after_id: i64,
    pub source: Option<String>,
    pub levels: Option<String>,
    pub limit: Option<u32>,
}

impl LogsSinceQuery {
    pub fn validate(&self) -> Result<LogQueryFilters, ValidationError> {
        LogQuery {
            source: self.source.clone(),
            levels: self.levels.clone(),
            start: None,
            end: None,
            order: Some("asc".into()),
            limit: self.limit,
            offset: None,
        }.validate()
    }
}

/// Proyección de una línea de log hacia el visor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLineResponse {
    pub id: i64,
    pub source: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl From<LogLineRecord> for LogLineResponse {
    fn from(record: LogLineRecord) -> Self {
        Self {
            id: record.id,
            source: record.source,
            timestamp: record.timestamp,
            level: record.level,
            message: record.message,
        }
    }
}

/// Página de logs con total para el paginador del visor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPageResponse {
    pub lines: Vec<LogLineResponse>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
}
