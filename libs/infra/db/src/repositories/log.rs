// [libs/infra/db/src/repositories/log.rs]
/*!
 * =================================================================
 * APARATO: LOG REPOSITORY (V6.0 - WATERMARK LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: INGESTA ATÓMICA POR LOTES Y CONSULTA ORDENADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ATOMIC BATCH: El lote completo viaja dentro de una transacción;
 *    cualquier rechazo revierte todo, preservando limpia la marca de
 *    agua del consumidor.
 * 2. ID AS ORDER KEY: El ID asignado por el Store es la clave de orden
 *    y el desempate de paginación; los timestamps del cliente jamás
 *    gobiernan la estabilidad de una página.
 * =================================================================
 */

use libsql::{params, Row, Value};
use tracing::{info, instrument};

use vigil_domain_models::log::{LogLevel, LogLineRecord};

use crate::client::StoreClient;
use crate::errors::DbError;

/// Línea validada lista para persistir (forma interna del Store).
#[derive(Debug, Clone)]
pub struct NewLogLine {
    pub source: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Orden de devolución de una consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    Ascending,
    Descending,
}

/// Filtros validados de consulta de logs.
#[derive(Debug, Clone)]
pub struct LogFilters {
    pub source: Option<String>,
    pub levels: Option<Vec<LogLevel>>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub order: QueryOrder,
    pub limit: u32,
    pub offset: u32,
}

const LOG_COLUMNS: &str = "id, source, timestamp, level, message";

const INSERT_LOG_LINE: &str = "\
INSERT INTO log_lines (source, timestamp, level, message) \
VALUES (?1, ?2, ?3, ?4) RETURNING id";

/// Filtro compartido: fuente exacta, subconjunto de niveles (hasta tres
/// placeholders anulables) y rango temporal inclusivo.
const FILTER_CLAUSE: &str = "\
  (?1 IS NULL OR source = ?1) \
  AND (?2 IS NULL OR level IN (?2, ?3, ?4)) \
  AND (?5 IS NULL OR timestamp >= ?5) \
  AND (?6 IS NULL OR timestamp <= ?6)";

pub struct LogRepository {
    database_client: StoreClient,
}

impl LogRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /**
     * Ingesta atómica: N líneas obtienen IDs contiguos `k..k+N-1` dentro
     * de una transacción exclusiva; el primer fallo revierte el lote.
     */
    #[instrument(skip(self, lines), fields(batch = lines.len()))]
    pub async fn batch_insert(&self, lines: &[NewLogLine]) -> Result<(u64, i64, i64), DbError> {
        let connection = self.database_client.acquire().await?;
        let transaction = connection.transaction().await?;

        let mut first_id: Option<i64> = None;
        let mut last_id: i64 = 0;

        for line in lines {
            let mut inserted_rows = transaction
                .query(
                    INSERT_LOG_LINE,
                    params![
                        line.source.as_str(),
                        line.timestamp.as_str(),
                        line.level.as_str(),
                        line.message.as_str(),
                    ],
                )
                .await?;

            let assigned_id: i64 = inserted_rows
                .next()
                .await?
                .ok_or_else(|| DbError::Mapping("insert returned no id".into()))?
                .get(0)?;

            first_id.get_or_insert(assigned_id);
            last_id = assigned_id;
        }

        transaction.commit().await?;

        let accepted = lines.len() as u64;
        info!("📜 [LOG_LEDGER]: Batch of {} line(s) sealed ({}..{}).", accepted, first_id.unwrap_or(0), last_id);
        Ok((accepted, first_id.unwrap_or(0), last_id))
    }

    /// Consulta paginada con total; orden por timestamp con ID de desempate.
    pub async fn query(&self, filters: &LogFilters) -> Result<(Vec<LogLineRecord>, u64), DbError> {
        let connection = self.database_client.acquire().await?;

        let order_clause = match filters.order {
            QueryOrder::Ascending => "ORDER BY timestamp ASC, id ASC",
            QueryOrder::Descending => "ORDER BY timestamp DESC, id DESC",
        };

        let page_sql = format!(
            "SELECT {LOG_COLUMNS} FROM log_lines WHERE {FILTER_CLAUSE} {order_clause} LIMIT ?7 OFFSET ?8"
        );

        let mut bound = filter_params(filters);
        bound.push(Value::Integer(i64::from(filters.limit)));
        bound.push(Value::Integer(i64::from(filters.offset)));

        let mut page_rows = connection.query(&page_sql, bound).await?;
        let mut lines = Vec::new();
        while let Some(row) = page_rows.next().await? {
            lines.push(map_log_row(&row)?);
        }

        let count_sql = format!("SELECT COUNT(*) FROM log_lines WHERE {FILTER_CLAUSE}");
        let mut count_rows = connection.query(&count_sql, filter_params(filters)).await?;
        let total_count = count_rows
            .next()
            .await?
            .and_then(|row| row.get::<i64>(0).ok())
            .unwrap_or(0) as u64;

        Ok((lines, total_count))
    }

    /**
     * Cola por marca de agua: IDs estrictamente mayores que `after_id`,
     * en orden ascendente de ID, honrando los filtros de fuente y nivel.
     */
    pub async fn since_id(&self, after_id: i64, filters: &LogFilters) -> Result<Vec<LogLineRecord>, DbError> {
        let connection = self.database_client.acquire().await?;

        let tail_sql = format!(
            "SELECT {LOG_COLUMNS} FROM log_lines WHERE id > ?7 AND {FILTER_CLAUSE} \
             ORDER BY id ASC LIMIT ?8"
        );

        let mut bound = filter_params(filters);
        bound.push(Value::Integer(after_id));
        bound.push(Value::Integer(i64::from(filters.limit)));

        let mut tail_rows = connection.query(&tail_sql, bound).await?;
        let mut lines = Vec::new();
        while let Some(row) = tail_rows.next().await? {
            lines.push(map_log_row(&row)?);
        }
        Ok(lines)
    }

    /// Poda de retención: elimina líneas anteriores al corte canónico.
    #[instrument(skip(self))]
    pub async fn prune_older_than(&self, cutoff_stamp: &str) -> Result<u64, DbError> {
        let connection = self.database_client.acquire().await?;
        let deleted = connection
            .execute("DELETE FROM log_lines WHERE timestamp < ?1", params![cutoff_stamp])
            .await?;

        if deleted > 0 {
            info!("🧹 [LOG_LEDGER]: Retention sweep pruned {} line(s).", deleted);
        }
        Ok(deleted)
    }
}

fn filter_params(filters: &LogFilters) -> Vec<Value> {
    let level_slot = |index: usize| -> Value {
        filters
            .levels
            .as_ref()
            .and_then(|levels| levels.get(index))
            .map(|level| Value::Text(level.as_str().to_string()))
            .unwrap_or(Value::Null)
    };

    vec![
        filters
            .source
            .as_deref()
            .map(|source| Value::Text(source.to_string()))
            .unwrap_or(Value::Null),
        level_slot(0),
        level_slot(1),
        level_slot(2),
        filters
            .start
            .as_deref()
            .map(|stamp| Value::Text(stamp.to_string()))
            .unwrap_or(Value::Null),
        filters
            .end
            .as_deref()
            .map(|stamp| Value::Text(stamp.to_string()))
            .unwrap_or(Value::Null),
    ]
}

fn map_log_row(row: &Row) -> Result<LogLineRecord, DbError> {
    let level_raw: String = row.get(3)?;
    let level = LogLevel::parse(&level_raw)
        .ok_or_else(|| DbError::Mapping(format!("unknown log level '{level_raw}'")))?;

    Ok(LogLineRecord {
        id: row.get(0)?,
        source: row.get(1)?,
        timestamp: row.get(2)?,
        level,
        message: row.get(4)?,
    })
}
