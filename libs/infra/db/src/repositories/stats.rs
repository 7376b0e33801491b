// [libs/infra/db/src/repositories/stats.rs]
/*!
 * =================================================================
 * APARATO: STATISTICS REPOSITORY (V3.1 - READ-ONLY COUNTERS)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: AGREGADOS DE SOLO LECTURA PARA EL VISOR
 * =================================================================
 */

use libsql::{params, Value};
use std::collections::BTreeMap;

use crate::client::StoreClient;
use crate::errors::DbError;

/// Totales globales del despliegue.
#[derive(Debug, Clone, Default)]
pub struct OverviewCounters {
    pub total_cameras: u64,
    pub total_events: u64,
    pub events_by_status: BTreeMap<String, u64>,
    pub events_by_mp4_status: BTreeMap<String, u64>,
    pub ai_processed_count: u64,
    pub total_log_lines: u64,
}

/// Desglose de una cámara del directorio.
#[derive(Debug, Clone, Default)]
pub struct CameraCounters {
    pub camera_id: String,
    pub total_events: u64,
    pub events_by_status: BTreeMap<String, u64>,
}

/// Conteo de eventos de un día UTC (`YYYY-MM-DD`).
#[derive(Debug, Clone)]
pub struct DailyCounter {
    pub day: String,
    pub event_count: u64,
}

pub struct StatsRepository {
    database_client: StoreClient,
}

impl StatsRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    pub async fn overview(&self) -> Result<OverviewCounters, DbError> {
        let connection = self.database_client.acquire().await?;

        let scalar = |rows: Option<i64>| rows.unwrap_or(0) as u64;

        let mut counters = OverviewCounters::default();

        let mut camera_rows = connection.query("SELECT COUNT(*) FROM cameras", ()).await?;
        counters.total_cameras = scalar(camera_rows.next().await?.and_then(|row| row.get(0).ok()));

        let mut event_rows = connection.query("SELECT COUNT(*) FROM events", ()).await?;
        counters.total_events = scalar(event_rows.next().await?.and_then(|row| row.get(0).ok()));

        let mut status_rows = connection
            .query("SELECT status, COUNT(*) FROM events GROUP BY status", ())
            .await?;
        while let Some(row) = status_rows.next().await? {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            counters.events_by_status.insert(status, count as u64);
        }

        let mut mp4_rows = connection
            .query("SELECT mp4_conversion_status, COUNT(*) FROM events GROUP BY mp4_conversion_status", ())
            .await?;
        while let Some(row) = mp4_rows.next().await? {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            counters.events_by_mp4_status.insert(status, count as u64);
        }

        let mut ai_rows = connection
            .query("SELECT COUNT(*) FROM events WHERE ai_processed = 1", ())
            .await?;
        counters.ai_processed_count = scalar(ai_rows.next().await?.and_then(|row| row.get(0).ok()));

        let mut log_rows = connection.query("SELECT COUNT(*) FROM log_lines", ()).await?;
        counters.total_log_lines = scalar(log_rows.next().await?.and_then(|row| row.get(0).ok()));

        Ok(counters)
    }

    /// Desglose por cámara sobre una página del directorio (orden por camera_id).
    pub async fn per_camera(&self, limit: u32, offset: u32) -> Result<(Vec<CameraCounters>, u64), DbError> {
        let connection = self.database_client.acquire().await?;

        // Página del directorio + desglose por estado en una sola pasada.
        let grouped_sql = "\
            SELECT page.camera_id, events.status, COUNT(events.id) \
            FROM (SELECT camera_id FROM cameras ORDER BY camera_id LIMIT ?1 OFFSET ?2) AS page \
            LEFT JOIN events ON events.camera_id = page.camera_id \
            GROUP BY page.camera_id, events.status \
            ORDER BY page.camera_id";

        let mut grouped_rows = connection
            .query(grouped_sql, params![i64::from(limit), i64::from(offset)])
            .await?;

        let mut entries: Vec<CameraCounters> = Vec::new();
        while let Some(row) = grouped_rows.next().await? {
            let camera_id: String = row.get(0)?;
            let status: Option<String> = row.get::<String>(1).ok();
            let count: i64 = row.get(2)?;

            if entries.last().map(|entry| entry.camera_id.as_str()) != Some(camera_id.as_str()) {
                entries.push(CameraCounters { camera_id: camera_id.clone(), ..Default::default() });
            }
            let entry = entries.last_mut().expect("INVARIANT: entry pushed above");

            // Una fila con estado NULL proviene del LEFT JOIN de una cámara sin eventos.
            if let Some(status) = status {
                entry.total_events += count as u64;
                entry.events_by_status.insert(status, count as u64);
            }
        }

        let mut count_rows = connection.query("SELECT COUNT(*) FROM cameras", ()).await?;
        let total_count = count_rows
            .next()
            .await?
            .and_then(|row| row.get::<i64>(0).ok())
            .unwrap_or(0) as u64;

        Ok((entries, total_count))
    }

    /// Serie diaria de eventos desde el corte canónico, día más reciente primero.
    pub async fn daily_since(&self, cutoff_stamp: &str) -> Result<Vec<DailyCounter>, DbError> {
        let connection = self.database_client.acquire().await?;

        let daily_sql = "\
            SELECT substr(event_timestamp, 1, 10) AS day, COUNT(*) \
            FROM events WHERE event_timestamp >= ?1 \
            GROUP BY day ORDER BY day DESC";

        let mut daily_rows = connection
            .query(daily_sql, [Value::Text(cutoff_stamp.to_string())])
            .await?;

        let mut days = Vec::new();
        while let Some(row) = daily_rows.next().await? {
            let day: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            days.push(DailyCounter { day, event_count: count as u64 });
        }
        Ok(days)
    }
}
