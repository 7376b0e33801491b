// [libs/infra/db/src/repositories/event/mod.rs]
/*!
 * =================================================================
 * APARATO: EVENT REPOSITORY (V9.1 - CLAIM LEDGER GUARD)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DEL CICLO DE VIDA DE EVENTOS DE MOVIMIENTO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SEMANTIC ERROR HANDLING: Utiliza 'DbError' para reportar conflictos
 *    de estado, permitiendo el mapeo 1:1 hacia los códigos HTTP del API.
 * 2. CONDITIONAL CLAIM: Todo claim y todo commit es un UPDATE condicional
 *    único; jamás SELECT FOR UPDATE seguido de escritura separada.
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta en conexiones,
 *    transacciones y resultados de consulta.
 *
 * # Mathematical Proof (Idempotent Transfer):
 * La actualización de ficheros re-afirma la ruta previa en el predicado
 * (path IS NULL OR path = nueva). Repetir la misma ruta afecta una fila
 * sin cambio observable; una ruta divergente afecta cero filas y se
 * reporta como Conflict. La bandera sólo puede voltear 0 -> 1.
 * =================================================================
 */

pub mod queries;

use chrono::{Duration as ChronoDuration, Utc};
use libsql::{params, Row, Value};
use std::time::Duration;
use tracing::{info, instrument, warn};

use vigil_domain_models::event::{AiAnnotations, ArtifactKind, EventRecord, EventStatus, Mp4Status};
use vigil_domain_models::time;

use crate::client::StoreClient;
use crate::errors::DbError;
use self::queries as sql_registry;

/// Filtros ya validados del listado de eventos.
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub camera_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub status: Option<EventStatus>,
    pub mp4_status: Option<Mp4Status>,
    pub ai_processed: Option<bool>,
    pub limit: u32,
    pub offset: u32,
}

/// Repositorio de autoridad única para el inventario de eventos.
pub struct EventRepository {
    database_client: StoreClient,
}

impl EventRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /**
     * Alta de un incidente: estado 'processing', sub-estado MP4 'pending',
     * artefactos ausentes y banderas en cero (defaults del esquema).
     *
     * # Errors:
     * - `NotFound`: la cámara referida no existe (rechazo de FK).
     */
    #[instrument(skip(self))]
    pub async fn create_event(
        &self,
        camera_id: &str,
        canonical_timestamp: &str,
        motion_score: f64,
        confidence_score: Option<f64>,
    ) -> Result<EventRecord, DbError> {
        let connection = self.database_client.acquire().await?;
        let insert_sql = format!("{}{}", sql_registry::INSERT_EVENT, sql_registry::EVENT_COLUMNS);

        let mut inserted_rows = connection
            .query(
                &insert_sql,
                params![
                    camera_id,
                    canonical_timestamp,
                    motion_score,
                    opt_real(confidence_score),
                    time::now_canonical(),
                ],
            )
            .await
            .map_err(DbError::from_engine)?;

        let inserted_row = inserted_rows.next().await?.ok_or(DbError::NotFound)?;
        let record = map_event_row(&inserted_row)?;

        info!("🎬 [EVENT_LEDGER]: Incident {} registered for unit [{}].", record.id, camera_id);
        Ok(record)
    }

    pub async fn get_event(&self, event_id: i64) -> Result<EventRecord, DbError> {
        let connection = self.database_client.acquire().await?;
        let select_sql = with_columns(sql_registry::SELECT_EVENT_BY_ID);

        let mut result_rows = connection.query(&select_sql, params![event_id]).await?;
        let row = result_rows.next().await?.ok_or(DbError::NotFound)?;
        map_event_row(&row)
    }

    /// Listado paginado, más reciente primero, con total de la página.
    pub async fn list_events(&self, filters: &EventFilters) -> Result<(Vec<EventRecord>, u64), DbError> {
        let connection = self.database_client.acquire().await?;

        let filter_params = |limit_offset: bool| {
            let mut bound: Vec<Value> = vec![
                opt_text(filters.camera_id.as_deref()),
                opt_text(filters.start.as_deref()),
                opt_text(filters.end.as_deref()),
                opt_text(filters.status.map(|status| status.as_str())),
                opt_text(filters.mp4_status.map(|status| status.as_str())),
                opt_flag(filters.ai_processed),
            ];
            if limit_offset {
                bound.push(Value::Integer(i64::from(filters.limit)));
                bound.push(Value::Integer(i64::from(filters.offset)));
            }
            bound
        };

        let list_sql = with_columns(sql_registry::LIST_EVENTS);
        let mut page_rows = connection.query(&list_sql, filter_params(true)).await?;

        let mut events = Vec::new();
        while let Some(row) = page_rows.next().await? {
            events.push(map_event_row(&row)?);
        }

        let mut count_rows = connection
            .query(sql_registry::COUNT_EVENTS, filter_params(false))
            .await?;
        let total_count = count_rows
            .next()
            .await?
            .and_then(|row| row.get::<i64>(0).ok())
            .unwrap_or(0) as u64;

        Ok((events, total_count))
    }

    /// Vecinos por orden de ID (navegación del visor), con filtro opcional de cámara.
    pub async fn neighbor_ids(
        &self,
        event_id: i64,
        camera_id: Option<&str>,
    ) -> Result<(Option<i64>, Option<i64>), DbError> {
        // La existencia del pivote es parte del contrato del endpoint.
        self.get_event(event_id).await?;

        let connection = self.database_client.acquire().await?;

        let mut previous_rows = connection
            .query(sql_registry::NEIGHBOR_PREVIOUS, params![event_id, opt_text(camera_id)])
            .await?;
        let previous_id = previous_rows
            .next()
            .await?
            .and_then(|row| row.get::<i64>(0).ok());

        let mut next_rows = connection
            .query(sql_registry::NEIGHBOR_NEXT, params![event_id, opt_text(camera_id)])
            .await?;
        let next_id = next_rows
            .next()
            .await?
            .and_then(|row| row.get::<i64>(0).ok());

        Ok((previous_id, next_id))
    }

    /**
     * Actualización progresiva de transferencia de un artefacto.
     *
     * Idempotente: repetir la misma ruta es un no-op; una ruta divergente
     * para el mismo artefacto se rechaza con Conflict. Devuelve el registro
     * actualizado y si hubo cambio observable.
     */
    #[instrument(skip(self, relative_path))]
    pub async fn update_file_status(
        &self,
        event_id: i64,
        artifact: ArtifactKind,
        relative_path: &str,
        duration_seconds: Option<f64>,
    ) -> Result<(EventRecord, bool), DbError> {
        let current_record = self.get_event(event_id).await?;
        let (existing_path, already_transferred) = current_record.artifact_slot(artifact);

        if let Some(existing) = existing_path {
            if existing != relative_path {
                return Err(DbError::Conflict(format!(
                    "artifact {} already sealed with a different path",
                    artifact.as_str()
                )));
            }
            if already_transferred {
                // Reenvío exacto: no-op certificado.
                return Ok((current_record, false));
            }
        }

        let (path_column, flag_column) = artifact_columns(artifact);
        let connection = self.database_client.acquire().await?;

        // UPDATE condicional: re-afirma la ruta previa dentro de la sentencia
        // para que dos agentes concurrentes con rutas divergentes no se pisen.
        let update_sql = if artifact == ArtifactKind::VideoH264 && duration_seconds.is_some() {
            format!(
                "UPDATE events SET {path_column} = ?2, {flag_column} = 1, video_duration_seconds = ?3 \
                 WHERE id = ?1 AND ({path_column} IS NULL OR {path_column} = ?2)"
            )
        } else {
            format!(
                "UPDATE events SET {path_column} = ?2, {flag_column} = 1 \
                 WHERE id = ?1 AND ({path_column} IS NULL OR {path_column} = ?2)"
            )
        };

        let rows_affected = if let Some(duration) = duration_seconds.filter(|_| artifact == ArtifactKind::VideoH264) {
            connection.execute(&update_sql, params![event_id, relative_path, duration]).await?
        } else {
            connection.execute(&update_sql, params![event_id, relative_path]).await?
        };

        if rows_affected == 0 {
            return Err(DbError::Conflict(format!(
                "artifact {} sealed concurrently with a different path",
                artifact.as_str()
            )));
        }

        drop(connection);
        let updated_record = self.get_event(event_id).await?;
        Ok((updated_record, true))
    }

    /**
     * Transición terminal solicitada por la cámara.
     *
     * # Errors:
     * - `NotFound`: el evento no existe.
     * - `Conflict`: el evento ya alcanzó un estado terminal.
     */
    #[instrument(skip(self))]
    pub async fn update_event_status(
        &self,
        event_id: i64,
        target_status: EventStatus,
    ) -> Result<EventRecord, DbError> {
        debug_assert!(target_status.is_terminal());

        let connection = self.database_client.acquire().await?;
        let rows_affected = connection
            .execute(
                sql_registry::COMMIT_TERMINAL_STATUS,
                params![event_id, target_status.as_str()],
            )
            .await?;

        drop(connection);

        if rows_affected == 0 {
            // Distinción NotFound vs terminal ya sellado.
            let current_record = self.get_event(event_id).await?;
            return Err(DbError::Conflict(format!(
                "event already terminal in status '{}'",
                current_record.status.as_str()
            )));
        }

        info!("🏁 [EVENT_LEDGER]: Incident {} sealed as '{}'.", event_id, target_status.as_str());
        self.get_event(event_id).await
    }

    // --- PRIMITIVO DE CLAIM: CONVERSIÓN H.264 -> MP4 ---

    /**
     * Reclama hasta `batch_size` eventos pendientes de conversión, robando
     * de paso los claims cuyo sello superó el horizonte de reclamación.
     */
    #[instrument(skip(self))]
    pub async fn claim_for_conversion(
        &self,
        worker_identifier: &str,
        batch_size: usize,
        reclaim_horizon: Duration,
    ) -> Result<Vec<EventRecord>, DbError> {
        self.execute_claim(sql_registry::CLAIM_FOR_CONVERSION, worker_identifier, batch_size, reclaim_horizon)
            .await
    }

    /// Revierte un claim de conversión no consumado (guardia fallida).
    pub async fn release_conversion_claim(&self, event_id: i64, worker_identifier: &str) -> Result<bool, DbError> {
        self.execute_ownership_update(sql_registry::RELEASE_CONVERSION_CLAIM, event_id, worker_identifier)
            .await
    }

    /**
     * Sella la conversión: ruta MP4, duración, marca de conversión y avance
     * a 'complete' en una sola sentencia condicionada al claimant.
     *
     * # Errors:
     * - `ClaimLost`: el claim fue robado o la fila desapareció (cascade).
     */
    #[instrument(skip(self, mp4_relative_path))]
    pub async fn commit_conversion(
        &self,
        event_id: i64,
        worker_identifier: &str,
        mp4_relative_path: &str,
        duration_seconds: f64,
    ) -> Result<(), DbError> {
        let connection = self.database_client.acquire().await?;
        let rows_affected = connection
            .execute(
                sql_registry::COMMIT_CONVERSION,
                params![
                    event_id,
                    worker_identifier,
                    mp4_relative_path,
                    duration_seconds,
                    time::now_canonical(),
                ],
            )
            .await?;

        if rows_affected == 0 {
            warn!("♻️ [CLAIM_GUARD]: Conversion commit for event {} rejected (ownership lost).", event_id);
            return Err(DbError::ClaimLost);
        }
        Ok(())
    }

    /// Latch de fallo de conversión (terminal para el sub-estado MP4).
    pub async fn fail_conversion(&self, event_id: i64, worker_identifier: &str) -> Result<bool, DbError> {
        self.execute_ownership_update(sql_registry::FAIL_CONVERSION, event_id, worker_identifier)
            .await
    }

    // --- PRIMITIVO DE CLAIM: OPTIMIZACIÓN MP4 ---

    #[instrument(skip(self))]
    pub async fn claim_for_optimization(
        &self,
        worker_identifier: &str,
        batch_size: usize,
        reclaim_horizon: Duration,
    ) -> Result<Vec<EventRecord>, DbError> {
        self.execute_claim(sql_registry::CLAIM_FOR_OPTIMIZATION, worker_identifier, batch_size, reclaim_horizon)
            .await
    }

    pub async fn release_optimization_claim(&self, event_id: i64, worker_identifier: &str) -> Result<bool, DbError> {
        self.execute_ownership_update(sql_registry::RELEASE_OPTIMIZATION_CLAIM, event_id, worker_identifier)
            .await
    }

    #[instrument(skip(self, optimized_relative_path))]
    pub async fn commit_optimization(
        &self,
        event_id: i64,
        worker_identifier: &str,
        optimized_relative_path: &str,
    ) -> Result<(), DbError> {
        let connection = self.database_client.acquire().await?;
        let rows_affected = connection
            .execute(
                sql_registry::COMMIT_OPTIMIZATION,
                params![event_id, worker_identifier, optimized_relative_path],
            )
            .await?;

        if rows_affected == 0 {
            warn!("♻️ [CLAIM_GUARD]: Optimization commit for event {} rejected (ownership lost).", event_id);
            return Err(DbError::ClaimLost);
        }
        Ok(())
    }

    pub async fn fail_optimization(&self, event_id: i64, worker_identifier: &str) -> Result<bool, DbError> {
        self.execute_ownership_update(sql_registry::FAIL_OPTIMIZATION, event_id, worker_identifier)
            .await
    }

    // --- PRIMITIVO DE CLAIM: ANÁLISIS DE IA ---

    #[instrument(skip(self))]
    pub async fn claim_for_analysis(
        &self,
        worker_identifier: &str,
        batch_size: usize,
        reclaim_horizon: Duration,
    ) -> Result<Vec<EventRecord>, DbError> {
        self.execute_claim(sql_registry::CLAIM_FOR_ANALYSIS, worker_identifier, batch_size, reclaim_horizon)
            .await
    }

    /// Libera el claim de análisis sin latch (fallo de red dentro del presupuesto).
    pub async fn release_analysis_claim(&self, event_id: i64, worker_identifier: &str) -> Result<bool, DbError> {
        self.execute_ownership_update(sql_registry::RELEASE_ANALYSIS_CLAIM, event_id, worker_identifier)
            .await
    }

    /**
     * Escritura atómica del latch de IA: todas las anotaciones y el flag
     * 'ai_processed' avanzan en la misma sentencia; jamás hay reproceso.
     */
    #[instrument(skip(self, annotations))]
    pub async fn commit_analysis(
        &self,
        event_id: i64,
        worker_identifier: &str,
        annotations: &AiAnnotations,
    ) -> Result<(), DbError> {
        let connection = self.database_client.acquire().await?;
        let rows_affected = connection
            .execute(
                sql_registry::COMMIT_ANALYSIS,
                params![
                    event_id,
                    worker_identifier,
                    time::now_canonical(),
                    opt_flag(annotations.person_detected),
                    opt_real(annotations.confidence),
                    opt_text(annotations.objects.as_deref()),
                    opt_text(annotations.description.as_deref()),
                    opt_text(annotations.phrase.as_deref()),
                    opt_text(annotations.error.as_deref()),
                ],
            )
            .await?;

        if rows_affected == 0 {
            warn!("♻️ [CLAIM_GUARD]: Analysis commit for event {} rejected (ownership lost).", event_id);
            return Err(DbError::ClaimLost);
        }
        Ok(())
    }

    // --- NÚCLEO COMPARTIDO DE CLAIMS ---

    async fn execute_claim(
        &self,
        claim_sql_prefix: &str,
        worker_identifier: &str,
        batch_size: usize,
        reclaim_horizon: Duration,
    ) -> Result<Vec<EventRecord>, DbError> {
        let connection = self.database_client.acquire().await?;

        let now_stamp = time::now_canonical();
        let stale_threshold = time::to_canonical(
            Utc::now() - ChronoDuration::seconds(reclaim_horizon.as_secs() as i64),
        );

        let claim_sql = format!("{}{}", claim_sql_prefix, sql_registry::EVENT_COLUMNS);
        let mut claimed_rows = connection
            .query(
                &claim_sql,
                params![worker_identifier, now_stamp, stale_threshold, batch_size as i64],
            )
            .await?;

        let mut claimed_events = Vec::new();
        while let Some(row) = claimed_rows.next().await? {
            claimed_events.push(map_event_row(&row)?);
        }

        if !claimed_events.is_empty() {
            info!(
                "🔐 [CLAIM]: Unit [{}] secured {} event(s).",
                worker_identifier,
                claimed_events.len()
            );
        }
        Ok(claimed_events)
    }

    async fn execute_ownership_update(
        &self,
        sql: &str,
        event_id: i64,
        worker_identifier: &str,
    ) -> Result<bool, DbError> {
        let connection = self.database_client.acquire().await?;
        let rows_affected = connection.execute(sql, params![event_id, worker_identifier]).await?;
        Ok(rows_affected > 0)
    }
}

// --- MAPEO FILA -> DOMINIO ---

fn with_columns(sql: &str) -> String {
    sql.replace("{COLUMNS}", sql_registry::EVENT_COLUMNS)
}

fn artifact_columns(artifact: ArtifactKind) -> (&'static str, &'static str) {
    match artifact {
        ArtifactKind::ImageA => ("image_a_path", "image_a_transferred"),
        ArtifactKind::ImageB => ("image_b_path", "image_b_transferred"),
        ArtifactKind::Thumbnail => ("thumbnail_path", "thumbnail_transferred"),
        ArtifactKind::VideoH264 => ("video_h264_path", "video_transferred"),
    }
}

fn opt_text<S: Into<String>>(value: Option<S>) -> Value {
    match value {
        Some(text) => Value::Text(text.into()),
        None => Value::Null,
    }
}

fn opt_real(value: Option<f64>) -> Value {
    match value {
        Some(real) => Value::Real(real),
        None => Value::Null,
    }
}

fn opt_flag(value: Option<bool>) -> Value {
    match value {
        Some(flag) => Value::Integer(i64::from(flag)),
        None => Value::Null,
    }
}

/**
 * Transforma una fila del Ledger en el registro de dominio.
 * El orden de columnas es el contrato declarado en EVENT_COLUMNS.
 */
pub(crate) fn map_event_row(row: &Row) -> Result<EventRecord, DbError> {
    let status_raw: String = row.get(5)?;
    let status = EventStatus::parse(&status_raw)
        .ok_or_else(|| DbError::Mapping(format!("unknown event status '{status_raw}'")))?;

    let mp4_status_raw: String = row.get(16)?;
    let mp4_conversion_status = Mp4Status::parse(&mp4_status_raw)
        .ok_or_else(|| DbError::Mapping(format!("unknown mp4 status '{mp4_status_raw}'")))?;

    Ok(EventRecord {
        id: row.get(0)?,
        camera_id: row.get(1)?,
        event_timestamp: row.get(2)?,
        motion_score: row.get(3)?,
        confidence_score: row.get::<f64>(4).ok(),
        status,
        image_a_path: row.get::<String>(6).ok(),
        image_b_path: row.get::<String>(7).ok(),
        thumbnail_path: row.get::<String>(8).ok(),
        video_h264_path: row.get::<String>(9).ok(),
        video_mp4_path: row.get::<String>(10).ok(),
        video_duration_seconds: row.get::<f64>(11).ok(),
        image_a_transferred: row.get::<i64>(12)? != 0,
        image_b_transferred: row.get::<i64>(13)? != 0,
        thumbnail_transferred: row.get::<i64>(14)? != 0,
        video_transferred: row.get::<i64>(15)? != 0,
        mp4_conversion_status,
        mp4_converted_at: row.get::<String>(17).ok(),
        mp4_claimed_by: row.get::<String>(18).ok(),
        mp4_claimed_at: row.get::<String>(19).ok(),
        ai_processed: row.get::<i64>(20)? != 0,
        ai_processed_at: row.get::<String>(21).ok(),
        ai_person_detected: row.get::<i64>(22).ok().map(|flag| flag != 0),
        ai_confidence: row.get::<f64>(23).ok(),
        ai_objects: row.get::<String>(24).ok(),
        ai_description: row.get::<String>(25).ok(),
        ai_phrase: row.get::<String>(26).ok(),
        ai_error: row.get::<String>(27).ok(),
        ai_claimed_by: row.get::<String>(28).ok(),
        ai_claimed_at: row.get::<String>(29).ok(),
        created_at: row.get(30)?,
    })
}
