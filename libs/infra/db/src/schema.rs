// [libs/infra/db/src/schema.rs]
/**
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V6.0 - PIPELINE STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. PIPELINE COLUMNS: Las columnas de claim (mp4_star/ai_star) sostienen el
 *    primitivo de reclamación condicional de los workers.
 * 2. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * 3. PERFORMANCE: Índices de aceleración para los predicados de los
 *    workers y los filtros del visor.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las tres entidades del núcleo de coordinación.
 */
const CORE_TABLES: &[(&str, &str)] = &[
    ("TABLE_CAMERAS", r#"
        CREATE TABLE IF NOT EXISTS cameras (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            camera_id TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            location TEXT,
            network_address TEXT,
            status TEXT NOT NULL DEFAULT 'online',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#),
    ("TABLE_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            camera_id TEXT NOT NULL REFERENCES cameras(camera_id) ON DELETE CASCADE,
            event_timestamp TEXT NOT NULL,
            motion_score REAL NOT NULL,
            confidence_score REAL,
            status TEXT NOT NULL DEFAULT 'processing',

            image_a_path TEXT,
            image_b_path TEXT,
            thumbnail_path TEXT,
            video_h264_path TEXT,
            video_mp4_path TEXT,
            video_duration_seconds REAL,

            image_a_transferred INTEGER NOT NULL DEFAULT 0,
            image_b_transferred INTEGER NOT NULL DEFAULT 0,
            thumbnail_transferred INTEGER NOT NULL DEFAULT 0,
            video_transferred INTEGER NOT NULL DEFAULT 0,

            mp4_conversion_status TEXT NOT NULL DEFAULT 'pending',
            mp4_converted_at TEXT,
            mp4_claimed_by TEXT,
            mp4_claimed_at TEXT,

            ai_processed INTEGER NOT NULL DEFAULT 0,
            ai_processed_at TEXT,
            ai_person_detected INTEGER,
            ai_confidence REAL,
            ai_objects TEXT,
            ai_description TEXT,
            ai_phrase TEXT,
            ai_error TEXT,

            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_LOG_LINES", r#"
        CREATE TABLE IF NOT EXISTS log_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            level TEXT NOT NULL,
            message TEXT NOT NULL
        );
    "#),
];

/**
 * ESTRATO 2: EVOLUCIÓN (Mutaciones de Columna)
 * Asegura que despliegues previos se adapten a capacidades nuevas.
 */
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    ("CAMERA_HEARTBEAT", "ALTER TABLE cameras ADD COLUMN last_heartbeat_at TEXT"),
    ("EVENT_AI_CLAIM_BY", "ALTER TABLE events ADD COLUMN ai_claimed_by TEXT"),
    ("EVENT_AI_CLAIM_AT", "ALTER TABLE events ADD COLUMN ai_claimed_at TEXT"),
];

/**
 * ESTRATO 3: ENDURECIMIENTO (Índices de Aceleración)
 * Optimiza los predicados de claim y los filtros del visor.
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_EVENTS_CAMERA_TS", "CREATE INDEX IF NOT EXISTS idx_events_camera_ts ON events(camera_id, event_timestamp DESC);"),
    ("IDX_EVENTS_MP4_STATUS", "CREATE INDEX IF NOT EXISTS idx_events_mp4_status ON events(mp4_conversion_status);"),
    ("IDX_EVENTS_AI_FLAG", "CREATE INDEX IF NOT EXISTS idx_events_ai_flag ON events(ai_processed);"),
    ("IDX_LOGS_SOURCE_TS", "CREATE INDEX IF NOT EXISTS idx_logs_source_ts ON log_lines(source, timestamp DESC);"),
    ("IDX_LOGS_LEVEL", "CREATE INDEX IF NOT EXISTS idx_logs_level ON log_lines(level);"),
    ("IDX_LOGS_LEVEL_SOURCE_TS", "CREATE INDEX IF NOT EXISTS idx_logs_level_source_ts ON log_lines(level, source, timestamp);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con el motor.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization...");

    solidify_base_strata(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Coordination Ledger level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in CORE_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(*sql, ()).await {
            Ok(_) => debug!("  🟢 [REPAIR_OK]: Applied evolutionary stratum {}", identifier),
            Err(fault) => {
                let message = fault.to_string();
                if message.contains("duplicate column name") {
                    debug!("  ⚪ [REPAIR_SKIP]: {} already level.", identifier);
                } else {
                    warn!("  ⚠️ [REPAIR_BYPASS]: {} check incomplete: {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    Ok(())
}
