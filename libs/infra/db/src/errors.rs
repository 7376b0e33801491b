// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: STORE ERROR CATALOG (V5.0 - TAXONOMY ALIGNED)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TAXONOMY PARITY: Variantes alineadas 1:1 con la taxonomía expuesta
 *    por el API (NotFound, Conflict, ConstraintViolation, Unavailable).
 * 2. CLAIM SEMANTICS: 'ClaimLost' señala el commit de un worker cuyo
 *    claim fue robado tras el horizonte de reclamación; el worker lo
 *    trata como no-op silencioso, jamás como colapso.
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico durante la ignición del cliente.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    Connection(String),

    /// Agotamiento del pool o pérdida transitoria de conectividad; reintentable.
    #[error("[L3_DB_POOL_FAULT]: STORE_UNAVAILABLE -> {0}")]
    Unavailable(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    Query(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    Mapping(String),

    /// La entidad referenciada no existe en las tablas activas.
    #[error("[L3_DB_FAULT]: IDENTIFIER_NOT_FOUND")]
    NotFound,

    /// Colisión optimista: transición terminal repetida o ruta de artefacto divergente.
    #[error("[L3_DB_FAULT]: STATE_CONFLICT -> {0}")]
    Conflict(String),

    /// Violación de restricción declarada del esquema (unicidad, FK, checks).
    #[error("[L3_DB_FAULT]: CONSTRAINT_VIOLATION -> {0}")]
    ConstraintViolation(String),

    /// El claim del worker fue robado o la fila desapareció antes del commit.
    #[error("[L3_DB_CLAIM_FAULT]: OWNERSHIP_LOST")]
    ClaimLost,
}

impl DbError {
    /**
     * Reclasifica un fallo crudo del motor según el texto de la restricción.
     * libSQL no expone códigos estructurados para estas violaciones, por lo
     * que el triage se realiza sobre el mensaje canónico de SQLite.
     */
    pub fn from_engine(fault: libsql::Error) -> Self {
        let message = fault.to_string();
        if message.contains("UNIQUE constraint failed") {
            return DbError::ConstraintViolation(message);
        }
        if message.contains("FOREIGN KEY constraint failed") {
            return DbError::NotFound;
        }
        DbError::Query(fault)
    }
}
