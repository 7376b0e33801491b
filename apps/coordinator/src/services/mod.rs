// [apps/coordinator/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: SERVICE REGISTRY (V2.0 - BACKGROUND DAEMONS)
 * CLASIFICACIÓN: BACKGROUND SERVICES (ESTRATO L1-APP)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE DAEMONS DEL COORDINATOR
 * =================================================================
 */

pub mod retention;

pub use retention::RetentionSweeper;
