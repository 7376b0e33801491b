// [apps/coordinator/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: HANDLER REGISTRY (V3.0 - RESOURCE MATRIX)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE GATEWAYS POR RECURSO
 * =================================================================
 */

pub mod cameras;
pub mod events;
pub mod health;
pub mod logs;
pub mod stats;
