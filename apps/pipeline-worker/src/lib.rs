// [apps/pipeline-worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE WORKER LIBRARY ROOT (V4.0 - NOMINAL EXPOSURE)
 * CLASIFICACIÓN: WORKER LIBRARY (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: EXPOSICIÓN DE MÓDULOS PARA BINARIO Y PROVING GROUNDS
 * =================================================================
 */

pub mod controller;
pub mod engine;
pub mod workers;

pub use engine::{EngineError, PipelineEngine, WorkerSelection};
