// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY REGISTRY (V4.0 - ACCESS MATRIX)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE REPOSITORIOS DEL STORE
 * =================================================================
 */

pub mod camera;
pub mod event;
pub mod log;
pub mod stats;

pub use camera::CameraRepository;
pub use event::{EventFilters, EventRepository};
pub use log::{LogFilters, LogRepository, NewLogLine, QueryOrder};
pub use stats::{CameraCounters, DailyCounter, OverviewCounters, StatsRepository};
