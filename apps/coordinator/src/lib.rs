// [apps/coordinator/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COORDINATOR LIBRARY ROOT (V4.0 - NOMINAL EXPOSURE)
 * CLASIFICACIÓN: APPLICATION LIBRARY (ESTRATO L1-APP)
 * RESPONSABILIDAD: EXPOSICIÓN DE MÓDULOS PARA BINARIO Y PROVING GROUNDS
 * =================================================================
 */

pub mod errors;
pub mod handlers;
pub mod kernel;
pub mod routes;
pub mod services;
pub mod state;

pub mod prelude {
    pub use crate::kernel::CoordinatorKernel;
    pub use crate::state::AppState;
}
