// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS ROOT (V5.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE ENTIDADES DE PERSISTENCIA
 *
 * Las formas de transporte HTTP viven en 'vigil-domain-contracts';
 * este estrato contiene exclusivamente los registros propiedad del Store
 * y las máquinas de estado que gobiernan su evolución.
 * =================================================================
 */

pub mod camera;
pub mod event;
pub mod log;
pub mod time;

mod tests_state_machine;
