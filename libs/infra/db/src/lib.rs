// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: STORE INFRASTRUCTURE ROOT (V8.0 - COORDINATION LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: FUENTE ÚNICA DE VERDAD DEL NÚCLEO DE COORDINACIÓN
 *
 * El Store es el único estado mutable compartido del sistema: los
 * workers coordinan exclusivamente a través de sus primitivos de claim
 * condicional; ningún candado en proceso participa en la exclusión.
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::{PooledConnection, StoreClient, StoreSettings};
pub use errors::DbError;
