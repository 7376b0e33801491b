// [apps/coordinator/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: COORDINATOR SHARED STATE (V4.0 - SINGLE SOURCE)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ESTADO COMPARTIDO INYECTADO EN TODOS LOS HANDLERS
 *
 * El único estado mutable compartido del sistema es el Store; este
 * aparato sólo transporta el cliente del pool y el registro inmutable
 * de configuración hacia los extractores de Axum.
 * =================================================================
 */

use std::sync::Arc;

use vigil_infra_db::StoreClient;
use vigil_shared_config::SystemConfig;

#[derive(Clone)]
pub struct AppState {
    pub database_client: StoreClient,
    pub config: Arc<SystemConfig>,
}

impl AppState {
    pub fn new(database_client: StoreClient, config: Arc<SystemConfig>) -> Self {
        Self { database_client, config }
    }
}
