// [apps/coordinator/src/main.rs]
/*!
 * =================================================================
 * APARATO: COORDINATOR MAIN ENTRY POINT (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EXIT CODE CONTRACT: 0 éxito, 1 fallo no manejado, 2 configuración
 *    inválida, 3 storage inalcanzable en el arranque.
 * 2. ORDERED IGNITION: Configuración -> observabilidad -> Store -> HTTP;
 *    el socket TCP jamás se abre con un Store muerto.
 * =================================================================
 */

use std::sync::Arc;

use vigil_coordinator::prelude::*;
use vigil_shared_config::SystemConfig;
use vigil_shared_watchtower::init_tracing;

use tracing::{error, info};

const EXIT_MISCONFIGURATION: i32 = 2;
const EXIT_STORAGE_UNREACHABLE: i32 = 3;

fn main() {
    // 1. HIDRATACIÓN DEL REGISTRO DE CONFIGURACIÓN INMUTABLE
    let config = match SystemConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(config_fault) => {
            eprintln!("CONFIGURATION_FAULT: {config_fault}");
            std::process::exit(EXIT_MISCONFIGURATION);
        }
    };

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD (WATCHTOWER)
    init_tracing("vigil_coordinator");

    // 3. CONSTRUCCIÓN DEL RUNTIME SOBERANO
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(runtime_fault) => {
            error!("💀 [SHELL]: Runtime ignition collapsed: {}", runtime_fault);
            std::process::exit(1);
        }
    };

    let exit_code = runtime.block_on(async {
        info!("🛰️ [COORDINATOR]: Global ignition sequence starting...");

        // 4. IGNICIÓN DEL KERNEL (Store primero, socket después)
        let kernel_instance = match CoordinatorKernel::ignite(Arc::clone(&config)).await {
            Ok(kernel) => kernel,
            Err(store_fault) => {
                error!("❌ [IGNITION_FAILED]: Store unreachable: {}", store_fault);
                return EXIT_STORAGE_UNREACHABLE;
            }
        };

        // 5. OPERACIONES: daemons + transporte HTTP con apagado ordenado
        match kernel_instance.launch_operations().await {
            Ok(()) => 0,
            Err(server_fault) => {
                error!("💀 [SHELL]: Server collapsed: {}", server_fault);
                1
            }
        }
    });

    std::process::exit(exit_code);
}
