// [apps/coordinator/src/kernel.rs]
/**
 * =================================================================
 * APARATO: COORDINATOR SOVEREIGN KERNEL (V8.0 - GRACEFUL MASTER)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan el Store, los daemons de
 * mantenimiento y el transporte HTTP. La ignición verifica el enlace
 * con el Store ANTES de abrir el socket TCP.
 * =================================================================
 */

use crate::routes::create_router;
use crate::services::RetentionSweeper;
use crate::state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, instrument};

use vigil_infra_db::{DbError, StoreClient, StoreSettings};
use vigil_shared_config::SystemConfig;

pub struct CoordinatorKernel {
    pub application_state: AppState,
}

impl CoordinatorKernel {
    /**
     * Ignición del cliente del Store y del estado compartido.
     * Un fallo aquí significa storage inalcanzable (exit code 3).
     */
    #[instrument(skip(config))]
    pub async fn ignite(config: Arc<SystemConfig>) -> Result<Self, DbError> {
        let database_client = StoreClient::connect(StoreSettings {
            url: config.database.url.clone(),
            auth_token: config.database.auth_token.clone(),
            min_connections: config.database.min_connections,
            max_overflow: config.database.max_overflow,
            acquire_timeout: config.pool_acquire_timeout(),
        })
        .await?;

        Ok(Self {
            application_state: AppState::new(database_client, config),
        })
    }

    /**
     * Lanza los daemons de fondo y el servidor HTTP principal.
     * El apagado ordenado concede un periodo de gracia a las peticiones
     * en vuelo antes de soltar el socket.
     */
    pub async fn launch_operations(self) -> Result<(), std::io::Error> {
        let shared_application_state = self.application_state.clone();

        // --- 1. DAEMON DE RETENCIÓN DE LOGS ---
        RetentionSweeper::new(shared_application_state.clone()).spawn_sweeper_daemon();

        // --- 2. IGNICIÓN DEL TRANSPORTE HTTP (AXUM) ---
        let bind_address: SocketAddr = format!(
            "{}:{}",
            shared_application_state.config.http.bind_host,
            shared_application_state.config.http.bind_port
        )
        .parse()
        .map_err(|fault| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{fault}")))?;

        let sovereign_router = create_router(shared_application_state);

        info!("🚀 [KERNEL_ONLINE]: Coordination core listening at {}", bind_address);

        let tcp_listener = tokio::net::TcpListener::bind(bind_address).await?;

        let serve_outcome = axum::serve(tcp_listener, sovereign_router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Err(server_error) = serve_outcome {
            error!("💀 [KERNEL_COLLAPSE]: Runtime failure: {}", server_error);
            return Err(server_error);
        }

        info!("🏁 [KERNEL]: Graceful shutdown concluded.");
        Ok(())
    }
}

/// Señal de apagado ordenado: SIGINT o SIGTERM del host de despliegue.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(signal_fault) => {
                error!("⚠️ [SIGNAL]: SIGTERM hook rejected: {}", signal_fault);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }

    info!("⚠️ [SIGNAL]: Termination requested by host. Draining in-flight requests...");
}
