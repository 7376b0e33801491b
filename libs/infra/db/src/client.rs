// [libs/infra/db/src/client.rs]
/*!
 * =================================================================
 * APARATO: STORE CONNECTION CLIENT (V8.4 - BOUNDED POOL)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: POOLING ACOTADO Y PERSISTENCIA ACID
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BOUNDED CHECKOUT: Pool con mínimo pre-abierto y desborde acotado;
 *    el checkout que supera la espera configurada reporta 'Unavailable'
 *    para que el llamador reintente con backoff.
 * 2. CASCADE INTEGRITY: Cada conexión habilita 'PRAGMA foreign_keys'
 *    para que el borrado de cámaras arrastre sus eventos.
 * 3. MEMORY ANCHOR: En modo RAM se retiene una conexión ancla que
 *    impide la purga del esquema entre hilos de test.
 *
 * # Mathematical Proof (Checkout Bound):
 * Sea P = min_connections + max_overflow el número de permisos del
 * semáforo. Como toda conexión prestada retiene exactamente un permiso
 * hasta su devolución, el número de conexiones simultáneas jamás
 * excede P, y la espera de checkout está acotada por el timeout.
 * =================================================================
 */

use crate::errors::DbError;
use crate::schema::apply_full_schema;
use libsql::{Builder, Connection, Database};
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{error, info, instrument};

/// Parámetros de ignición del cliente del Store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub url: String,
    pub auth_token: Option<String>,
    pub min_connections: usize,
    pub max_overflow: usize,
    pub acquire_timeout: Duration,
}

struct PoolCore {
    database: Database,
    idle_connections: Mutex<VecDeque<Connection>>,
    checkout_permits: Arc<Semaphore>,
    acquire_timeout: Duration,
    /// Mantiene la base en RAM viva evitando que SQLite la purgue.
    _memory_persistence_anchor: Option<Connection>,
}

/// Cliente compartido del Store; clonable y seguro entre tareas.
#[derive(Clone)]
pub struct StoreClient {
    pool: Arc<PoolCore>,
}

/// Conexión prestada; al soltarse regresa al pool y libera su permiso.
pub struct PooledConnection {
    connection: Option<Connection>,
    pool: Arc<PoolCore>,
    _checkout_permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.connection.as_ref().expect("INVARIANT: connection present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Ok(mut idle_guard) = self.pool.idle_connections.lock() {
                idle_guard.push_back(connection);
            }
        }
    }
}

impl StoreClient {
    /**
     * Ignición del cliente: abre el driver, aplica el esquema de forma
     * idempotente y pre-abre el mínimo de conexiones del pool.
     *
     * # Errors:
     * - `Connection`: URL vacía, token ausente para enlace remoto o
     *   colapso del driver durante el bootstrap.
     */
    #[instrument(skip(settings), fields(url = %settings.url))]
    pub async fn connect(settings: StoreSettings) -> Result<Self, DbError> {
        if settings.url.is_empty() {
            return Err(DbError::Connection("CRITICAL_FAULT: DATABASE_URL_UNDEFINED".into()));
        }

        info!("🔌 [STORE]: Initiating tactical link synchronization to [{}]", settings.url);

        let is_remote = settings.url.starts_with("libsql://") || settings.url.starts_with("https://");
        let is_memory = settings.url.contains(":memory:") || settings.url.contains("mode=memory");

        let database = if is_remote {
            let token = settings.auth_token.clone().ok_or_else(|| {
                DbError::Connection("SECURITY_FAULT: Remote access denied (Token missing)".into())
            })?;
            Builder::new_remote(settings.url.clone(), token).build().await
        } else {
            Builder::new_local(settings.url.as_str()).build().await
        }.map_err(|fault| DbError::Connection(format!("DRIVER_IGNITION_FAILURE: {fault}")))?;

        // Bootstrap del esquema sobre una conexión dedicada; en modo RAM esa
        // misma conexión queda anclada para preservar el segmento compartido.
        let bootstrap_connection = database.connect()
            .map_err(|fault| DbError::Connection(format!("BOOTSTRAP_LINK_FAULT: {fault}")))?;

        apply_full_schema(&bootstrap_connection).await
            .map_err(|fault| DbError::Connection(format!("SCHEMA_SYNC_FAULT: {fault}")))?;

        let anchor = if is_memory {
            info!("⚓ [STORE]: Memory strata solidified and anchored.");
            Some(bootstrap_connection)
        } else {
            None
        };

        let total_permits = settings.min_connections + settings.max_overflow;
        let pool = Arc::new(PoolCore {
            database,
            idle_connections: Mutex::new(VecDeque::with_capacity(total_permits)),
            checkout_permits: Arc::new(Semaphore::new(total_permits)),
            acquire_timeout: settings.acquire_timeout,
            _memory_persistence_anchor: anchor,
        });

        let client = Self { pool };

        // Pre-apertura del estrato mínimo del pool.
        for _ in 0..settings.min_connections {
            let connection = client.open_raw_connection().await?;
            client.pool.idle_connections.lock()
                .map_err(|_| DbError::Connection("POOL_LOCK_POISONED".into()))?
                .push_back(connection);
        }

        info!(
            "✅ [STORE]: Pool levelized ({} resident, {} overflow).",
            settings.min_connections, settings.max_overflow
        );

        Ok(client)
    }

    /**
     * Checkout acotado de una conexión del pool.
     *
     * # Errors:
     * - `Unavailable`: espera agotada con el pool saturado; reintentable.
     */
    pub async fn acquire(&self) -> Result<PooledConnection, DbError> {
        let permit = tokio::time::timeout(
            self.pool.acquire_timeout,
            Arc::clone(&self.pool.checkout_permits).acquire_owned(),
        )
        .await
        .map_err(|_| DbError::Unavailable("POOL_CHECKOUT_TIMEOUT".into()))?
        .map_err(|_| DbError::Unavailable("POOL_CLOSED".into()))?;

        let recycled = self.pool.idle_connections.lock()
            .map_err(|_| DbError::Unavailable("POOL_LOCK_POISONED".into()))?
            .pop_front();

        let connection = match recycled {
            Some(connection) => connection,
            None => self.open_raw_connection().await?,
        };

        Ok(PooledConnection {
            connection: Some(connection),
            pool: Arc::clone(&self.pool),
            _checkout_permit: permit,
        })
    }

    /// Sondeo trivial de salud del Store (usado por /health con timeout propio).
    pub async fn ping(&self) -> Result<(), DbError> {
        let connection = self.acquire().await?;
        let mut probe_rows = connection.query("SELECT 1", ()).await?;
        probe_rows.next().await?;
        Ok(())
    }

    async fn open_raw_connection(&self) -> Result<Connection, DbError> {
        let connection = self.pool.database.connect().map_err(|fault| {
            error!("⚠️ [POOL_FAULT]: Connection allocation failed: {fault}");
            DbError::Unavailable(fault.to_string())
        })?;

        // Integridad referencial por conexión: el cascade de cámaras depende de ella.
        connection.execute("PRAGMA foreign_keys = ON", ()).await?;

        Ok(connection)
    }
}
