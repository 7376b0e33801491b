// [libs/infra/db/src/repositories/camera.rs]
/*!
 * =================================================================
 * APARATO: CAMERA REPOSITORY (V5.2 - REGISTRY AUTHORITY)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: DIRECTORIO DE CÁMARAS CON UPSERT IDEMPOTENTE
 *
 * # Logic:
 * El registro es un upsert por identificador estable: en colisión de
 * unicidad se actualizan los campos mutables (last-write-wins) y se
 * devuelve el mismo registro canónico. El borrado arrastra los eventos
 * de la cámara vía FK con ON DELETE CASCADE.
 * =================================================================
 */

use libsql::{params, Row};
use tracing::{info, instrument};

use vigil_domain_models::camera::{CameraRecord, CameraStatus};
use vigil_domain_models::time;

use crate::client::StoreClient;
use crate::errors::DbError;

const CAMERA_COLUMNS: &str = "\
id, camera_id, display_name, location, network_address, status, \
created_at, updated_at, last_heartbeat_at";

const UPSERT_CAMERA: &str = "\
INSERT INTO cameras (camera_id, display_name, location, network_address, status, created_at, updated_at) \
VALUES (?1, ?2, ?3, ?4, 'online', ?5, ?5) \
ON CONFLICT(camera_id) DO UPDATE SET \
    display_name = excluded.display_name, \
    location = excluded.location, \
    network_address = excluded.network_address, \
    updated_at = excluded.updated_at \
RETURNING ";

const UPDATE_HEARTBEAT: &str = "\
UPDATE cameras SET status = ?2, last_heartbeat_at = ?3, updated_at = ?3 WHERE camera_id = ?1";

pub struct CameraRepository {
    database_client: StoreClient,
}

impl CameraRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /**
     * Upsert idempotente por identificador estable.
     * Registrar dos veces con campos idénticos devuelve el mismo registro
     * sin fila adicional.
     */
    #[instrument(skip(self, display_name, location, network_address))]
    pub async fn register(
        &self,
        camera_id: &str,
        display_name: &str,
        location: Option<&str>,
        network_address: Option<&str>,
    ) -> Result<CameraRecord, DbError> {
        let connection = self.database_client.acquire().await?;
        let upsert_sql = format!("{UPSERT_CAMERA}{CAMERA_COLUMNS}");

        let mut upserted_rows = connection
            .query(
                &upsert_sql,
                params![
                    camera_id,
                    display_name,
                    opt_text(location),
                    opt_text(network_address),
                    time::now_canonical(),
                ],
            )
            .await
            .map_err(DbError::from_engine)?;

        let row = upserted_rows.next().await?.ok_or(DbError::NotFound)?;
        let record = map_camera_row(&row)?;

        info!("📷 [REGISTRY]: Unit [{}] levelized in the directory.", camera_id);
        Ok(record)
    }

    /// Directorio completo, ordenado por identificador estable.
    pub async fn list(&self) -> Result<Vec<CameraRecord>, DbError> {
        let connection = self.database_client.acquire().await?;
        let list_sql = format!("SELECT {CAMERA_COLUMNS} FROM cameras ORDER BY camera_id");

        let mut directory_rows = connection.query(&list_sql, ()).await?;
        let mut cameras = Vec::new();
        while let Some(row) = directory_rows.next().await? {
            cameras.push(map_camera_row(&row)?);
        }
        Ok(cameras)
    }

    pub async fn get(&self, camera_id: &str) -> Result<CameraRecord, DbError> {
        let connection = self.database_client.acquire().await?;
        let select_sql = format!("SELECT {CAMERA_COLUMNS} FROM cameras WHERE camera_id = ?1");

        let mut result_rows = connection.query(&select_sql, params![camera_id]).await?;
        let row = result_rows.next().await?.ok_or(DbError::NotFound)?;
        map_camera_row(&row)
    }

    /// Latido consultivo: sella estado de red y marca de último contacto.
    #[instrument(skip(self))]
    pub async fn heartbeat(&self, camera_id: &str, status: CameraStatus) -> Result<CameraRecord, DbError> {
        let connection = self.database_client.acquire().await?;
        let rows_affected = connection
            .execute(
                UPDATE_HEARTBEAT,
                params![camera_id, status.as_str(), time::now_canonical()],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        drop(connection);
        self.get(camera_id).await
    }

    /// Baja de cámara; el cascade del esquema arrastra sus eventos.
    #[instrument(skip(self))]
    pub async fn delete(&self, camera_id: &str) -> Result<(), DbError> {
        let connection = self.database_client.acquire().await?;
        let rows_affected = connection
            .execute("DELETE FROM cameras WHERE camera_id = ?1", params![camera_id])
            .await?;

        if rows_affected == 0 {
            return Err(DbError::NotFound);
        }

        info!("🗑️ [REGISTRY]: Unit [{}] and its cascaded events removed.", camera_id);
        Ok(())
    }
}

fn opt_text(value: Option<&str>) -> libsql::Value {
    match value {
        Some(text) => libsql::Value::Text(text.to_string()),
        None => libsql::Value::Null,
    }
}

fn map_camera_row(row: &Row) -> Result<CameraRecord, DbError> {
    let status_raw: String = row.get(5)?;
    let status = CameraStatus::parse(&status_raw)
        .ok_or_else(|| DbError::Mapping(format!("unknown camera status '{status_raw}'")))?;

    Ok(CameraRecord {
        id: row.get(0)?,
        camera_id: row.get(1)?,
        display_name: row.get(2)?,
        location: row.get::<String>(3).ok(),
        network_address: row.get::<String>(4).ok(),
        status,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        last_heartbeat_at: row.get::<String>(8).ok(),
    })
}
