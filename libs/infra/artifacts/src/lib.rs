// [libs/infra/artifacts/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ARTIFACT VAULT (V5.2 - SHARED STORAGE CONTRACT)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: DISPOSICIÓN DE RUTAS Y GUARDIAS DE QUIESCENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. RELATIVE CANON: Toda ruta persistida en el Ledger es relativa a la
 *    raíz configurada; la resolución veta prefijos absolutos y '..'.
 * 2. QUIESCENCE SHIELD: Un artefacto sólo se considera escrito por
 *    completo cuando su mtime supera la ventana configurada; cubre la
 *    carrera entre el flip de bandera en DB y la llegada del fichero.
 * 3. SINGLE WRITER: El vault nunca escribe artefactos de cámara; sólo
 *    los workers de conversión/optimización producen ficheros nuevos.
 * =================================================================
 */

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

use vigil_domain_models::time;
use chrono::{DateTime, Utc};

#[derive(Error, Debug)]
pub enum ArtifactError {
    /// La ruta viola el canon relativo (absoluta, '..' o separador inválido).
    #[error("[L3_VAULT_FAULT]: PATH_CANON_VIOLATION -> {0}")]
    PathViolation(String),

    /// Fallo físico del sistema de archivos compartido.
    #[error("[L3_VAULT_FAULT]: STORAGE_IO_FAULT -> {0}")]
    Io(#[from] std::io::Error),
}

/// Bóveda de artefactos anclada a la raíz del almacenamiento compartido.
#[derive(Debug, Clone)]
pub struct ArtifactVault {
    storage_root: PathBuf,
}

impl ArtifactVault {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self { storage_root: storage_root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.storage_root
    }

    /**
     * Resuelve una ruta relativa del Ledger hacia una ruta física.
     *
     * # Errors:
     * - `PathViolation`: prefijo absoluto, componente '..' o ruta vacía.
     */
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ArtifactError> {
        if relative.is_empty() {
            return Err(ArtifactError::PathViolation("empty path".into()));
        }
        let candidate = Path::new(relative);
        if candidate.is_absolute() {
            return Err(ArtifactError::PathViolation(format!("absolute path: {relative}")));
        }
        for component in candidate.components() {
            match component {
                Component::Normal(_) => {}
                Component::CurDir => {}
                other => {
                    return Err(ArtifactError::PathViolation(format!(
                        "forbidden component {other:?} in {relative}"
                    )));
                }
            }
        }
        Ok(self.storage_root.join(candidate))
    }

    /// Existencia física del artefacto referido por una ruta del Ledger.
    pub async fn exists(&self, relative: &str) -> Result<bool, ArtifactError> {
        let physical = self.resolve(relative)?;
        Ok(tokio::fs::try_exists(&physical).await?)
    }

    /**
     * Guardia de quiescencia: el artefacto existe y su última modificación
     * es anterior a la ventana. Un fichero aún en escritura por el uploader
     * reporta `false` y el worker libera su claim.
     */
    pub async fn is_quiescent(&self, relative: &str, window: Duration) -> Result<bool, ArtifactError> {
        let physical = self.resolve(relative)?;
        let metadata = match tokio::fs::metadata(&physical).await {
            Ok(metadata) => metadata,
            Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(fault) => return Err(ArtifactError::Io(fault)),
        };

        let modified = metadata.modified()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        Ok(age >= window)
    }

    /// Tamaño físico en bytes; `None` si el artefacto no existe.
    pub async fn size_bytes(&self, relative: &str) -> Result<Option<u64>, ArtifactError> {
        let physical = self.resolve(relative)?;
        match tokio::fs::metadata(&physical).await {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(fault) => Err(ArtifactError::Io(fault)),
        }
    }

    /// Borrado best-effort de un artefacto consumido (fuente H.264).
    pub async fn remove(&self, relative: &str) -> Result<(), ArtifactError> {
        let physical = self.resolve(relative)?;
        match tokio::fs::remove_file(&physical).await {
            Ok(()) => Ok(()),
            Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(fault) => Err(ArtifactError::Io(fault)),
        }
    }
}

/// Convenciones de nombrado sobre la raíz compartida (§ layout del despliegue).
pub mod layout {
    use super::*;

    /// Sello `YYYYMMDD_HHMMSS` derivado de la marca canónica del evento.
    pub fn filename_stamp(canonical_timestamp: &str) -> Option<String> {
        time::parse_rfc3339(canonical_timestamp)
            .map(|stamp: DateTime<Utc>| stamp.format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn picture_a(camera_id: &str, event_id: i64, stamp: &str) -> String {
        format!("{camera_id}/pictures/{event_id}_{stamp}_a.jpg")
    }

    pub fn picture_b(camera_id: &str, event_id: i64, stamp: &str) -> String {
        format!("{camera_id}/pictures/{event_id}_{stamp}_b.jpg")
    }

    pub fn thumbnail(camera_id: &str, event_id: i64, stamp: &str) -> String {
        format!("{camera_id}/thumbs/{event_id}_{stamp}_thumb.jpg")
    }

    pub fn video_h264(camera_id: &str, event_id: i64, stamp: &str) -> String {
        format!("{camera_id}/videos/{event_id}_{stamp}_video.h264")
    }

    pub fn video_mp4(camera_id: &str, event_id: i64, stamp: &str) -> String {
        format!("{camera_id}/videos/{event_id}_{stamp}_video.mp4")
    }

    /// Ruta MP4 hermana de una fuente H.264 (cambio de extensión).
    pub fn mp4_sibling(h264_relative: &str) -> String {
        match h264_relative.strip_suffix(".h264") {
            Some(stem) => format!("{stem}.mp4"),
            None => format!("{h264_relative}.mp4"),
        }
    }
}
