// [libs/shared/config/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN CONFIGURATION RECORD (V6.2 - IMMUTABLE CORE)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: HIDRATACIÓN Y VALIDACIÓN DEL ENTORNO OPERATIVO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. IMMUTABLE RECORD: La configuración se construye una sola vez en el
 *    arranque y se inyecta a los constructores. Cero globals mutables.
 * 2. FIELD TRIAGE: Cada variable malformada se reporta con su nombre
 *    nominal exacto para diagnóstico inmediato (exit code 2).
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta en secciones
 *    de red, pool, artefactos y pipeline.
 * =================================================================
 */

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Variable obligatoria ausente del entorno del proceso.
    #[error("[L4_CONFIG_FAULT]: REQUIRED_VARIABLE_VOID -> {0}")]
    MissingVariable(String),

    /// Variable presente pero sintácticamente inválida.
    #[error("[L4_CONFIG_FAULT]: VARIABLE_MALFORMED -> {variable}: {reason}")]
    MalformedVariable { variable: String, reason: String },

    /// Valor fuera del rango operativo permitido.
    #[error("[L4_CONFIG_FAULT]: VARIABLE_OUT_OF_RANGE -> {variable}: {reason}")]
    OutOfRange { variable: String, reason: String },
}

/// Credenciales y límites del sustrato de persistencia (libSQL).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// DSN del motor: `file:...` local o `libsql://...` remoto.
    pub url: String,
    /// Token de acceso para enlaces remotos.
    pub auth_token: Option<String>,
    /// Conexiones pre-abiertas al arranque.
    pub min_connections: usize,
    /// Conexiones adicionales permitidas bajo ráfaga.
    pub max_overflow: usize,
    /// Espera máxima de checkout antes de reportar `Unavailable`.
    pub acquire_timeout_seconds: f64,
}

/// Superficie de red del Coordinator.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind_host: String,
    pub bind_port: u16,
    /// Orígenes CORS permitidos; `*` habilita cualquier origen.
    pub allowed_origins: Vec<String>,
    pub request_timeout_seconds: f64,
    /// Presupuesto del sondeo de salud contra el Store.
    pub health_probe_timeout_seconds: f64,
}

/// Raíz del almacenamiento compartido de artefactos.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub root: PathBuf,
}

/// Cadencias y presupuestos de los tres workers del pipeline.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Máximo de eventos reclamados por iteración.
    pub batch_size: usize,
    /// Edad mínima de un artefacto antes de confiar en él (ventana de quiescencia).
    pub quiescence_seconds: u64,
    /// Edad a partir de la cual un claim se considera robable.
    pub reclaim_horizon_seconds: u64,
    /// Pausa entre iteraciones sin trabajo disponible.
    pub poll_idle_seconds: f64,
    /// Presupuesto de transformación por evento.
    pub per_event_timeout_seconds: u64,
    /// Endpoint raíz del host de modelos de visión/texto.
    pub ai_endpoint_url: String,
    /// Modelo de visión (señales de objetos/personas).
    pub ai_vision_model: String,
    /// Modelo de texto (frase corta + descripción).
    pub ai_text_model: String,
    /// Reintentos de red permitidos dentro de una iteración antes del latch de error.
    pub ai_retry_budget: u32,
    /// Presupuesto por llamada individual al host de modelos.
    pub ai_call_timeout_seconds: u64,
}

/// Política opcional de retención del pipeline de logs.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Antigüedad máxima de una línea de log; `None` desactiva la poda.
    pub max_days: Option<u32>,
}

/// Registro inmutable maestro del ecosistema.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub artifacts: ArtifactConfig,
    pub workers: WorkerConfig,
    pub retention: RetentionConfig,
}

impl SystemConfig {
    /**
     * Hidrata el registro completo desde el entorno del proceso.
     *
     * Invoca `dotenvy` para incorporar `.env` si existe; las variables ya
     * presentes en el entorno tienen precedencia.
     *
     * # Errors:
     * - `MissingVariable`: `VIGIL_DATABASE_URL` ausente.
     * - `MalformedVariable` / `OutOfRange`: valores no parseables o absurdos.
     */
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: require_text("VIGIL_DATABASE_URL")?,
            auth_token: optional_text("VIGIL_DATABASE_AUTH_TOKEN"),
            min_connections: parse_or("VIGIL_POOL_MIN_CONNECTIONS", 2)?,
            max_overflow: parse_or("VIGIL_POOL_MAX_OVERFLOW", 8)?,
            acquire_timeout_seconds: parse_or("VIGIL_POOL_ACQUIRE_TIMEOUT_SECONDS", 5.0)?,
        };

        if database.min_connections == 0 {
            return Err(ConfigError::OutOfRange {
                variable: "VIGIL_POOL_MIN_CONNECTIONS".into(),
                reason: "must be at least 1".into(),
            });
        }

        let http = HttpConfig {
            bind_host: text_or("VIGIL_HTTP_BIND_HOST", "0.0.0.0"),
            bind_port: parse_or("VIGIL_HTTP_BIND_PORT", 8400u16)?,
            allowed_origins: text_or("VIGIL_HTTP_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            request_timeout_seconds: parse_or("VIGIL_HTTP_REQUEST_TIMEOUT_SECONDS", 30.0)?,
            health_probe_timeout_seconds: parse_or("VIGIL_HEALTH_PROBE_TIMEOUT_SECONDS", 2.0)?,
        };

        let artifacts = ArtifactConfig {
            root: PathBuf::from(text_or("VIGIL_ARTIFACT_ROOT", "/mnt/vigil-storage")),
        };

        let workers = WorkerConfig {
            batch_size: parse_or("VIGIL_WORKER_BATCH_SIZE", 4)?,
            quiescence_seconds: parse_or("VIGIL_WORKER_QUIESCENCE_SECONDS", 10)?,
            reclaim_horizon_seconds: parse_or("VIGIL_WORKER_RECLAIM_HORIZON_SECONDS", 600)?,
            poll_idle_seconds: parse_or("VIGIL_WORKER_POLL_IDLE_SECONDS", 5.0)?,
            per_event_timeout_seconds: parse_or("VIGIL_WORKER_PER_EVENT_TIMEOUT_SECONDS", 300)?,
            ai_endpoint_url: text_or("VIGIL_AI_ENDPOINT_URL", "http://127.0.0.1:11434"),
            ai_vision_model: text_or("VIGIL_AI_VISION_MODEL", "llava"),
            ai_text_model: text_or("VIGIL_AI_TEXT_MODEL", "llama3"),
            ai_retry_budget: parse_or("VIGIL_AI_RETRY_BUDGET", 3)?,
            ai_call_timeout_seconds: parse_or("VIGIL_AI_CALL_TIMEOUT_SECONDS", 120)?,
        };

        if workers.batch_size == 0 {
            return Err(ConfigError::OutOfRange {
                variable: "VIGIL_WORKER_BATCH_SIZE".into(),
                reason: "must be at least 1".into(),
            });
        }

        let retention = RetentionConfig {
            max_days: optional_text("VIGIL_LOG_RETENTION_MAX_DAYS")
                .map(|raw| raw.parse::<u32>().map_err(|parse_fault| ConfigError::MalformedVariable {
                    variable: "VIGIL_LOG_RETENTION_MAX_DAYS".into(),
                    reason: parse_fault.to_string(),
                }))
                .transpose()?,
        };

        Ok(Self { database, http, artifacts, workers, retention })
    }

    /// Espera de checkout del pool como `Duration`.
    pub fn pool_acquire_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.database.acquire_timeout_seconds)
    }

    /// Presupuesto de una petición HTTP completa.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http.request_timeout_seconds)
    }

    /// Presupuesto del sondeo de salud.
    pub fn health_probe_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http.health_probe_timeout_seconds)
    }

    /// Pausa entre iteraciones ociosas de un worker.
    pub fn poll_idle_interval(&self) -> Duration {
        Duration::from_secs_f64(self.workers.poll_idle_seconds)
    }
}

// --- HELPERS DE HIDRATACIÓN NOMINAL ---

fn require_text(variable: &str) -> Result<String, ConfigError> {
    std::env::var(variable)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(variable.to_string()))
}

fn optional_text(variable: &str) -> Option<String> {
    std::env::var(variable).ok().filter(|value| !value.trim().is_empty())
}

fn text_or(variable: &str, default_value: &str) -> String {
    optional_text(variable).unwrap_or_else(|| default_value.to_string())
}

fn parse_or<T: std::str::FromStr>(variable: &str, default_value: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional_text(variable) {
        None => Ok(default_value),
        Some(raw_value) => raw_value.parse::<T>().map_err(|parse_fault| {
            ConfigError::MalformedVariable {
                variable: variable.to_string(),
                reason: parse_fault.to_string(),
            }
        }),
    }
}
