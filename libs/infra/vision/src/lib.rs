// [libs/infra/vision/src/lib.rs]
/*!
 * =================================================================
 * APARATO: VISION HOST UPLINK (V4.2 - DUAL MODEL SYNAPSE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: SEÑALES DE ESCENA Y NARRATIVA DESDE EL HOST DE MODELOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TRAIT SEAM: 'AnnotationBackend' es la costura de sustitución del
 *    worker de análisis; los tests inyectan backends sintéticos.
 * 2. DUAL CALL: Una llamada de visión (imágenes -> señales JSON) y una
 *    de texto (señales -> frase + descripción), ambas acotadas.
 * 3. DEFENSIVE PARSE: La respuesta del modelo se degrada con defaults
 *    ante campos ausentes; una respuesta malformada jamás colapsa el
 *    worker, sólo consume presupuesto de reintento.
 * =================================================================
 */

use base64::engine::general_purpose::STANDARD as base64_engine;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Tope duro de la frase corta persistida.
pub const MAX_PHRASE_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum VisionError {
    /// Fallo de red o timeout hacia el host de modelos; reintentable.
    #[error("[L3_VISION_FAULT]: MODEL_HOST_UNREACHABLE -> {0}")]
    Network(String),

    /// El host respondió con un estado HTTP de rechazo.
    #[error("[L3_VISION_FAULT]: MODEL_HOST_REJECTION -> HTTP_{0}")]
    Rejection(u16),

    /// La respuesta del modelo no pudo interpretarse.
    #[error("[L3_VISION_FAULT]: MODEL_RESPONSE_MALFORMED -> {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for VisionError {
    fn from(fault: reqwest::Error) -> Self {
        VisionError::Network(fault.to_string())
    }
}

/// Señales estructuradas extraídas del par de imágenes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSignals {
    pub person_detected: bool,
    /// Confianza del modelo de visión, convención fraccional `[0, 1]`.
    pub confidence: f64,
    /// Objetos detectados (payload estructurado serializado).
    pub objects: String,
}

/// Narrativa generada por el modelo de texto.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneNarrative {
    /// Frase corta (≤ 500 caracteres, truncada en frontera de carácter).
    pub phrase: String,
    pub description: String,
}

/// Costura de anotación del worker de análisis.
pub trait AnnotationBackend: Send + Sync {
    fn analyze_scene(
        &self,
        image_a: &[u8],
        image_b: &[u8],
    ) -> impl Future<Output = Result<SceneSignals, VisionError>> + Send;

    fn narrate_scene(
        &self,
        signals: &SceneSignals,
    ) -> impl Future<Output = Result<SceneNarrative, VisionError>> + Send;
}

// --- PROTOCOLO DE CABLE DEL HOST DE MODELOS ---

#[derive(Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateEnvelope {
    response: String,
}

#[derive(Deserialize, Default)]
struct VisionVerdict {
    #[serde(default)]
    person_detected: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    objects: Vec<String>,
}

#[derive(Deserialize, Default)]
struct NarrativeVerdict {
    #[serde(default)]
    phrase: String,
    #[serde(default)]
    description: String,
}

const VISION_PROMPT: &str = "\
You are a security camera analyst. Two frames of the same motion incident are \
attached, captured roughly four seconds apart. Respond with a single JSON object: \
{\"person_detected\": bool, \"confidence\": number in [0,1], \"objects\": [strings]}.";

const NARRATIVE_PROMPT_PREFIX: &str = "\
You are writing for a security event viewer. Given these detection signals, respond \
with a single JSON object {\"phrase\": string, \"description\": string}. The phrase \
must be one short sentence (under 500 characters); the description may be longer.\n\
Signals: ";

/// Cliente de producción hacia el host de modelos (protocolo /api/generate).
#[derive(Clone)]
pub struct VisionHostClient {
    http_session: Client,
    host_base_endpoint: String,
    vision_model: String,
    text_model: String,
}

impl VisionHostClient {
    /**
     * Inicializa el enlace con presupuesto por llamada.
     *
     * @param base_url Endpoint raíz del host de modelos.
     * @param call_timeout Presupuesto de una llamada individual.
     */
    pub fn new(
        base_url: String,
        vision_model: String,
        text_model: String,
        call_timeout: Duration,
    ) -> Result<Self, VisionError> {
        let http_session = Client::builder()
            .user_agent("Vigil-Analysis-Worker/0.4")
            .timeout(call_timeout)
            .build()
            .map_err(|fault| VisionError::Network(fault.to_string()))?;

        Ok(Self {
            http_session,
            host_base_endpoint: base_url.trim_end_matches('/').to_string(),
            vision_model,
            text_model,
        })
    }

    #[instrument(skip(self, payload))]
    async fn execute_generate(&self, payload: GeneratePayload<'_>) -> Result<String, VisionError> {
        let target_url = format!("{}/api/generate", self.host_base_endpoint);
        let network_response = self.http_session.post(&target_url).json(&payload).send().await?;

        let status = network_response.status();
        if !status.is_success() {
            return Err(VisionError::Rejection(status.as_u16()));
        }

        let envelope = network_response.json::<GenerateEnvelope>().await?;
        Ok(envelope.response)
    }
}

impl AnnotationBackend for VisionHostClient {
    fn analyze_scene(
        &self,
        image_a: &[u8],
        image_b: &[u8],
    ) -> impl Future<Output = Result<SceneSignals, VisionError>> + Send {
        let encoded_frames = vec![base64_engine.encode(image_a), base64_engine.encode(image_b)];

        async move {
            let raw_verdict = self
                .execute_generate(GeneratePayload {
                    model: &self.vision_model,
                    prompt: VISION_PROMPT,
                    images: Some(encoded_frames),
                    format: Some("json"),
                    stream: false,
                })
                .await?;

            let verdict: VisionVerdict = serde_json::from_str(&raw_verdict).map_err(|fault| {
                warn!("🧩 [VISION]: Non-JSON verdict from model host: {}", fault);
                VisionError::Malformed(fault.to_string())
            })?;

            debug!(
                "👁️ [VISION]: person={} confidence={:.2} objects={}",
                verdict.person_detected,
                verdict.confidence,
                verdict.objects.len()
            );

            Ok(SceneSignals {
                person_detected: verdict.person_detected,
                confidence: verdict.confidence.clamp(0.0, 1.0),
                objects: serde_json::to_string(&verdict.objects)
                    .unwrap_or_else(|_| "[]".to_string()),
            })
        }
    }

    fn narrate_scene(
        &self,
        signals: &SceneSignals,
    ) -> impl Future<Output = Result<SceneNarrative, VisionError>> + Send {
        let signal_context = serde_json::to_string(signals).unwrap_or_else(|_| "{}".to_string());

        async move {
            let narrative_prompt = format!("{NARRATIVE_PROMPT_PREFIX}{signal_context}");
            let raw_verdict = self
                .execute_generate(GeneratePayload {
                    model: &self.text_model,
                    prompt: &narrative_prompt,
                    images: None,
                    format: Some("json"),
                    stream: false,
                })
                .await?;

            let verdict: NarrativeVerdict = serde_json::from_str(&raw_verdict)
                .map_err(|fault| VisionError::Malformed(fault.to_string()))?;

            Ok(SceneNarrative {
                phrase: truncate_phrase(&verdict.phrase),
                description: verdict.description,
            })
        }
    }
}

/// Trunca en frontera de carácter para no partir un code point UTF-8.
fn truncate_phrase(raw: &str) -> String {
    if raw.chars().count() <= MAX_PHRASE_CHARS {
        return raw.to_string();
    }
    raw.chars().take(MAX_PHRASE_CHARS).collect()
}
