// [libs/infra/media/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MEDIA TRANSCODER ADAPTER (V5.1 - FFMPEG UPLINK)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: REMUX, OPTIMIZACIÓN Y SONDEO DE DURACIÓN DE VÍDEO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TRAIT SEAM: 'MediaTranscoder' es la costura de sustitución del
 *    pipeline; los tests inyectan implementaciones sintéticas sin
 *    requerir binarios de ffmpeg en el entorno de certificación.
 * 2. KILL ON DROP: Todo proceso hijo se arma con 'kill_on_drop'; el
 *    vencimiento del presupuesto por evento aborta la transcodificación
 *    sin huérfanos.
 * 3. FAST START: El remux reubica el átomo 'moov' al frente para
 *    streaming progresivo en el visor.
 * =================================================================
 */

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

#[derive(Error, Debug)]
pub enum MediaError {
    /// El binario del transcodificador no pudo lanzarse.
    #[error("[L3_MEDIA_FAULT]: TRANSCODER_SPAWN_FAILURE -> {0}")]
    Spawn(String),

    /// El transcodificador terminó con código distinto de cero.
    #[error("[L3_MEDIA_FAULT]: TRANSCODE_REJECTED -> {0}")]
    Transcode(String),

    /// Presupuesto por evento agotado; el proceso hijo fue abatido.
    #[error("[L3_MEDIA_FAULT]: TRANSCODE_TIMEOUT")]
    Timeout,

    /// Fallo físico de I/O sobre el almacenamiento compartido.
    #[error("[L3_MEDIA_FAULT]: MEDIA_IO_FAULT -> {0}")]
    Io(#[from] std::io::Error),
}

/// Costura de transcodificación del pipeline de conversión/optimización.
pub trait MediaTranscoder: Send + Sync {
    /// Re-empaqueta un elemental H.264 en un contenedor MP4 con fast-start.
    fn remux_to_mp4(
        &self,
        input: &Path,
        output: &Path,
        budget: Duration,
    ) -> impl Future<Output = Result<(), MediaError>> + Send;

    /// Re-codifica un MP4 hacia un perfil de menor tamaño.
    fn optimize_mp4(
        &self,
        input: &Path,
        output: &Path,
        budget: Duration,
    ) -> impl Future<Output = Result<(), MediaError>> + Send;

    /// Duración en segundos del contenedor resultante; `None` si no es sondeable.
    fn probe_duration_seconds(
        &self,
        input: &Path,
    ) -> impl Future<Output = Result<Option<f64>, MediaError>> + Send;
}

/// Implementación de producción sobre los binarios ffmpeg/ffprobe del host.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    /// Cuadros por segundo asumidos para el elemental H.264 de cámara.
    pub assumed_framerate: u32,
    /// Factor de calidad CRF del perfil de optimización.
    pub optimization_crf: u32,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self { assumed_framerate: 30, optimization_crf: 28 }
    }
}

impl FfmpegTranscoder {
    #[instrument(skip(self, command))]
    async fn run_bounded(&self, mut command: Command, budget: Duration) -> Result<(), MediaError> {
        command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
        command.kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|fault| MediaError::Spawn(fault.to_string()))?;

        let outcome = tokio::time::timeout(budget, child.wait_with_output()).await;

        match outcome {
            Err(_elapsed) => {
                warn!("⏱️ [TRANSCODER]: Budget exceeded; child process terminated.");
                Err(MediaError::Timeout)
            }
            Ok(Err(io_fault)) => Err(MediaError::Io(io_fault)),
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => {
                let stderr_tail = String::from_utf8_lossy(&output.stderr);
                Err(MediaError::Transcode(stderr_tail.trim().chars().take(512).collect()))
            }
        }
    }
}

impl MediaTranscoder for FfmpegTranscoder {
    fn remux_to_mp4(
        &self,
        input: &Path,
        output: &Path,
        budget: Duration,
    ) -> impl Future<Output = Result<(), MediaError>> + Send {
        let mut command = Command::new("ffmpeg");
        command
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(["-fflags", "+genpts"])
            .args(["-framerate", &self.assumed_framerate.to_string()])
            .arg("-i")
            .arg(input)
            .args(["-c:v", "copy"])
            .args(["-movflags", "+faststart"])
            .arg(output);

        debug!("🎞️ [TRANSCODER]: Remuxing {:?} -> {:?}", input, output);
        self.run_bounded(command, budget)
    }

    fn optimize_mp4(
        &self,
        input: &Path,
        output: &Path,
        budget: Duration,
    ) -> impl Future<Output = Result<(), MediaError>> + Send {
        let mut command = Command::new("ffmpeg");
        command
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .arg("-i")
            .arg(input)
            .args(["-c:v", "libx264"])
            .args(["-preset", "veryfast"])
            .args(["-crf", &self.optimization_crf.to_string()])
            .args(["-an", "-sn"])
            .args(["-movflags", "+faststart"])
            .arg(output);

        debug!("🗜️ [TRANSCODER]: Optimizing {:?} -> {:?}", input, output);
        self.run_bounded(command, budget)
    }

    fn probe_duration_seconds(
        &self,
        input: &Path,
    ) -> impl Future<Output = Result<Option<f64>, MediaError>> + Send {
        let input = input.to_path_buf();
        async move {
            let probe_output = Command::new("ffprobe")
                .args(["-v", "error"])
                .args(["-show_entries", "format=duration"])
                .args(["-of", "default=noprint_wrappers=1:nokey=1"])
                .arg(&input)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .output()
                .await
                .map_err(|fault| MediaError::Spawn(fault.to_string()))?;

            if !probe_output.status.success() {
                return Ok(None);
            }

            let duration = String::from_utf8_lossy(&probe_output.stdout)
                .trim()
                .parse::<f64>()
                .ok();
            Ok(duration)
        }
    }
}
