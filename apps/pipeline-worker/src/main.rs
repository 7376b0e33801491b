// [apps/pipeline-worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE WORKER SHELL (V7.0 - ZENITH SHELL)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO, CONTROL DE PROCESOS E IGNICIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ARCHITECTURAL PURITY: La lógica de misiones vive en 'PipelineEngine';
 *    este shell es un switchboard puro de configuración y señales.
 * 2. EXIT CODE CONTRACT: 0 éxito, 1 fallo no manejado, 2 configuración
 *    inválida, 3 storage inalcanzable en el arranque.
 * 3. SIGNAL SHIELD: Arc<AtomicBool> propaga la terminación ordenada a
 *    todos los estratos sin condiciones de carrera.
 * =================================================================
 */

use clap::{Parser, Subcommand, ValueEnum};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use vigil_pipeline_worker::controller::WorkerController;
use vigil_pipeline_worker::{EngineError, PipelineEngine, WorkerSelection};
use vigil_shared_config::SystemConfig;
use vigil_shared_watchtower::init_tracing;

const EXIT_MISCONFIGURATION: i32 = 2;
const EXIT_STORAGE_UNREACHABLE: i32 = 3;

/// Workers nombrados de la superficie operacional.
const NAMED_WORKERS: [&str; 4] = ["convert", "optimize", "analyze", "all"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WorkerKind {
    Convert,
    Optimize,
    Analyze,
    All,
}

impl WorkerKind {
    fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Convert => "convert",
            WorkerKind::Optimize => "optimize",
            WorkerKind::Analyze => "analyze",
            WorkerKind::All => "all",
        }
    }

    fn selection(&self) -> WorkerSelection {
        match self {
            WorkerKind::Convert => WorkerSelection::Convert,
            WorkerKind::Optimize => WorkerSelection::Optimize,
            WorkerKind::Analyze => WorkerSelection::Analyze,
            WorkerKind::All => WorkerSelection::All,
        }
    }
}

/**
 * Directivas de mando del nodo de pipeline.
 */
#[derive(Parser, Debug)]
#[command(
    name = "pipeline-worker",
    about = "Vigil Pipeline Worker // Conversion, Optimization & Analysis strata"
)]
struct PipelineDirectives {
    #[command(subcommand)]
    command: ControlCommand,
}

#[derive(Subcommand, Debug)]
enum ControlCommand {
    /// Ejecuta los workers seleccionados en primer plano.
    Run {
        #[arg(long, value_enum, default_value = "all")]
        worker: WorkerKind,
    },
    /// Lanza un worker nombrado como proceso desacoplado.
    Start {
        #[arg(value_enum)]
        worker: WorkerKind,
    },
    /// Apagado ordenado de un worker nombrado (SIGTERM).
    Stop {
        #[arg(value_enum)]
        worker: WorkerKind,
    },
    /// Estado de todos los workers nombrados.
    Status,
    /// Últimas líneas del logfile de un worker.
    Tail {
        #[arg(value_enum)]
        worker: WorkerKind,
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
}

fn main() {
    let directives = PipelineDirectives::parse();

    // 1. HIDRATACIÓN DEL REGISTRO DE CONFIGURACIÓN INMUTABLE
    let config = match SystemConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(config_fault) => {
            eprintln!("CONFIGURATION_FAULT: {config_fault}");
            std::process::exit(EXIT_MISCONFIGURATION);
        }
    };

    let exit_code = match directives.command {
        ControlCommand::Run { worker } => run_foreground(config, worker),
        ControlCommand::Start { worker } => {
            dispatch_controller(|controller| controller.start(worker.as_str()), &config)
        }
        ControlCommand::Stop { worker } => {
            dispatch_controller(|controller| controller.stop(worker.as_str()), &config)
        }
        ControlCommand::Status => {
            dispatch_controller(|controller| controller.status(&NAMED_WORKERS), &config)
        }
        ControlCommand::Tail { worker, lines } => {
            dispatch_controller(|controller| controller.tail(worker.as_str(), lines), &config)
        }
    };

    std::process::exit(exit_code);
}

fn dispatch_controller<F>(operation: F, config: &SystemConfig) -> i32
where
    F: FnOnce(&WorkerController) -> anyhow::Result<()>,
{
    let controller = WorkerController::new(config);
    match operation(&controller) {
        Ok(()) => 0,
        Err(controller_fault) => {
            eprintln!("CONTROLLER_FAULT: {controller_fault:#}");
            1
        }
    }
}

fn run_foreground(config: Arc<SystemConfig>, worker: WorkerKind) -> i32 {
    // 2. INICIALIZACIÓN DE OBSERVABILIDAD (WATCHTOWER)
    init_tracing("vigil_pipeline_worker");

    // 3. CONSTRUCCIÓN DEL RUNTIME SOBERANO
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(runtime_fault) => {
            error!("💀 [SHELL]: Runtime ignition collapsed: {}", runtime_fault);
            return 1;
        }
    };

    runtime.block_on(async {
        info!("💠 [SHELL]: Pipeline ignition sequence starting ({}).", worker.as_str());

        // 4. PROTOCOLO DE SEÑALES DE SISTEMA (Terminación Ordenada)
        let termination_signal = Arc::new(AtomicBool::new(false));
        spawn_signal_listener(Arc::clone(&termination_signal));

        // 5. IGNICIÓN DEL MOTOR DEL PIPELINE
        let engine = PipelineEngine::new(config, termination_signal);
        match engine.ignite(worker.selection()).await {
            Ok(()) => {
                info!("🏁 [SHELL]: Shutdown sequence concluded. Pipeline node offline.");
                0
            }
            Err(EngineError::Store(store_fault)) => {
                error!("❌ [IGNITION_FAILED]: Store unreachable: {}", store_fault);
                EXIT_STORAGE_UNREACHABLE
            }
            Err(engine_fault) => {
                error!("💀 [SHELL]: Engine collapsed: {}", engine_fault);
                1
            }
        }
    })
}

/// SIGINT/SIGTERM -> señal atómica; los workers sellan su iteración en curso.
fn spawn_signal_listener(termination_signal: Arc<AtomicBool>) {
    let interrupt_flag = Arc::clone(&termination_signal);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ [SIGNAL]: Interrupt requested by host. Sealing current strata...");
            interrupt_flag.store(true, Ordering::SeqCst);
        }
    });

    #[cfg(unix)]
    {
        let terminate_flag = termination_signal;
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    warn!("⚠️ [SIGNAL]: Termination requested by host. Sealing current strata...");
                    terminate_flag.store(true, Ordering::SeqCst);
                }
                Err(signal_fault) => {
                    error!("⚠️ [SIGNAL]: SIGTERM hook rejected: {}", signal_fault);
                }
            }
        });
    }
}
