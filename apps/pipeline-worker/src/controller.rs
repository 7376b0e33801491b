// [apps/pipeline-worker/src/controller.rs]
/*!
 * =================================================================
 * APARATO: WORKER PROCESS CONTROLLER (V4.1 - OPS SURFACE)
 * CLASIFICACIÓN: OPERATIONAL CLI (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: START / STOP / STATUS / TAIL DE WORKERS NOMBRADOS
 *
 * # Logic:
 * Cada worker nombrado gobierna un proceso desacoplado con pidfile y
 * logfile bajo '{artifact_root}/.runtime/'. El controlador jamás toca
 * el Store: sólo señales POSIX y ficheros de operación.
 * =================================================================
 */

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use vigil_shared_config::SystemConfig;

/// Subdirectorio de operación bajo la raíz de artefactos.
const RUNTIME_DIRECTORY: &str = ".runtime";

pub struct WorkerController<'config> {
    config: &'config SystemConfig,
}

impl<'config> WorkerController<'config> {
    pub fn new(config: &'config SystemConfig) -> Self {
        Self { config }
    }

    fn runtime_directory(&self) -> PathBuf {
        self.config.artifacts.root.join(RUNTIME_DIRECTORY)
    }

    fn pidfile_path(&self, worker_name: &str) -> PathBuf {
        self.runtime_directory().join(format!("{worker_name}.pid"))
    }

    fn logfile_path(&self, worker_name: &str) -> PathBuf {
        self.runtime_directory().join(format!("{worker_name}.log"))
    }

    /**
     * Lanza un worker nombrado como proceso desacoplado.
     *
     * # Errors:
     * Rechaza si ya existe una instancia viva del mismo worker.
     */
    pub fn start(&self, worker_name: &str) -> Result<()> {
        if let Some(existing_pid) = self.read_live_pid(worker_name) {
            bail!("worker '{worker_name}' already running with pid {existing_pid}");
        }

        let runtime_directory = self.runtime_directory();
        fs::create_dir_all(&runtime_directory)
            .with_context(|| format!("unable to claim runtime directory {runtime_directory:?}"))?;

        let logfile = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.logfile_path(worker_name))
            .context("unable to open worker logfile")?;
        let logfile_for_stderr = logfile.try_clone().context("unable to clone logfile handle")?;

        let own_binary = std::env::current_exe().context("unable to resolve own binary path")?;

        let child = Command::new(own_binary)
            .args(["run", "--worker", worker_name])
            .stdin(Stdio::null())
            .stdout(Stdio::from(logfile))
            .stderr(Stdio::from(logfile_for_stderr))
            .spawn()
            .context("worker process ignition rejected")?;

        fs::write(self.pidfile_path(worker_name), child.id().to_string())
            .context("unable to seal pidfile")?;

        println!("STARTED worker '{worker_name}' (pid {}).", child.id());
        Ok(())
    }

    /// Apagado ordenado vía SIGTERM; el worker sella su iteración en curso.
    pub fn stop(&self, worker_name: &str) -> Result<()> {
        let Some(pid) = self.read_live_pid(worker_name) else {
            bail!("worker '{worker_name}' is not running");
        };

        let termination = Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status()
            .context("unable to dispatch SIGTERM")?;

        if !termination.success() {
            bail!("SIGTERM dispatch rejected for pid {pid}");
        }

        fs::remove_file(self.pidfile_path(worker_name)).ok();
        println!("STOPPED worker '{worker_name}' (pid {pid}).");
        Ok(())
    }

    /// Estado de los tres workers nombrados.
    pub fn status(&self, worker_names: &[&str]) -> Result<()> {
        for worker_name in worker_names {
            match self.read_live_pid(worker_name) {
                Some(pid) => println!("{worker_name:<10} RUNNING (pid {pid})"),
                None => println!("{worker_name:<10} STOPPED"),
            }
        }
        Ok(())
    }

    /// Últimas N líneas del logfile del worker.
    pub fn tail(&self, worker_name: &str, line_count: usize) -> Result<()> {
        let logfile_path = self.logfile_path(worker_name);
        let content = fs::read_to_string(&logfile_path)
            .with_context(|| format!("no logfile at {logfile_path:?}"))?;

        let all_lines: Vec<&str> = content.lines().collect();
        let tail_start = all_lines.len().saturating_sub(line_count);
        for line in &all_lines[tail_start..] {
            println!("{line}");
        }
        Ok(())
    }

    /// PID del worker si su proceso sigue vivo; limpia pidfiles huérfanos.
    fn read_live_pid(&self, worker_name: &str) -> Option<u32> {
        let pidfile = self.pidfile_path(worker_name);
        let pid: u32 = fs::read_to_string(&pidfile).ok()?.trim().parse().ok()?;

        if PathBuf::from(format!("/proc/{pid}")).exists() {
            Some(pid)
        } else {
            fs::remove_file(&pidfile).ok();
            None
        }
    }
}
