// [apps/coordinator/src/services/retention.rs]
/*!
 * =================================================================
 * APARATO: LOG RETENTION SWEEPER (V2.0 - HOURLY PRUNE)
 * CLASIFICACIÓN: BACKGROUND SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: PODA PERIÓDICA DEL LEDGER DE LOGS
 *
 * La poda sólo se activa cuando la política de retención está
 * configurada; sin política, el Ledger es estrictamente append-only.
 * =================================================================
 */

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use vigil_domain_models::time;
use vigil_infra_db::repositories::LogRepository;

use crate::state::AppState;

/// Cadencia nominal del barrido de retención.
const SWEEP_INTERVAL_SECONDS: u64 = 3600;

pub struct RetentionSweeper {
    application_state: AppState,
}

impl RetentionSweeper {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    /// Lanza el daemon de poda; no-op si no hay política configurada.
    pub fn spawn_sweeper_daemon(self) {
        let Some(max_days) = self.application_state.config.retention.max_days else {
            info!("🧹 [RETENTION]: No policy configured; ledger remains append-only.");
            return;
        };

        info!("🧹 [RETENTION]: Hourly sweep active (max {} day(s)).", max_days);

        tokio::spawn(async move {
            let mut sweep_ticker = interval(Duration::from_secs(SWEEP_INTERVAL_SECONDS));

            loop {
                sweep_ticker.tick().await;

                let cutoff_stamp =
                    time::to_canonical(Utc::now() - ChronoDuration::days(i64::from(max_days)));

                let log_repository =
                    LogRepository::new(self.application_state.database_client.clone());

                if let Err(sweep_fault) = log_repository.prune_older_than(&cutoff_stamp).await {
                    error!("⚠️ [RETENTION]: Sweep rejected: {}", sweep_fault);
                }
            }
        });
    }
}
