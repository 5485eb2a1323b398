//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression for the orphan sweep.
    #[serde(default = "default_sweep_cron")]
    pub orphan_sweep_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            orphan_sweep_cron: default_sweep_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_cron() -> String {
    "0 */10 * * * *".to_string()
}
