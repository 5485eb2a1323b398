//! File lifecycle coordinator settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Upper bound for every individual object-store call.
    #[serde(default = "default_timeout")]
    pub object_store_timeout_seconds: u64,
    /// Marker prepended to the name of a copied file.
    #[serde(default = "default_copy_prefix")]
    pub copy_prefix: String,
    /// Highest ` (n)` suffix tried before a copy is rejected as a conflict.
    #[serde(default = "default_max_copy_suffix")]
    pub max_copy_suffix: u32,
    /// Ledger entries handled per orphan sweep.
    #[serde(default = "default_sweep_batch")]
    pub sweep_batch_size: u32,
}

impl CoordinatorConfig {
    /// The object-store timeout as a [`Duration`].
    pub fn object_store_timeout(&self) -> Duration {
        Duration::from_secs(self.object_store_timeout_seconds)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            object_store_timeout_seconds: default_timeout(),
            copy_prefix: default_copy_prefix(),
            max_copy_suffix: default_max_copy_suffix(),
            sweep_batch_size: default_sweep_batch(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_copy_prefix() -> String {
    "c".to_string()
}

fn default_max_copy_suffix() -> u32 {
    100
}

fn default_sweep_batch() -> u32 {
    100
}
