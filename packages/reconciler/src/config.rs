use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "arbor.config.json";

/// Renderer configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
    /// Timer delay in milliseconds when frame alignment is off
    pub batch_delay: u64,

    /// Most patches drained per batch
    pub max_batch_size: usize,

    /// Align drains to frame callbacks instead of a timer
    #[serde(rename = "useRAF")]
    pub use_raf: bool,

    /// Optimize large batches on a background thread
    pub use_worker: bool,

    /// Diff `render` calls against the previous tree instead of replacing it
    #[serde(rename = "useVirtualDOM")]
    pub use_virtual_dom: bool,

    /// Smallest batch handed to the worker
    pub worker_threshold: usize,

    /// How long `flush` waits on the worker, in milliseconds
    pub worker_timeout: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            batch_delay: 16,
            max_batch_size: 100,
            use_raf: true,
            use_worker: false,
            use_virtual_dom: false,
            worker_threshold: 50,
            worker_timeout: 1000,
        }
    }
}

impl RendererConfig {
    /// Load a config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RendererConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "maxBatchSize",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay)
    }

    pub fn worker_timeout(&self) -> Duration {
        Duration::from_millis(self.worker_timeout)
    }
}
