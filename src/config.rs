//! Process configuration.
//!
//! Loaded from a JSON file named by `--config` or the `COMPACTION_CONFIG`
//! environment variable. Without either, built-in defaults apply and the
//! size-range strategy has no tiers to match.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::SizeRangeRule;
use crate::error::{CompactionError, Result};

pub const CONFIG_ENV: &str = "COMPACTION_CONFIG";
pub const DEFAULT_APP_NAME: &str = "spark-compaction";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub spark: SparkConfig,
    #[serde(default)]
    pub compaction: CompactionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactionConfig {
    /// Ordered size-range tiers. Order matters: the last matching tier wins.
    #[serde(default)]
    pub size_ranges_for_compaction: Vec<SizeRangeRule>,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self { app_name: default_app_name() }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| CompactionError::fs(path, e))?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(path = %path.display(), tiers = config.tiers().len(), "loaded configuration");
        Ok(config)
    }

    /// `--config` first, then `COMPACTION_CONFIG`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(&PathBuf::from(path));
        }
        Ok(Self::default())
    }

    pub fn tiers(&self) -> &[SizeRangeRule] {
        &self.compaction.size_ranges_for_compaction
    }

    pub fn validate(&self) -> Result<()> {
        for (i, tier) in self.tiers().iter().enumerate() {
            if tier.min_gb < 0.0 || tier.max_gb < 0.0 {
                return Err(CompactionError::Config(format!(
                    "size range {} has a negative bound ({} - {} GB)",
                    i, tier.min_gb, tier.max_gb
                )));
            }
            if !(tier.target_size_mb > 0.0) {
                return Err(CompactionError::Config(format!(
                    "size range {} must target a positive size, got {} MB",
                    i, tier.target_size_mb
                )));
            }
        }
        Ok(())
    }
}
