use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub audio_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    // Audio model
    pub model_url: Option<String>,
    pub model_name: Option<String>,
    pub model_timeout_sec: Option<u64>,

    // Generation limits
    pub max_duration_sec: Option<u32>,
    pub fallback_sample_rate: Option<u32>,

    // Retention
    pub audio_retention_days: Option<u64>,
    pub prune_interval_hours: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
