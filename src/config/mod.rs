mod file_config;

pub use file_config::FileConfig;

use crate::generation::{DEFAULT_MAX_DURATION_SEC, DEFAULT_SAMPLE_RATE};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_MODEL_NAME: &str = "facebook/musicgen-small";

/// Upper bounds accepted for the numeric limits.
pub const MAX_DURATION_LIMIT_SEC: u32 = 600;
pub const MAX_RETENTION_DAYS: u64 = 36_500;
pub const MAX_PRUNE_INTERVAL_HOURS: u64 = 24 * 365;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub audio_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub model_url: Option<String>,
    pub model_name: String,
    pub model_timeout_sec: u64,
    pub max_duration_sec: u32,
    pub fallback_sample_rate: u32,
    pub audio_retention_days: u64,
    pub prune_interval_hours: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            audio_dir: None,
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::default(),
            model_url: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_timeout_sec: 300,
            max_duration_sec: DEFAULT_MAX_DURATION_SEC,
            fallback_sample_rate: DEFAULT_SAMPLE_RATE,
            audio_retention_days: 7,
            prune_interval_hours: 24,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub url: String,
    pub name: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// None when no model server is configured.
    pub model: Option<ModelSettings>,
    pub max_duration_sec: u32,
    pub fallback_sample_rate: u32,
    pub audio_retention_days: u64,
    pub prune_interval_hours: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let audio_dir = file
            .audio_dir
            .map(PathBuf::from)
            .or_else(|| cli.audio_dir.clone())
            .unwrap_or_else(|| db_dir.join("generated_audio"));

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let model = file
            .model_url
            .or_else(|| cli.model_url.clone())
            .filter(|url| !url.trim().is_empty())
            .map(|url| ModelSettings {
                url,
                name: file.model_name.unwrap_or_else(|| cli.model_name.clone()),
                timeout_sec: file.model_timeout_sec.unwrap_or(cli.model_timeout_sec),
            });

        let max_duration_sec = file.max_duration_sec.unwrap_or(cli.max_duration_sec);
        if max_duration_sec == 0 {
            bail!("max_duration_sec must be greater than zero");
        }
        if max_duration_sec > MAX_DURATION_LIMIT_SEC {
            bail!(
                "max_duration_sec must be at most {}, got {}",
                MAX_DURATION_LIMIT_SEC,
                max_duration_sec
            );
        }
        let fallback_sample_rate = file
            .fallback_sample_rate
            .unwrap_or(cli.fallback_sample_rate);
        if fallback_sample_rate == 0 {
            bail!("fallback_sample_rate must be greater than zero");
        }

        let audio_retention_days = file
            .audio_retention_days
            .unwrap_or(cli.audio_retention_days);
        if audio_retention_days > MAX_RETENTION_DAYS {
            bail!(
                "audio_retention_days must be at most {}, got {}",
                MAX_RETENTION_DAYS,
                audio_retention_days
            );
        }
        let prune_interval_hours = file
            .prune_interval_hours
            .unwrap_or(cli.prune_interval_hours);
        if prune_interval_hours > MAX_PRUNE_INTERVAL_HOURS {
            bail!(
                "prune_interval_hours must be at most {}, got {}",
                MAX_PRUNE_INTERVAL_HOURS,
                prune_interval_hours
            );
        }

        Ok(Self {
            db_dir,
            audio_dir,
            port,
            metrics_port,
            logging_level,
            model,
            max_duration_sec,
            fallback_sample_rate,
            audio_retention_days,
            prune_interval_hours,
        })
    }

    pub fn graph_db_path(&self) -> PathBuf {
        self.db_dir.join("graph.db")
    }

    pub fn creations_db_path(&self) -> PathBuf {
        self.db_dir.join("creations.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("verbose").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 5000,
            logging_level: RequestsLoggingLevel::Headers,
            model_url: Some("http://model:5002".to_string()),
            audio_retention_days: 3,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.audio_dir, temp_dir.path().join("generated_audio"));
        assert_eq!(config.port, 5000);
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        let model = config.model.clone().unwrap();
        assert_eq!(model.url, "http://model:5002");
        assert_eq!(model.name, DEFAULT_MODEL_NAME);
        assert_eq!(model.timeout_sec, 300);
        assert_eq!(config.max_duration_sec, 30);
        assert_eq!(config.fallback_sample_rate, 32000);
        assert_eq!(config.audio_retention_days, 3);
        assert_eq!(config.graph_db_path(), temp_dir.path().join("graph.db"));
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            audio_dir: Some(PathBuf::from("/cli/audio")),
            model_url: Some("http://cli-model".to_string()),
            ..Default::default()
        };

        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            audio_dir: Some("/toml/audio".to_string()),
            port: Some(4000),
            logging_level: Some("body".to_string()),
            model_url: Some("http://toml-model".to_string()),
            model_name: Some("musicgen-medium".to_string()),
            max_duration_sec: Some(15),
            prune_interval_hours: Some(6),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.audio_dir, PathBuf::from("/toml/audio"));
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        let model = config.model.clone().unwrap();
        assert_eq!(model.url, "http://toml-model");
        assert_eq!(model.name, "musicgen-medium");
        assert_eq!(config.max_duration_sec, 15);
        assert_eq!(config.prune_interval_hours, 6);
    }

    #[test]
    fn test_resolve_without_model_url() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            model_url: Some("  ".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(config.model.is_none());
    }

    #[test]
    fn test_resolve_missing_db_dir_error() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_dir_not_directory_error() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_resolve_rejects_zero_limits() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let file_config = FileConfig {
            max_duration_sec: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, Some(file_config)).is_err());
    }

    #[test]
    fn test_resolve_rejects_oversized_limits() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let file_config = FileConfig {
            max_duration_sec: Some(MAX_DURATION_LIMIT_SEC + 1),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("max_duration_sec"));

        let file_config = FileConfig {
            audio_retention_days: Some(u64::MAX),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("audio_retention_days"));

        let file_config = FileConfig {
            prune_interval_hours: Some(u64::MAX),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("prune_interval_hours"));

        let file_config = FileConfig {
            max_duration_sec: Some(MAX_DURATION_LIMIT_SEC),
            audio_retention_days: Some(MAX_RETENTION_DAYS),
            prune_interval_hours: Some(MAX_PRUNE_INTERVAL_HOURS),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, Some(file_config)).is_ok());
    }
}
