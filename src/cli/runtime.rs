use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{default_config_path, AppConfig};

/// Seed process environment from `config/local.env` without clobbering
/// variables the user already exported.
pub fn load_local_env_overrides() {
    let path = Path::new("config/local.env");
    if !path.exists() {
        return;
    }

    match stdfs::read_to_string(path) {
        Ok(contents) => {
            for (idx, raw_line) in contents.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    warn!(line = idx + 1, "invalid local.env entry; skipping");
                    continue;
                };
                let key = key.trim();
                if key.is_empty() || env::var(key).is_ok() {
                    continue;
                }
                env::set_var(key, unescape_value(value.trim()));
            }
            info!(path = %path.display(), "Loaded environment overrides from local.env");
        }
        Err(err) => {
            warn!(path = %path.display(), ?err, "failed to read local.env overrides");
        }
    }
}

/// Console logging, plus a daily rotated file when `log_dir` is given.
/// The returned guard keeps the file writer flushing; hold it for the
/// process lifetime.
pub fn init_logging(level: &str, debug: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match log_dir {
        Some(dir) => {
            stdfs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("pagepilot")
                .filename_suffix("log")
                .build(dir)
                .context("failed to open log file")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
}

/// Load the config file, falling back to defaults when it does not exist,
/// then layer `PAGEPILOT_*` environment overrides on top.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let path = config_path.cloned().unwrap_or_else(default_config_path);

    let mut config = if path.exists() {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", path.display());
        config
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
        AppConfig::default()
    };

    config.apply_env_overrides();
    Ok(LoadedConfig { config, path })
}

fn unescape_value(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
    } else {
        value.to_string()
    }
}
