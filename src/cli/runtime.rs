use std::path::PathBuf;

use anyhow::{Context, Result};
use feedreply_annotator::AnnotatorConfig;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const API_BASE_ENV: &str = "FEEDREPLY_API_BASE";
pub const DEBOUNCE_ENV: &str = "FEEDREPLY_DEBOUNCE_MS";

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: AnnotatorConfig,
    pub path: PathBuf,
}

/// `--config`, else `./config/feedreply.yaml`, else the user config dir.
/// A missing file means defaults; an unreadable or malformed one is an error.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            let local_config = PathBuf::from("config/feedreply.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("feedreply");
                path.push("config.yaml");
                path
            }
        }
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AnnotatorConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: AnnotatorConfig::default(),
            path: config_path,
        })
    }
}

/// Environment wins over the file. `lookup` is `std::env::var` in the binary.
pub fn apply_env_overrides<F>(config: &mut AnnotatorConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = lookup(API_BASE_ENV).filter(|value| !value.trim().is_empty()) {
        info!(base = %base, "Using generation service from {API_BASE_ENV}");
        config.generation.base_url = base.trim().to_string();
    }
    if let Some(raw) = lookup(DEBOUNCE_ENV) {
        config.debounce_ms = raw
            .trim()
            .parse()
            .with_context(|| format!("{DEBOUNCE_ENV} must be a number of milliseconds, got {raw:?}"))?;
    }
    Ok(())
}
