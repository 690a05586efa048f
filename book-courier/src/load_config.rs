//! `load_config` module: builds the immutable [`AppConfig`] from defaults, an optional YAML
//! file and the environment.
//!
//! # Precedence (lowest to highest)
//! 1. Built-in defaults from [`book_courier_core::config`] and [`crate::telegram`]
//! 2. The YAML file passed with `--config`, if any
//! 3. Environment variables (a `.env` file is loaded by `main`)
//!
//! The bot token is a secret and is only ever read from `TELEGRAM_BOT_TOKEN`;
//! the YAML file has no field for it.
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use book_courier_core::config::CourierConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::telegram::{TelegramConfig, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHANNEL_ID: &str = "TELEGRAM_CHANNEL_ID";
pub const ENV_API_BASE: &str = "TELEGRAM_API_BASE";
pub const ENV_INBOX: &str = "BOOKS_FOLDER";
pub const ENV_ARCHIVE: &str = "PUBLISHED_FOLDER";
pub const ENV_LEDGER: &str = "PUBLISHED_LOG";
pub const ENV_SEND_DELAY: &str = "DELAY_SECONDS";
pub const ENV_IDLE_INTERVAL: &str = "IDLE_INTERVAL_SECONDS";
pub const ENV_BACKOFF_INTERVAL: &str = "BACKOFF_INTERVAL_SECONDS";

/// Everything the binary needs, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub courier: CourierConfig,
    pub telegram: TelegramConfig,
}

/// YAML-side schema. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub inbox_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub ledger_path: Option<PathBuf>,
    pub send_delay_secs: Option<u64>,
    pub idle_interval_secs: Option<u64>,
    pub backoff_interval_secs: Option<u64>,
    #[serde(default)]
    pub telegram: TelegramSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramSection {
    pub chat_id: Option<String>,
    pub api_base: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Parse a YAML config file.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid config with every key defaulted.
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Load the full application config: defaults, then `path` (if given), then environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let file = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using defaults and environment");
            FileConfig::default()
        }
    };

    let defaults = CourierConfig::default();
    let courier = CourierConfig {
        inbox_dir: env_path(ENV_INBOX)
            .or(file.inbox_dir)
            .unwrap_or(defaults.inbox_dir),
        archive_dir: env_path(ENV_ARCHIVE)
            .or(file.archive_dir)
            .unwrap_or(defaults.archive_dir),
        ledger_path: env_path(ENV_LEDGER)
            .or(file.ledger_path)
            .unwrap_or(defaults.ledger_path),
        send_delay: seconds(ENV_SEND_DELAY, file.send_delay_secs)?
            .unwrap_or(defaults.send_delay),
        idle_interval: seconds(ENV_IDLE_INTERVAL, file.idle_interval_secs)?
            .unwrap_or(defaults.idle_interval),
        backoff_interval: seconds(ENV_BACKOFF_INTERVAL, file.backoff_interval_secs)?
            .unwrap_or(defaults.backoff_interval),
    };

    let bot_token = env_string(ENV_BOT_TOKEN).with_context(|| {
        error!("{ENV_BOT_TOKEN} environment variable not set");
        format!("{ENV_BOT_TOKEN} environment variable not set")
    })?;
    info!("{ENV_BOT_TOKEN} found in env");

    let chat_id = env_string(ENV_CHANNEL_ID)
        .or(file.telegram.chat_id)
        .with_context(|| {
            error!("No Telegram channel configured");
            format!("{ENV_CHANNEL_ID} not set and telegram.chat_id missing from config")
        })?;

    let telegram = TelegramConfig {
        bot_token,
        chat_id,
        api_base: env_string(ENV_API_BASE)
            .or(file.telegram.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        request_timeout: file
            .telegram
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
    };

    courier.trace_loaded();
    info!(chat_id = %telegram.chat_id, "Config loaded and merged successfully");

    Ok(AppConfig { courier, telegram })
}

/// Non-empty environment variable.
fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}

/// Seconds from the environment, falling back to the file value.
fn seconds(name: &str, from_file: Option<u64>) -> Result<Option<Duration>> {
    let from_env = match env_string(name) {
        Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
            error!(error = ?e, var = name, raw = %raw, "Invalid number of seconds");
            anyhow::anyhow!("{name} must be a whole number of seconds, got {raw:?}: {e}")
        })?),
        None => None,
    };
    Ok(from_env.or(from_file).map(Duration::from_secs))
}
