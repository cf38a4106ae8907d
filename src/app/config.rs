use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::adb::paths::{
    default_candidate_roots, normalize_candidate_roots, validate_artifact_name,
    DEFAULT_ARTIFACT_NAME,
};
use crate::app::error::AppError;
use crate::app::uiauto::checker::{DEFAULT_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

pub const CONFIG_PATH_ENV: &str = "UIPROBE_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdbSettings {
    pub command_path: String,
    pub serial: String,
    pub command_timeout_sec: u64,
}

impl Default for AdbSettings {
    fn default() -> Self {
        Self {
            command_path: String::new(),
            serial: String::new(),
            command_timeout_sec: 10,
        }
    }
}

impl AdbSettings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_sec)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceSettings {
    pub candidate_roots: Vec<String>,
    pub artifact_name: String,
    pub service_processes: Vec<String>,
}

pub fn default_service_processes() -> Vec<String> {
    vec![
        "com.android.commands.uiautomator".to_string(),
        "com.github.uiautomator".to_string(),
    ]
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            candidate_roots: default_candidate_roots(),
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            service_processes: default_service_processes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
            settle_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub adb: AdbSettings,
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub output_path: String,
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".uiprobe_config.json")
}

pub fn load_config_from_path(path: &Path, trace_id: &str) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::system(
            format!("Failed to read config {}: {err}", path.display()),
            trace_id,
        )
    })?;
    let config: AppConfig = serde_json::from_str(&raw).map_err(|err| {
        AppError::validation(
            format!("Failed to parse config {}: {err}", path.display()),
            trace_id,
        )
    })?;
    Ok(validate_config(config))
}

pub fn save_config_to_path(config: &AppConfig, path: &Path, trace_id: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let payload = serde_json::to_string_pretty(config)
        .map_err(|err| AppError::system(format!("Failed to serialize config: {err}"), trace_id))?;
    fs::write(path, payload)
        .map_err(|err| AppError::system(format!("Failed to write config: {err}"), trace_id))?;
    Ok(())
}

pub fn validate_config(mut config: AppConfig) -> AppConfig {
    let defaults = AppConfig::default();
    if config.adb.command_timeout_sec == 0 {
        config.adb.command_timeout_sec = defaults.adb.command_timeout_sec;
    }
    config.device.candidate_roots = normalize_candidate_roots(&config.device.candidate_roots);
    if validate_artifact_name(&config.device.artifact_name).is_err() {
        config.device.artifact_name = defaults.device.artifact_name;
    } else {
        config.device.artifact_name = config.device.artifact_name.trim().to_string();
    }
    config.device.service_processes.retain(|name| {
        let name = name.trim();
        !name.is_empty() && !name.chars().any(char::is_whitespace)
    });
    if config.device.service_processes.is_empty() {
        config.device.service_processes = defaults.device.service_processes;
    }
    if config.retry.max_attempts == 0 {
        config.retry.max_attempts = defaults.retry.max_attempts;
    }
    if config.logging.log_level.trim().is_empty() {
        config.logging.log_level = defaults.logging.log_level;
    }
    config
}
