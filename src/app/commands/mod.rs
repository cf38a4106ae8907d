use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::app::adb::devices::ensure_device_connected;
use crate::app::adb::locator::{resolve_adb_program, sdk_roots_from_env, validate_adb_program};
use crate::app::adb::runner::{AdbRunner, CommandRunner};
use crate::app::cancel::CancelToken;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::models::{CheckReport, CommandResponse, DumpExportResult};
use crate::app::uiauto::checker::TextPresenceChecker;
use crate::app::uiauto::export::DumpExporter;
use crate::app::uiauto::resolver::PathResolver;
use crate::app::uiauto::ProbeSettings;

pub const DEFAULT_OUTPUT_DIR: &str = "./ui_dumps";

/// Per-invocation overrides for how the bridge is reached. `None` falls back to config.
#[derive(Debug, Clone, Default)]
pub struct BridgeOptions {
    pub adb_path: Option<String>,
    pub serial: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckTextRequest {
    pub pattern: String,
    pub max_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub bridge: BridgeOptions,
    pub trace_id: Option<String>,
}

fn resolve_trace_id(input: Option<String>) -> String {
    input
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn ensure_non_empty(value: &str, field: &str, trace_id: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(
            format!("{field} is required"),
            trace_id,
        ));
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn requested_serial(config: &AppConfig, bridge: &BridgeOptions) -> Option<String> {
    non_empty(bridge.serial.as_deref()).or_else(|| non_empty(Some(&config.adb.serial)))
}

fn get_adb_program(config: &AppConfig, bridge: &BridgeOptions, trace_id: &str) -> Result<String, AppError> {
    let command_path = non_empty(bridge.adb_path.as_deref()).unwrap_or_else(|| config.adb.command_path.clone());
    let program = resolve_adb_program(&command_path, &sdk_roots_from_env());
    if let Err(message) = validate_adb_program(&program) {
        warn!(trace_id = %trace_id, error = %message, "adb validation failed");
        return Err(AppError::validation(message, trace_id));
    }
    Ok(program)
}

/// Resolves the bridge, checks a usable device is attached, and returns a runner bound
/// to that device. Fails with `ERR_NO_DEVICE` before any device-side work starts.
pub fn connect(config: &AppConfig, bridge: &BridgeOptions, trace_id: &str) -> Result<AdbRunner, AppError> {
    let program = get_adb_program(config, bridge, trace_id)?;
    let runner = AdbRunner::new(program).with_timeout(config.adb.command_timeout());
    let requested = requested_serial(config, bridge);
    let device = ensure_device_connected(&runner, requested.as_deref(), trace_id)?;
    let runner = runner.with_serial(Some(device.serial));
    info!(trace_id = %trace_id, program = %runner.program(), serial = runner.serial().unwrap_or_default(), "bridge ready");
    Ok(runner)
}

fn probe_settings(config: &AppConfig, settle_delay_ms: Option<u64>) -> ProbeSettings {
    let settings = ProbeSettings::from_config(config);
    match settle_delay_ms {
        Some(ms) => settings.with_settle_delay(Duration::from_millis(ms)),
        None => settings,
    }
}

pub fn check_text(
    request: CheckTextRequest,
    config: &AppConfig,
    cancel: &CancelToken,
) -> Result<CommandResponse<CheckReport>, AppError> {
    let trace_id = resolve_trace_id(request.trace_id);
    ensure_non_empty(&request.pattern, "pattern", &trace_id)?;
    let max_attempts = request.max_attempts.unwrap_or(config.retry.max_attempts);
    let delay_ms = request.delay_ms.unwrap_or(config.retry.delay_ms);
    info!(trace_id = %trace_id, pattern = %request.pattern, max_attempts, delay_ms, "check_text");

    let runner = connect(config, &request.bridge, &trace_id)?;
    let settings = probe_settings(config, request.settle_delay_ms);
    let report = check_text_inner(
        &runner,
        &settings,
        &request.pattern,
        max_attempts,
        delay_ms,
        cancel,
        &trace_id,
    )?;
    Ok(CommandResponse {
        trace_id,
        data: report,
    })
}

pub fn check_text_inner(
    runner: &dyn CommandRunner,
    settings: &ProbeSettings,
    pattern: &str,
    max_attempts: u32,
    delay_ms: u64,
    cancel: &CancelToken,
    trace_id: &str,
) -> Result<CheckReport, AppError> {
    TextPresenceChecker::new(runner, settings, cancel.clone())
        .check_with_retry_detailed(pattern, max_attempts, delay_ms, trace_id)
}

pub fn find_writable_path(
    config: &AppConfig,
    bridge: &BridgeOptions,
    trace_id: Option<String>,
) -> Result<CommandResponse<String>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    info!(trace_id = %trace_id, "find_writable_path");
    let runner = connect(config, bridge, &trace_id)?;
    let settings = ProbeSettings::from_config(config);
    let root = PathResolver::new(&runner, &settings.candidate_roots).find_writable_path(&trace_id)?;
    Ok(CommandResponse {
        trace_id,
        data: root,
    })
}

fn resolve_output_dir(requested: Option<String>, config: &AppConfig) -> PathBuf {
    non_empty(requested.as_deref())
        .or_else(|| non_empty(Some(&config.output_path)))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

pub fn export_ui_dump(
    config: &AppConfig,
    bridge: &BridgeOptions,
    output_dir: Option<String>,
    trace_id: Option<String>,
) -> Result<CommandResponse<DumpExportResult>, AppError> {
    let trace_id = resolve_trace_id(trace_id);
    let output_dir = resolve_output_dir(output_dir, config);
    info!(trace_id = %trace_id, output_dir = %output_dir.display(), "export_ui_dump");
    let runner = connect(config, bridge, &trace_id)?;
    let settings = ProbeSettings::from_config(config);
    let result = DumpExporter::new(&runner, &settings).export(&output_dir, &trace_id)?;
    Ok(CommandResponse {
        trace_id,
        data: result,
    })
}

#[cfg(test)]
mod tests;
