use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use uiprobe_lib::app::cancel::CancelToken;
use uiprobe_lib::app::commands::{check_text, find_writable_path, BridgeOptions, CheckTextRequest};
use uiprobe_lib::app::config::{config_path, load_config_from_path, save_config_to_path, AppConfig};
use uiprobe_lib::app::logging::init_logging;

/// Check whether text is currently shown on an Android device screen.
///
/// Exits 0 when the text is found, 1 when it is not or the device is unreachable.
#[derive(Debug, Parser)]
#[command(name = "uiprobe", version)]
struct Cli {
    /// Text to look for (case-insensitive)
    #[arg(required_unless_present_any = ["find_writable", "init_config"])]
    text: Option<String>,

    /// Number of attempts before giving up
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    attempts: Option<u32>,

    /// Delay between attempts in milliseconds
    delay_ms: Option<u64>,

    /// Device serial
    #[arg(long, env = "ANDROID_SERIAL")]
    serial: Option<String>,

    /// Path to the adb executable
    #[arg(long = "adb")]
    adb_path: Option<String>,

    /// Config file (defaults to $UIPROBE_CONFIG_PATH or ~/.uiprobe_config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wait after each service reset, in milliseconds
    #[arg(long = "settle-ms")]
    settle_ms: Option<u64>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Write the last captured hierarchy to this file
    #[arg(long = "save-dump")]
    save_dump: Option<PathBuf>,

    /// Only report the first writable candidate root
    #[arg(long = "find-writable")]
    find_writable: bool,

    /// Write a config file with default values and exit
    #[arg(long = "init-config")]
    init_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config_path);

    if cli.init_config {
        init_logging("info");
        return init_config(&path);
    }

    let config = match load_config_from_path(&path, "") {
        Ok(config) => config,
        Err(err) => {
            init_logging("info");
            error!(error = %err, "failed to load config");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging.log_level);

    let bridge = BridgeOptions {
        adb_path: cli.adb_path.clone(),
        serial: cli.serial.clone(),
    };

    if cli.find_writable {
        return match find_writable_path(&config, &bridge, None) {
            Ok(response) => {
                println!("{}", response.data);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!(trace_id = %err.trace_id, code = %err.code, error = %err.error, "no writable path");
                ExitCode::FAILURE
            }
        };
    }

    run_check(cli, bridge, &config)
}

#[cfg(unix)]
fn install_interrupt_handler(cancel: &CancelToken) {
    if let Err(err) = signal_hook::flag::register(signal_hook::consts::SIGINT, cancel.flag()) {
        warn!(error = %err, "failed to install Ctrl-C handler");
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler(_cancel: &CancelToken) {}

fn init_config(path: &Path) -> ExitCode {
    if path.exists() {
        warn!(path = %path.display(), "config already exists, leaving it untouched");
        return ExitCode::FAILURE;
    }
    match save_config_to_path(&AppConfig::default(), path, "") {
        Ok(()) => {
            info!(path = %path.display(), "config written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "failed to write config");
            ExitCode::FAILURE
        }
    }
}

fn run_check(cli: Cli, bridge: BridgeOptions, config: &AppConfig) -> ExitCode {
    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    let request = CheckTextRequest {
        pattern: cli.text.unwrap_or_default(),
        max_attempts: cli.attempts,
        delay_ms: cli.delay_ms,
        settle_delay_ms: cli.settle_ms,
        bridge,
        trace_id: None,
    };

    let response = match check_text(request, config, &cancel) {
        Ok(response) => response,
        Err(err) => {
            error!(trace_id = %err.trace_id, code = %err.code, error = %err.error, "check failed");
            return ExitCode::FAILURE;
        }
    };
    let report = &response.data;

    if let (Some(path), Some(snapshot)) = (&cli.save_dump, &report.snapshot) {
        match fs::write(path, snapshot) {
            Ok(()) => info!(trace_id = %response.trace_id, path = %path.display(), "snapshot saved"),
            Err(err) => warn!(trace_id = %response.trace_id, error = %err, "failed to save snapshot"),
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&response) {
            Ok(body) => println!("{body}"),
            Err(err) => warn!(error = %err, "failed to serialize report"),
        }
    } else if report.found {
        println!("found \"{}\" after {} attempt(s)", report.pattern, report.attempts);
    } else {
        println!(
            "\"{}\" not found after {} attempt(s){}",
            report.pattern,
            report.attempts,
            match report.capture_failures() {
                0 => String::new(),
                failures => format!(", {failures} capture failure(s)"),
            }
        );
    }

    if report.found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
