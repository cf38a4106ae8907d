use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use uiprobe_lib::app::commands::{export_ui_dump, BridgeOptions};
use uiprobe_lib::app::config::{config_path, load_config_from_path};
use uiprobe_lib::app::logging::init_logging;

/// Export the current UI hierarchy plus window and activity state from a device.
#[derive(Debug, Parser)]
#[command(name = "ui_dump", version)]
struct Args {
    /// Host directory for the exported files (defaults to config output_path or ./ui_dumps)
    out_dir: Option<String>,

    /// Device serial
    #[arg(long, env = "ANDROID_SERIAL")]
    serial: Option<String>,

    /// Path to the adb executable
    #[arg(long = "adb")]
    adb_path: Option<String>,

    /// Config file (defaults to $UIPROBE_CONFIG_PATH or ~/.uiprobe_config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the export result as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let path = args.config.clone().unwrap_or_else(config_path);
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
        adb_path: args.adb_path,
        serial: args.serial,
    };
    let response = match export_ui_dump(&config, &bridge, args.out_dir, None) {
        Ok(response) => response,
        Err(err) => {
            error!(trace_id = %err.trace_id, code = %err.code, error = %err.error, "ui dump failed");
            eprintln!("Check that developer options are enabled, then try `adb kill-server && adb start-server`.");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&response) {
            Ok(body) => println!("{body}"),
            Err(err) => {
                error!(error = %err, "failed to serialize export result");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("UI dump saved to {}:", response.data.output_dir);
        for file in response.data.files() {
            println!("- {file}");
        }
    }
    ExitCode::SUCCESS
}
