use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::app::adb::parse::looks_like_shell_error;
use crate::app::adb::paths::join_device_path;
use crate::app::adb::runner::{shell_args, CommandRunner};
use crate::app::error::AppError;
use crate::app::models::DumpExportResult;
use crate::app::uiauto::resolver::PathResolver;
use crate::app::uiauto::ProbeSettings;

/// Writes a timestamped hierarchy dump plus window and activity state to a host directory.
pub struct DumpExporter<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a ProbeSettings,
}

impl<'a> DumpExporter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a ProbeSettings) -> Self {
        Self { runner, settings }
    }

    pub fn export(&self, output_dir: &Path, trace_id: &str) -> Result<DumpExportResult, AppError> {
        fs::create_dir_all(output_dir).map_err(|err| {
            AppError::system(
                format!("Failed to create output dir {}: {err}", output_dir.display()),
                trace_id,
            )
        })?;

        let device_root =
            PathResolver::new(self.runner, &self.settings.candidate_roots).find_writable_path(trace_id)?;
        let base_name = format!("ui_dump_{}", Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ"));

        let remote = join_device_path(&device_root, &format!("{base_name}.xml"));
        let local_xml = output_dir.join(format!("{base_name}.xml"));
        self.capture_to(&remote, &local_xml, trace_id)?;

        let section = |suffix: &str, command: &[&str]| {
            self.write_dumpsys(&output_dir.join(format!("{base_name}_{suffix}.txt")), command, trace_id)
        };
        let windows = section("windows", &["dumpsys", "window", "windows"])?;
        let activities = section("activities", &["dumpsys", "activity", "activities"])?;
        let view_hierarchy = section("view_hierarchy", &["dumpsys", "activity", "top"])?;

        info!(trace_id = %trace_id, output_dir = %output_dir.display(), base = %base_name, "ui dump exported");
        Ok(DumpExportResult {
            device_root,
            output_dir: output_dir.to_string_lossy().to_string(),
            hierarchy_xml: local_xml.to_string_lossy().to_string(),
            windows,
            activities,
            view_hierarchy,
        })
    }

    fn write_dumpsys(&self, path: &Path, command: &[&str], trace_id: &str) -> Result<String, AppError> {
        let output = self.runner.run(&shell_args(command), trace_id)?;
        fs::write(path, output.stdout).map_err(|err| {
            AppError::system(format!("Failed to write {}: {err}", path.display()), trace_id)
        })?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Dump to an explicit device path, confirm it exists, pull it, then delete it.
    fn capture_to(&self, remote: &str, local: &Path, trace_id: &str) -> Result<(), AppError> {
        let output = self
            .runner
            .run(&shell_args(&["uiautomator", "dump", remote]), trace_id)?;
        info!(trace_id = %trace_id, output = %output.stdout, "dump triggered");

        let listed = self
            .runner
            .run(&shell_args(&["ls", remote]), trace_id)
            .map_err(|err| {
                AppError::artifact_not_found(format!("{remote} missing after dump: {}", err.error), trace_id)
            })?;
        if looks_like_shell_error(&listed.stdout) {
            return Err(AppError::artifact_not_found(
                format!("{remote} missing after dump: {}", listed.stdout),
                trace_id,
            ));
        }

        let local_arg = local.to_string_lossy().to_string();
        let pulled = self
            .runner
            .run(&["pull".to_string(), remote.to_string(), local_arg], trace_id);
        if let Err(err) = self.runner.run(&shell_args(&["rm", "-f", remote]), trace_id) {
            warn!(trace_id = %trace_id, path = %remote, error = %err.error, "remote dump cleanup failed");
        }
        pulled?;

        let size = fs::metadata(local).map(|meta| meta.len()).unwrap_or(0);
        if size == 0 {
            return Err(AppError::artifact_not_found(
                format!("Pulled dump {} is empty", local.display()),
                trace_id,
            ));
        }
        Ok(())
    }
}
