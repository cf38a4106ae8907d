use tracing::{debug, info};

use crate::app::adb::parse::{looks_like_shell_error, parse_dump_reported_path};
use crate::app::adb::paths::join_device_path;
use crate::app::adb::runner::{shell_args, CommandRunner};
use crate::app::error::AppError;
use crate::app::models::Snapshot;
use crate::app::uiauto::ProbeSettings;

/// Triggers `uiautomator dump` without an output path and reads the dump back from the
/// first candidate root that has it.
///
/// The artifact is left on the device; the next reset removes it.
pub struct UiDumpCollector<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a ProbeSettings,
}

impl<'a> UiDumpCollector<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a ProbeSettings) -> Self {
        Self { runner, settings }
    }

    pub fn collect(&self, trace_id: &str) -> Result<Snapshot, AppError> {
        let output = self
            .runner
            .run(&shell_args(&["uiautomator", "dump"]), trace_id)?;
        match parse_dump_reported_path(&output.stdout) {
            Some(reported) => debug!(trace_id = %trace_id, reported = %reported, "dump reported"),
            None => debug!(trace_id = %trace_id, output = %output.stdout, "dump reported no path"),
        }

        for root in &self.settings.candidate_roots {
            let path = join_device_path(root, &self.settings.artifact_name);
            match self.runner.run(&shell_args(&["cat", &path]), trace_id) {
                Ok(read) if is_usable_dump(&read.stdout) => {
                    info!(trace_id = %trace_id, path = %path, bytes = read.stdout.len(), "dump read");
                    return Ok(Snapshot {
                        root: root.clone(),
                        path,
                        content: read.stdout,
                    });
                }
                Ok(_) => debug!(trace_id = %trace_id, path = %path, "no usable dump"),
                Err(err) => debug!(trace_id = %trace_id, path = %path, error = %err.error, "dump read failed"),
            }
        }

        Err(AppError::artifact_not_found(
            format!(
                "{} not found under any candidate root ({})",
                self.settings.artifact_name,
                self.settings.candidate_roots.join(", ")
            ),
            trace_id,
        ))
    }
}

fn is_usable_dump(content: &str) -> bool {
    !content.trim().is_empty() && !looks_like_shell_error(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::{ERR_ARTIFACT_NOT_FOUND, ERR_BRIDGE_UNAVAILABLE};
    use crate::app::testing::ScriptedBridge;
    use crate::app::uiauto::instant_settings;

    const DUMP: &str = "<?xml version='1.0' ?><hierarchy><node text=\"Login\"/></hierarchy>";

    #[test]
    fn returns_first_root_with_readable_dump() {
        let bridge = ScriptedBridge::new(|line| match line {
            "shell uiautomator dump" => {
                Ok("UI hierchary dumped to: /storage/emulated/0/window_dump.xml".to_string())
            }
            "shell cat /sdcard/window_dump.xml" => {
                Err("cat: /sdcard/window_dump.xml: No such file or directory".to_string())
            }
            "shell cat /storage/emulated/0/window_dump.xml" => Ok(DUMP.to_string()),
            other => panic!("unexpected command {other}"),
        });
        let settings = instant_settings();
        let snapshot = UiDumpCollector::new(&bridge, &settings)
            .collect("trace")
            .expect("dump");
        assert_eq!(snapshot.root, "/storage/emulated/0");
        assert_eq!(snapshot.path, "/storage/emulated/0/window_dump.xml");
        assert_eq!(snapshot.content, DUMP);
        assert_eq!(bridge.count_matching("/data/local/tmp"), 0);
    }

    #[test]
    fn ignores_empty_and_error_text_reads() {
        let bridge = ScriptedBridge::new(|line| match line {
            "shell uiautomator dump" => Ok(String::new()),
            "shell cat /sdcard/window_dump.xml" => Ok("   ".to_string()),
            "shell cat /storage/emulated/0/window_dump.xml" => {
                Ok("cat: /storage/emulated/0/window_dump.xml: No such file or directory".to_string())
            }
            _ => Ok(DUMP.to_string()),
        });
        let settings = instant_settings();
        let snapshot = UiDumpCollector::new(&bridge, &settings)
            .collect("trace")
            .expect("dump");
        assert_eq!(snapshot.root, "/data/local/tmp");
    }

    #[test]
    fn missing_everywhere_is_artifact_not_found() {
        let bridge = ScriptedBridge::new(|line| {
            if line.starts_with("shell cat") {
                Err("No such file or directory".to_string())
            } else {
                Ok("UI hierchary dumped to: /sdcard/window_dump.xml".to_string())
            }
        });
        let settings = instant_settings();
        let err = UiDumpCollector::new(&bridge, &settings)
            .collect("trace-missing")
            .expect_err("no dump");
        assert_eq!(err.code, ERR_ARTIFACT_NOT_FOUND);
        assert_eq!(err.trace_id, "trace-missing");
        assert_eq!(bridge.count_matching("shell cat"), 3);
    }

    #[test]
    fn trigger_failure_propagates_without_searching() {
        let bridge = ScriptedBridge::new(|line| {
            if line == "shell uiautomator dump" {
                Err("ERROR: could not get idle state.".to_string())
            } else {
                Ok(DUMP.to_string())
            }
        });
        let settings = instant_settings();
        let err = UiDumpCollector::new(&bridge, &settings)
            .collect("trace")
            .expect_err("trigger failed");
        assert_eq!(err.code, ERR_BRIDGE_UNAVAILABLE);
        assert_eq!(bridge.count_matching("shell cat"), 0);
    }
}
