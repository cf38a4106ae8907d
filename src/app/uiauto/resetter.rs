use tracing::debug;

use crate::app::adb::paths::join_device_path;
use crate::app::adb::runner::{shell_args, CommandRunner};
use crate::app::cancel::CancelToken;
use crate::app::uiauto::ProbeSettings;

/// Stops the inspection service and clears stale dumps. Never fails: every step is
/// best-effort and only logged.
pub struct ServiceResetter<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a ProbeSettings,
    cancel: CancelToken,
}

impl<'a> ServiceResetter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a ProbeSettings, cancel: CancelToken) -> Self {
        Self {
            runner,
            settings,
            cancel,
        }
    }

    pub fn reset(&self, trace_id: &str) {
        for process in &self.settings.service_processes {
            if let Err(err) = self
                .runner
                .run(&shell_args(&["am", "force-stop", process]), trace_id)
            {
                debug!(trace_id = %trace_id, process = %process, error = %err.error, "force-stop ignored");
            }
        }

        for root in &self.settings.candidate_roots {
            let artifact = join_device_path(root, &self.settings.artifact_name);
            if let Err(err) = self.runner.run(&shell_args(&["rm", "-f", &artifact]), trace_id) {
                debug!(trace_id = %trace_id, path = %artifact, error = %err.error, "stale dump removal ignored");
            }
        }

        if !self.cancel.sleep(self.settings.settle_delay) {
            debug!(trace_id = %trace_id, "settle delay interrupted");
        }
    }
}
