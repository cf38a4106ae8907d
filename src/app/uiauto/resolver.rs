use tracing::{info, warn};
use uuid::Uuid;

use crate::app::adb::parse::looks_like_shell_error;
use crate::app::adb::paths::join_device_path;
use crate::app::adb::runner::{shell_args, CommandRunner};
use crate::app::error::AppError;

/// Finds the first candidate root that accepts a create-then-delete probe.
pub struct PathResolver<'a> {
    runner: &'a dyn CommandRunner,
    roots: &'a [String],
}

impl<'a> PathResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, roots: &'a [String]) -> Self {
        Self { runner, roots }
    }

    pub fn find_writable_path(&self, trace_id: &str) -> Result<String, AppError> {
        for root in self.roots {
            match self.probe(root, trace_id) {
                Ok(()) => {
                    info!(trace_id = %trace_id, root = %root, "writable root found");
                    return Ok(root.clone());
                }
                Err(err) => {
                    warn!(trace_id = %trace_id, root = %root, error = %err.error, "root not writable");
                }
            }
        }
        Err(AppError::no_writable_path(
            format!(
                "No writable path among candidate roots: {}",
                self.roots.join(", ")
            ),
            trace_id,
        ))
    }

    fn probe(&self, root: &str, trace_id: &str) -> Result<(), AppError> {
        let marker = join_device_path(root, &format!(".uiprobe_probe_{}", Uuid::new_v4().simple()));
        self.run_checked(&["touch", &marker], trace_id)?;
        self.run_checked(&["rm", &marker], trace_id)
    }

    fn run_checked(&self, parts: &[&str], trace_id: &str) -> Result<(), AppError> {
        let output = self.runner.run(&shell_args(parts), trace_id)?;
        if looks_like_shell_error(&output.stdout) {
            return Err(AppError::bridge_unavailable(output.stdout, trace_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::ERR_NO_WRITABLE_PATH;
    use crate::app::testing::ScriptedBridge;

    fn roots(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn picks_first_root_even_when_later_ones_work() {
        let bridge = ScriptedBridge::permissive();
        let roots = roots(&["/a", "/b", "/c"]);
        let root = PathResolver::new(&bridge, &roots)
            .find_writable_path("trace")
            .expect("writable");
        assert_eq!(root, "/a");
        assert_eq!(bridge.count_matching("/b/"), 0);
        assert_eq!(bridge.count_matching("/c/"), 0);
    }

    #[test]
    fn skips_failing_root_and_stops_at_first_success() {
        let bridge = ScriptedBridge::new(|line| {
            if line.contains(" /a/") {
                Err("touch: /a: Read-only file system".to_string())
            } else {
                Ok(String::new())
            }
        });
        let roots = roots(&["/a", "/b", "/c"]);
        let root = PathResolver::new(&bridge, &roots)
            .find_writable_path("trace")
            .expect("writable");
        assert_eq!(root, "/b");
        assert_eq!(bridge.count_matching("/c/"), 0);

        let calls = bridge.calls();
        assert_eq!(calls.len(), 3, "touch /a, touch /b, rm /b: {calls:?}");
        assert!(calls[1].starts_with("shell touch /b/.uiprobe_probe_"));
        assert!(calls[2].starts_with("shell rm /b/.uiprobe_probe_"));
        // The delete probe targets the marker that was just created.
        assert_eq!(calls[1].replacen("touch", "rm", 1), calls[2]);
    }

    #[test]
    fn failed_delete_rejects_root() {
        let bridge = ScriptedBridge::new(|line| {
            if line.starts_with("shell rm /a/") {
                Err("rm: Permission denied".to_string())
            } else {
                Ok(String::new())
            }
        });
        let roots = roots(&["/a", "/b"]);
        let root = PathResolver::new(&bridge, &roots)
            .find_writable_path("trace")
            .expect("writable");
        assert_eq!(root, "/b");
    }

    #[test]
    fn shell_error_on_stdout_counts_as_failure() {
        let bridge = ScriptedBridge::new(|line| {
            if line.contains(" /a/") {
                Ok("touch: '/a/.uiprobe_probe_x': Permission denied".to_string())
            } else {
                Ok(String::new())
            }
        });
        let roots = roots(&["/a", "/b"]);
        let root = PathResolver::new(&bridge, &roots)
            .find_writable_path("trace")
            .expect("writable");
        assert_eq!(root, "/b");
    }

    #[test]
    fn fails_only_after_every_root_is_tried() {
        let bridge = ScriptedBridge::new(|_| Err("denied".to_string()));
        let roots = roots(&["/a", "/b", "/c"]);
        let err = PathResolver::new(&bridge, &roots)
            .find_writable_path("trace-none")
            .expect_err("nothing writable");
        assert_eq!(err.code, ERR_NO_WRITABLE_PATH);
        assert_eq!(err.trace_id, "trace-none");
        assert_eq!(bridge.calls().len(), 3);
        assert!(err.error.contains("/a, /b, /c"));
    }

    #[test]
    fn probe_markers_are_unique() {
        let bridge = ScriptedBridge::permissive();
        let roots = roots(&["/a"]);
        let resolver = PathResolver::new(&bridge, &roots);
        resolver.find_writable_path("t").expect("first");
        resolver.find_writable_path("t").expect("second");
        let calls = bridge.calls();
        assert_ne!(calls[0], calls[2]);
    }
}
