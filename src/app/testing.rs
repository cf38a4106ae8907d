use std::cell::RefCell;

use crate::app::adb::runner::{CommandOutput, CommandRunner};
use crate::app::error::AppError;

type Handler = Box<dyn FnMut(&str) -> Result<String, String>>;

/// In-memory bridge: records each invocation as a space-joined line and answers through
/// a handler. `Err` answers become `ERR_BRIDGE_UNAVAILABLE`.
pub struct ScriptedBridge {
    handler: RefCell<Handler>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedBridge {
    pub fn new(handler: impl FnMut(&str) -> Result<String, String> + 'static) -> Self {
        Self {
            handler: RefCell::new(Box::new(handler)),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every command succeeds with empty output.
    pub fn permissive() -> Self {
        Self::new(|_| Ok(String::new()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.contains(needle))
            .count()
    }
}

impl CommandRunner for ScriptedBridge {
    fn run(&self, args: &[String], trace_id: &str) -> Result<CommandOutput, AppError> {
        let line = args.join(" ");
        self.calls.borrow_mut().push(line.clone());
        let answer = (self.handler.borrow_mut())(&line);
        match answer {
            Ok(stdout) => Ok(CommandOutput {
                stdout: stdout.trim().to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            }),
            Err(message) => Err(AppError::bridge_unavailable(message, trace_id)),
        }
    }
}
