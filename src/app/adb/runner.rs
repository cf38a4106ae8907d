use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::app::error::AppError;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best diagnostic text for a failed invocation: stderr if present, else stdout.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Executes one bridge invocation. `args` excludes the program and device selector.
///
/// Implementations return `Ok` only for a zero exit status, with stdout trimmed.
pub trait CommandRunner {
    fn run(&self, args: &[String], trace_id: &str) -> Result<CommandOutput, AppError>;
}

/// Builds `shell <parts...>` argument lists.
pub fn shell_args(parts: &[&str]) -> Vec<String> {
    std::iter::once("shell")
        .chain(parts.iter().copied())
        .map(|part| part.to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct AdbRunner {
    program: String,
    serial: Option<String>,
    timeout: Duration,
}

impl AdbRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            serial: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn full_args(&self, args: &[String]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            full.push("-s".to_string());
            full.push(serial.clone());
        }
        full.extend(args.iter().cloned());
        full
    }
}

impl CommandRunner for AdbRunner {
    fn run(&self, args: &[String], trace_id: &str) -> Result<CommandOutput, AppError> {
        let full = self.full_args(args);
        debug!(trace_id = %trace_id, command = %full.join(" "), "adb");
        let output = run_command_with_timeout(&self.program, &full, self.timeout, trace_id)?;
        if !output.success() {
            return Err(AppError::bridge_unavailable(
                format!(
                    "adb {} exited with {:?}: {}",
                    args.join(" "),
                    output.exit_code,
                    output.failure_text()
                ),
                trace_id,
            ));
        }
        Ok(CommandOutput {
            stdout: output.stdout.trim().to_string(),
            ..output
        })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::<u8>::new();
        let mut temp = [0u8; 4096];
        loop {
            match reader.read(&mut temp) {
                Ok(0) => break,
                Ok(count) => buffer.extend_from_slice(&temp[..count]),
                Err(_) => break,
            }
        }
        buffer
    })
}

/// Spawns `program args`, waits up to `timeout`, and returns the raw output whatever the
/// exit status. Spawn failures and timeouts are reported as `ERR_BRIDGE_UNAVAILABLE`.
pub fn run_command_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
    trace_id: &str,
) -> Result<CommandOutput, AppError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            AppError::bridge_unavailable(format!("Failed to spawn {program}: {err}"), trace_id)
        })?;

    // Both pipes are drained while we poll, otherwise a chatty child blocks on a full
    // pipe buffer and looks like a timeout.
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::system("Failed to capture stdout", trace_id))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::system("Failed to capture stderr", trace_id))?;
    let stdout_handle = drain(stdout);
    let stderr_handle = drain(stderr);

    let start = Instant::now();
    let exit_code = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status.code(),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Err(AppError::bridge_unavailable(
                        format!("{program} timed out after {}ms", timeout.as_millis()),
                        trace_id,
                    ));
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(err) => {
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(AppError::system(
                    format!("Failed to poll command: {err}"),
                    trace_id,
                ));
            }
        }
    };

    let stdout_bytes = stdout_handle.join().unwrap_or_default();
    let stderr_bytes = stderr_handle.join().unwrap_or_default();

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
        stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
        exit_code,
    })
}
