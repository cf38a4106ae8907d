use serde::Serialize;
use std::fmt;

pub const ERR_VALIDATION: &str = "ERR_VALIDATION";
pub const ERR_SYSTEM: &str = "ERR_SYSTEM";
pub const ERR_BRIDGE_UNAVAILABLE: &str = "ERR_BRIDGE_UNAVAILABLE";
pub const ERR_NO_WRITABLE_PATH: &str = "ERR_NO_WRITABLE_PATH";
pub const ERR_ARTIFACT_NOT_FOUND: &str = "ERR_ARTIFACT_NOT_FOUND";
pub const ERR_NO_DEVICE: &str = "ERR_NO_DEVICE";
pub const ERR_CANCELLED: &str = "ERR_CANCELLED";

#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub error: String,
    pub code: String,
    pub trace_id: String,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            trace_id: trace_id.into(),
        }
    }

    pub fn validation(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::new(ERR_VALIDATION, message, trace_id)
    }

    pub fn system(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::new(ERR_SYSTEM, message, trace_id)
    }

    /// The bridge process could not be spawned, timed out, or exited non-zero.
    pub fn bridge_unavailable(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::new(ERR_BRIDGE_UNAVAILABLE, message, trace_id)
    }

    pub fn no_writable_path(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::new(ERR_NO_WRITABLE_PATH, message, trace_id)
    }

    pub fn artifact_not_found(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::new(ERR_ARTIFACT_NOT_FOUND, message, trace_id)
    }

    pub fn no_device(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self::new(ERR_NO_DEVICE, message, trace_id)
    }

    pub fn cancelled(trace_id: impl Into<String>) -> Self {
        Self::new(ERR_CANCELLED, "Operation cancelled", trace_id)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.code)
    }
}

impl std::error::Error for AppError {}
