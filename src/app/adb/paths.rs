use tracing::warn;

/// Device roots where `uiautomator dump` may land, in lookup priority.
pub const DEFAULT_CANDIDATE_ROOTS: [&str; 3] = ["/sdcard", "/storage/emulated/0", "/data/local/tmp"];

/// File name `uiautomator dump` writes when given no output path.
pub const DEFAULT_ARTIFACT_NAME: &str = "window_dump.xml";

pub fn default_candidate_roots() -> Vec<String> {
    DEFAULT_CANDIDATE_ROOTS
        .iter()
        .map(|root| root.to_string())
        .collect()
}

pub fn validate_device_path(path: &str) -> Result<(), String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err("device path is required".to_string());
    }
    if !trimmed.starts_with('/') {
        return Err(format!("{trimmed} must be an absolute device path starting with '/'"));
    }
    if trimmed.contains('\0') || trimmed.chars().any(char::is_whitespace) {
        return Err(format!("{trimmed} contains invalid characters"));
    }
    if trimmed.trim_end_matches('/').is_empty() {
        return Err("device path must not be root".to_string());
    }
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(format!("{trimmed} must not contain '..' segments"));
    }
    Ok(())
}

pub fn validate_artifact_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("artifact name is required".to_string());
    }
    if trimmed.contains('/') || trimmed == "." || trimmed == ".." {
        return Err(format!("{trimmed} must be a plain file name"));
    }
    if trimmed.contains('\0') || trimmed.chars().any(char::is_whitespace) {
        return Err(format!("{trimmed} contains invalid characters"));
    }
    Ok(())
}

/// Keeps valid roots in their given order, trimmed of trailing slashes and de-duplicated.
/// Falls back to the defaults when nothing valid remains.
pub fn normalize_candidate_roots(roots: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(roots.len());
    for root in roots {
        if let Err(message) = validate_device_path(root) {
            warn!(root = %root, error = %message, "ignoring candidate root");
            continue;
        }
        let cleaned = root.trim().trim_end_matches('/').to_string();
        if !normalized.contains(&cleaned) {
            normalized.push(cleaned);
        }
    }
    if normalized.is_empty() {
        return default_candidate_roots();
    }
    normalized
}

pub fn join_device_path(root: &str, name: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), name.trim_start_matches('/'))
}
