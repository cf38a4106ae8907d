use std::path::{Path, PathBuf};

pub fn normalize_command_path(value: &str) -> String {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|candidate| candidate.strip_suffix(quote))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

fn sdk_adb(sdk_root: &str) -> Option<PathBuf> {
    let sdk_root = normalize_command_path(sdk_root);
    if sdk_root.is_empty() {
        return None;
    }
    let binary = if cfg!(windows) { "adb.exe" } else { "adb" };
    let candidate = Path::new(&sdk_root).join("platform-tools").join(binary);
    candidate.is_file().then_some(candidate)
}

/// Explicit path first, then `platform-tools/adb` under the given SDK roots, then `adb`
/// from `PATH`.
pub fn resolve_adb_program(command_path: &str, sdk_roots: &[String]) -> String {
    let normalized = normalize_command_path(command_path);
    if !normalized.is_empty() {
        return normalized;
    }
    sdk_roots
        .iter()
        .find_map(|root| sdk_adb(root))
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|| "adb".to_string())
}

/// SDK roots advertised by the environment, in lookup order.
pub fn sdk_roots_from_env() -> Vec<String> {
    ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .filter(|value| !value.trim().is_empty())
        .collect()
}

pub fn validate_adb_program(program: &str) -> Result<(), String> {
    if program.trim().is_empty() {
        return Err("ADB command is empty".to_string());
    }
    if program == "adb" {
        return Ok(());
    }
    let path = Path::new(program);
    if path.is_dir() {
        return Err("ADB path must point to an executable file".to_string());
    }
    if !path.exists() {
        return Err(format!("ADB executable not found at {program}"));
    }
    Ok(())
}
