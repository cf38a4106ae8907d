use std::sync::OnceLock;

use regex::Regex;

use crate::app::models::DeviceSummary;

pub fn parse_adb_devices(output: &str) -> Vec<DeviceSummary> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with('*'))
        .filter(|line| !line.to_lowercase().contains("list of devices"))
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                return None;
            }
            let mut summary = DeviceSummary {
                serial: tokens[0].to_string(),
                state: tokens[1].to_string(),
                model: None,
                product: None,
                transport_id: None,
            };
            for token in tokens.iter().skip(2) {
                if let Some(value) = token.strip_prefix("model:") {
                    summary.model = Some(value.to_string());
                } else if let Some(value) = token.strip_prefix("product:") {
                    summary.product = Some(value.to_string());
                } else if let Some(value) = token.strip_prefix("transport_id:") {
                    summary.transport_id = Some(value.to_string());
                }
            }
            Some(summary)
        })
        .collect()
}

fn dumped_to_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    // uiautomator has shipped both spellings of "hierarchy".
    RE.get_or_init(|| Regex::new(r"(?i)UI\s+hier\w*\s+dumped\s+to:\s*(\S+)").ok())
        .as_ref()
}

/// Extracts the path from `UI hierchary dumped to: /sdcard/window_dump.xml`.
pub fn parse_dump_reported_path(output: &str) -> Option<String> {
    dumped_to_regex()?
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Older adb versions exit 0 even when the remote command failed and print the shell
/// error on stdout instead.
pub fn looks_like_shell_error(output: &str) -> bool {
    let first = output.lines().map(str::trim).find(|line| !line.is_empty());
    let Some(first) = first else {
        return false;
    };
    let lower = first.to_lowercase();
    ["cat:", "ls:", "rm:", "touch:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
        && (lower.contains("no such file")
            || lower.contains("permission denied")
            || lower.contains("not a directory"))
}
