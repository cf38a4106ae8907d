use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceSummary {
    pub serial: String,
    pub state: String,
    pub model: Option<String>,
    pub product: Option<String>,
    pub transport_id: Option<String>,
}

impl DeviceSummary {
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResponse<T> {
    pub trace_id: String,
    pub data: T,
}

/// Content read back from the first candidate root holding the snapshot artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub root: String,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Found,
    Missing,
    CaptureFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckReport {
    pub pattern: String,
    pub found: bool,
    pub attempts: u32,
    pub max_attempts: u32,
    pub records: Vec<AttemptRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_root: Option<String>,
    /// Content of the matching snapshot, or of the last snapshot read when nothing matched.
    #[serde(skip)]
    pub snapshot: Option<String>,
}

impl CheckReport {
    pub fn capture_failures(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome == AttemptOutcome::CaptureFailed)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DumpExportResult {
    pub device_root: String,
    pub output_dir: String,
    pub hierarchy_xml: String,
    pub windows: String,
    pub activities: String,
    pub view_hierarchy: String,
}

impl DumpExportResult {
    pub fn files(&self) -> Vec<&str> {
        vec![
            self.hierarchy_xml.as_str(),
            self.windows.as_str(),
            self.activities.as_str(),
            self.view_hierarchy.as_str(),
        ]
    }
}
