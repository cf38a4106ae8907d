//! Snapshot capture and on-screen text verification through `uiautomator`.
//!
//! Every step is a sequential bridge command: the inspection service on the device does
//! not tolerate overlapping captures, so nothing in here runs concurrently.

pub mod checker;
pub mod collector;
pub mod export;
pub mod matcher;
pub mod resetter;
pub mod resolver;

use std::time::Duration;

use crate::app::adb::paths::normalize_candidate_roots;
use crate::app::config::AppConfig;

/// Device-side layout and timing shared by the engine components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub candidate_roots: Vec<String>,
    pub artifact_name: String,
    pub service_processes: Vec<String>,
    pub settle_delay: Duration,
}

impl ProbeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            candidate_roots: normalize_candidate_roots(&config.device.candidate_roots),
            artifact_name: config.device.artifact_name.clone(),
            service_processes: config.device.service_processes.clone(),
            settle_delay: Duration::from_millis(config.retry.settle_delay_ms),
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
pub(crate) fn instant_settings() -> ProbeSettings {
    ProbeSettings::default().with_settle_delay(Duration::ZERO)
}
