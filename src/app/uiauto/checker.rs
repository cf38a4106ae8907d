use std::time::Duration;

use tracing::{info, warn};

use crate::app::adb::runner::CommandRunner;
use crate::app::cancel::CancelToken;
use crate::app::error::{AppError, ERR_ARTIFACT_NOT_FOUND, ERR_BRIDGE_UNAVAILABLE};
use crate::app::models::{AttemptOutcome, AttemptRecord, CheckReport};
use crate::app::uiauto::collector::UiDumpCollector;
use crate::app::uiauto::matcher::TextMatcher;
use crate::app::uiauto::resetter::ServiceResetter;
use crate::app::uiauto::ProbeSettings;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_MS: u64 = 2000;

/// Reset, capture and search, repeated until the text shows up or attempts run out.
pub struct TextPresenceChecker<'a> {
    resetter: ServiceResetter<'a>,
    collector: UiDumpCollector<'a>,
    cancel: CancelToken,
}

impl<'a> TextPresenceChecker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a ProbeSettings, cancel: CancelToken) -> Self {
        Self {
            resetter: ServiceResetter::new(runner, settings, cancel.clone()),
            collector: UiDumpCollector::new(runner, settings),
            cancel,
        }
    }

    pub fn check_with_retry(
        &self,
        pattern: &str,
        max_attempts: u32,
        delay_ms: u64,
        trace_id: &str,
    ) -> Result<bool, AppError> {
        self.check_with_retry_detailed(pattern, max_attempts, delay_ms, trace_id)
            .map(|report| report.found)
    }

    /// Same as [`check_with_retry`](Self::check_with_retry) but keeps per-attempt records,
    /// so capture faults stay distinguishable from genuine misses.
    pub fn check_with_retry_detailed(
        &self,
        pattern: &str,
        max_attempts: u32,
        delay_ms: u64,
        trace_id: &str,
    ) -> Result<CheckReport, AppError> {
        if max_attempts == 0 {
            return Err(AppError::validation(
                "max_attempts must be a positive integer",
                trace_id,
            ));
        }
        let matcher = TextMatcher::new(pattern, trace_id)?;

        let result = self.run_attempts(&matcher, max_attempts, delay_ms, trace_id);
        // Leave no dump or running service behind, whatever happened above.
        self.resetter.reset(trace_id);
        result
    }

    fn run_attempts(
        &self,
        matcher: &TextMatcher,
        max_attempts: u32,
        delay_ms: u64,
        trace_id: &str,
    ) -> Result<CheckReport, AppError> {
        let mut report = CheckReport {
            pattern: matcher.pattern().to_string(),
            found: false,
            attempts: 0,
            max_attempts,
            records: Vec::with_capacity(max_attempts as usize),
            matched_root: None,
            snapshot: None,
        };

        for attempt in 1..=max_attempts {
            if self.cancel.is_cancelled() {
                return Err(AppError::cancelled(trace_id));
            }
            info!(trace_id = %trace_id, attempt, max_attempts, pattern = %matcher.pattern(), "checking screen");

            self.resetter.reset(trace_id);
            if self.cancel.is_cancelled() {
                return Err(AppError::cancelled(trace_id));
            }

            report.attempts = attempt;
            let mut record = AttemptRecord {
                attempt,
                outcome: AttemptOutcome::Missing,
                root: None,
                error: None,
                delay_ms: 0,
            };

            match self.collector.collect(trace_id) {
                Ok(snapshot) => {
                    record.root = Some(snapshot.root.clone());
                    if matcher.is_match(&snapshot.content) {
                        info!(trace_id = %trace_id, attempt, root = %snapshot.root, "text found");
                        record.outcome = AttemptOutcome::Found;
                        report.records.push(record);
                        report.found = true;
                        report.matched_root = Some(snapshot.root);
                        report.snapshot = Some(snapshot.content);
                        return Ok(report);
                    }
                    info!(trace_id = %trace_id, attempt, "text not on screen");
                    report.snapshot = Some(snapshot.content);
                }
                Err(err) if is_capture_failure(&err) => {
                    warn!(trace_id = %trace_id, attempt, code = %err.code, error = %err.error, "capture failed, counting as not found");
                    record.outcome = AttemptOutcome::CaptureFailed;
                    record.error = Some(err.error);
                }
                Err(err) => return Err(err),
            }

            if attempt < max_attempts {
                record.delay_ms = delay_ms;
                report.records.push(record);
                info!(trace_id = %trace_id, delay_ms, "waiting before next attempt");
                if !self.cancel.sleep(Duration::from_millis(delay_ms)) {
                    return Err(AppError::cancelled(trace_id));
                }
            } else {
                report.records.push(record);
            }
        }

        info!(trace_id = %trace_id, max_attempts, pattern = %matcher.pattern(), "text not found after all attempts");
        Ok(report)
    }
}

/// Failures that happen while the screen is in flux and deserve another attempt.
fn is_capture_failure(err: &AppError) -> bool {
    err.has_code(ERR_ARTIFACT_NOT_FOUND) || err.has_code(ERR_BRIDGE_UNAVAILABLE)
}
