use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::attempt::AttemptAggregate;
use crate::models::session_report::{SessionReport, SignalKind};
use crate::store::memory::AttemptStore;

/// Thresholds for the post-hoc validity verdict. A detected second person or
/// mobile device invalidates on its own; the remaining counters tolerate up
/// to the configured maximum.
#[derive(Debug, Clone, Copy)]
pub struct ValidityPolicy {
    pub max_look_aways: u32,
    pub max_face_visibility_issues: u32,
    pub max_head_tilts: u32,
    pub max_heads_turned: u32,
    pub max_audio_incidents: u32,
}

impl ValidityPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_look_aways: config.max_look_aways,
            max_face_visibility_issues: config.max_face_visibility_issues,
            max_head_tilts: config.max_head_tilts,
            max_heads_turned: config.max_heads_turned,
            max_audio_incidents: config.max_audio_incidents,
        }
    }

    /// Evaluates the counters in fixed priority order and reports the first
    /// triggering condition, even when several are exceeded.
    pub fn evaluate(&self, report: &SessionReport) -> (bool, Option<String>) {
        if report.multiple_people > 0 {
            return (
                false,
                Some(format!(
                    "Multiple people detected {} time(s) during the session",
                    report.multiple_people
                )),
            );
        }
        if report.mobile_detected > 0 {
            return (
                false,
                Some(format!(
                    "Mobile device detected {} time(s) during the session",
                    report.mobile_detected
                )),
            );
        }
        if report.face_visibility_issues > self.max_face_visibility_issues {
            return (
                false,
                Some(format!(
                    "Face visibility issues ({}) exceeded the allowed limit of {}",
                    report.face_visibility_issues, self.max_face_visibility_issues
                )),
            );
        }
        if report.look_aways > self.max_look_aways {
            return (
                false,
                Some(format!(
                    "Look-aways ({}) exceeded the allowed limit of {}",
                    report.look_aways, self.max_look_aways
                )),
            );
        }
        if report.head_tilts > self.max_head_tilts {
            return (
                false,
                Some(format!(
                    "Head tilts ({}) exceeded the allowed limit of {}",
                    report.head_tilts, self.max_head_tilts
                )),
            );
        }
        if report.heads_turned > self.max_heads_turned {
            return (
                false,
                Some(format!(
                    "Head turns ({}) exceeded the allowed limit of {}",
                    report.heads_turned, self.max_heads_turned
                )),
            );
        }
        if report.audio_incidents > self.max_audio_incidents {
            return (
                false,
                Some(format!(
                    "Audio incidents ({}) exceeded the allowed limit of {}",
                    report.audio_incidents, self.max_audio_incidents
                )),
            );
        }
        (true, None)
    }
}

#[derive(Clone)]
pub struct SessionService {
    attempts: Arc<AttemptStore>,
    policy: ValidityPolicy,
}

impl SessionService {
    pub fn new(attempts: Arc<AttemptStore>, policy: ValidityPolicy) -> Self {
        Self { attempts, policy }
    }

    /// Adds `delta` observations of `kind` to the attempt's report. Signal
    /// sources report independently and out of order; each call serializes
    /// on the attempt's own lock. Rejected once the attempt is terminal.
    pub fn increment_signal(&self, attempt_id: Uuid, kind: SignalKind, delta: u32) -> Result<u32> {
        let aggregate = self.attempts.get(attempt_id)?;
        let mut guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
        if guard.attempt.is_submitted() {
            return Err(Error::AttemptAlreadySubmitted(attempt_id));
        }
        let total = guard.report.increment(kind, delta);
        tracing::debug!(
            attempt_id = %attempt_id,
            signal = kind.as_str(),
            delta,
            total,
            "proctoring signal recorded"
        );
        Ok(total)
    }

    pub fn report(&self, attempt_id: Uuid) -> Result<SessionReport> {
        let aggregate = self.attempts.get(attempt_id)?;
        let guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
        Ok(guard.report.clone())
    }

    /// Freezes the verdict onto the report. Called only from submission,
    /// under the aggregate lock, so it lands atomically with the score.
    pub fn finalize_validity(&self, aggregate: &mut AttemptAggregate) {
        let (is_valid, reason) = self.policy.evaluate(&aggregate.report);
        aggregate.report.is_valid_test = Some(is_valid);
        aggregate.report.invalid_reason = reason;
        if !is_valid {
            tracing::warn!(
                attempt_id = %aggregate.attempt.id,
                reason = aggregate.report.invalid_reason.as_deref().unwrap_or(""),
                "session flagged invalid"
            );
        }
    }
}
