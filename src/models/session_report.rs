use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pre-classified behavior classes reported by the proctoring sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    HeadsTurned,
    HeadTilts,
    LookAways,
    MultiplePeople,
    FaceVisibilityIssues,
    MobileDetected,
    AudioIncidents,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::HeadsTurned => "heads_turned",
            SignalKind::HeadTilts => "head_tilts",
            SignalKind::LookAways => "look_aways",
            SignalKind::MultiplePeople => "multiple_people",
            SignalKind::FaceVisibilityIssues => "face_visibility_issues",
            SignalKind::MobileDetected => "mobile_detected",
            SignalKind::AudioIncidents => "audio_incidents",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub heads_turned: u32,
    pub head_tilts: u32,
    pub look_aways: u32,
    pub multiple_people: u32,
    pub face_visibility_issues: u32,
    pub mobile_detected: u32,
    pub audio_incidents: u32,
    /// Set exactly once when the attempt is submitted.
    pub is_valid_test: Option<bool>,
    pub invalid_reason: Option<String>,
}

impl SessionReport {
    pub fn new(attempt_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt_id,
            heads_turned: 0,
            head_tilts: 0,
            look_aways: 0,
            multiple_people: 0,
            face_visibility_issues: 0,
            mobile_detected: 0,
            audio_incidents: 0,
            is_valid_test: None,
            invalid_reason: None,
        }
    }

    pub fn increment(&mut self, kind: SignalKind, delta: u32) -> u32 {
        let counter = match kind {
            SignalKind::HeadsTurned => &mut self.heads_turned,
            SignalKind::HeadTilts => &mut self.head_tilts,
            SignalKind::LookAways => &mut self.look_aways,
            SignalKind::MultiplePeople => &mut self.multiple_people,
            SignalKind::FaceVisibilityIssues => &mut self.face_visibility_issues,
            SignalKind::MobileDetected => &mut self.mobile_detected,
            SignalKind::AudioIncidents => &mut self.audio_incidents,
        };
        *counter = counter.saturating_add(delta);
        *counter
    }
}
