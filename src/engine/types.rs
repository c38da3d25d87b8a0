use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_REASON_CHARS, MAX_RISK_SCORE, truncate_chars};
use crate::detector::{Detection, HitSummary, TextSpan};
use crate::evidence::EvidenceRecord;
use crate::policy::Action;
use crate::reviewer::ReviewOutcome;

/// Which evidence source produced a fusion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Rules,
    TextReview,
    VisualReview,
}

impl EvidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSource::Rules => "rules",
            EvidenceSource::TextReview => "text_review",
            EvidenceSource::VisualReview => "visual_review",
        }
    }
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal branch taken by the decision pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    /// Detector label on the hard-block list.
    HardBlock,
    /// No source produced a non-neutral record.
    NoSignal,
    /// Evidence too weak or uncited; score capped.
    Suppressed,
    /// Grounded evidence, but whitelisted or under the threshold.
    BelowThreshold,
    /// Grounded evidence at or above the threshold.
    ThresholdBlock,
}

impl DecisionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionPath::HardBlock => "hard_block",
            DecisionPath::NoSignal => "no_signal",
            DecisionPath::Suppressed => "suppressed",
            DecisionPath::BelowThreshold => "below_threshold",
            DecisionPath::ThresholdBlock => "threshold_block",
        }
    }
}

/// Raw L1 signals as the engine saw them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct L1Trace {
    /// Trimmed, lowercased detection labels.
    pub labels: Vec<String>,
    pub detections: Vec<Detection>,
    pub text_spans: Vec<TextSpan>,
    pub hit_summary: HitSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector_error: Option<String>,
}

/// How a reviewer path was served. Kept apart from the record so repeated decisions over the
/// same content carry identical `l2_*` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStatus {
    /// `REVIEWED`, `CACHED` or `DEGRADED`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

impl From<&ReviewOutcome> for ReviewStatus {
    fn from(outcome: &ReviewOutcome) -> Self {
        Self {
            status: outcome.status().to_string(),
            degraded_reason: outcome.degrade_reason().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvidence {
    pub l1: L1Trace,
    pub l2_rules: Option<EvidenceRecord>,
    pub l2_text: Option<EvidenceRecord>,
    pub l2_visual: Option<EvidenceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_text_status: Option<ReviewStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_visual_status: Option<ReviewStatus>,
    /// Category of the winning candidate, or `HardBlock`.
    pub chosen_category: Option<String>,
    pub chosen_source: Option<EvidenceSource>,
    pub path: DecisionPath,
    /// Threshold applied at the threshold step, when reached.
    pub threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// Collaborators that degraded during this decision.
    pub degraded: Vec<String>,
    pub elapsed_ms: u64,
}

impl DecisionEvidence {
    pub fn new(l1: L1Trace, path: DecisionPath) -> Self {
        Self {
            l1,
            l2_rules: None,
            l2_text: None,
            l2_visual: None,
            l2_text_status: None,
            l2_visual_status: None,
            chosen_category: None,
            chosen_source: None,
            path,
            threshold: None,
            rule_id: None,
            degraded: Vec::new(),
            elapsed_ms: 0,
        }
    }
}

/// Verdict returned for every submitted frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDecision {
    pub decision_id: Uuid,
    pub decided_at: DateTime<Utc>,
    pub risk_score: u8,
    pub action: Action,
    pub reason: String,
    pub evidence: DecisionEvidence,
}

impl FinalDecision {
    /// # Panics
    ///
    /// Panics if `risk_score` exceeds 100; scores are clamped upstream, so this is a bug.
    pub fn new(
        risk_score: u8,
        action: Action,
        reason: impl AsRef<str>,
        evidence: DecisionEvidence,
    ) -> Self {
        assert!(
            risk_score <= MAX_RISK_SCORE,
            "risk score {risk_score} out of range"
        );
        Self {
            decision_id: Uuid::new_v4(),
            decided_at: Utc::now(),
            risk_score,
            action,
            reason: truncate_chars(reason.as_ref(), MAX_REASON_CHARS),
            evidence,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.action == Action::Block
    }

    pub fn path(&self) -> DecisionPath {
        self.evidence.path
    }
}
