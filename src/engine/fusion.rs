//! Pure fusion and policy judgement over already-collected evidence.

use crate::constants::{
    GROUNDED_EVIDENCE_STRENGTH, REASON_SPAN_CITATIONS, SUPPRESSED_SCORE_CEILING,
};
use crate::evidence::{Category, EvidenceRecord};
use crate::policy::{Action, PolicyStore};

use super::types::{DecisionPath, EvidenceSource};

pub const NO_SIGNAL_REASON: &str = "no risk signal";
pub const SUPPRESSED_REASON: &str = "insufficient evidence";
pub const BELOW_THRESHOLD_REASON: &str = "evidence present but below threshold";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub source: EvidenceSource,
    pub record: &'a EvidenceRecord,
}

impl<'a> Candidate<'a> {
    pub fn new(source: EvidenceSource, record: &'a EvidenceRecord) -> Self {
        Self { source, record }
    }
}

/// Outcome of fusing candidates and applying policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub risk_score: u8,
    pub action: Action,
    pub reason: String,
    pub path: DecisionPath,
    pub source: Option<EvidenceSource>,
    pub category: Option<Category>,
    pub threshold: Option<u32>,
    pub rule_id: Option<String>,
}

impl Judgement {
    fn no_signal() -> Self {
        Self {
            risk_score: 0,
            action: Action::Pass,
            reason: NO_SIGNAL_REASON.to_string(),
            path: DecisionPath::NoSignal,
            source: None,
            category: None,
            threshold: None,
            rule_id: None,
        }
    }
}

/// Highest `risk_score` wins; on a tie the earliest candidate is kept.
pub fn select_candidate<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    candidates.iter().copied().fold(None, |best, candidate| match best {
        Some(current) if candidate.record.risk_score() <= current.record.risk_score() => {
            Some(current)
        }
        _ => Some(candidate),
    })
}

/// Threshold precedence: explicit override, then the category's policy rule, then the `Normal` rule.
///
/// A store that fell back to the permissive policy therefore never blocks without an override.
pub fn effective_threshold(
    policy: &PolicyStore,
    category: &Category,
    override_threshold: Option<u32>,
) -> u32 {
    override_threshold.unwrap_or_else(|| policy.get(category).risk_threshold)
}

/// `true` when the record is too weak to act on: low strength or nothing cited.
pub fn is_suppressed(record: &EvidenceRecord) -> bool {
    record.evidence_strength() < GROUNDED_EVIDENCE_STRENGTH || !record.has_grounding()
}

pub fn judge(
    candidates: &[Candidate<'_>],
    policy: &PolicyStore,
    override_threshold: Option<u32>,
) -> Judgement {
    let Some(chosen) = select_candidate(candidates) else {
        return Judgement::no_signal();
    };
    let record = chosen.record;
    let category = record.category().clone();

    if is_suppressed(record) {
        return Judgement {
            risk_score: record.risk_score().min(SUPPRESSED_SCORE_CEILING),
            action: Action::Pass,
            reason: SUPPRESSED_REASON.to_string(),
            path: DecisionPath::Suppressed,
            source: Some(chosen.source),
            category: Some(category),
            threshold: None,
            rule_id: None,
        };
    }

    let threshold = effective_threshold(policy, &category, override_threshold);
    let rule = policy.rule_for(&category);
    let whitelisted =
        record.is_whitelisted() && record.evidence_strength() < GROUNDED_EVIDENCE_STRENGTH;
    let score = record.risk_score();

    let (action, path, reason) = if u32::from(score) >= threshold && !whitelisted {
        let label = rule
            .as_ref()
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| category.to_string());
        (
            Action::Block,
            DecisionPath::ThresholdBlock,
            format!(
                "{label} risk {score} reached threshold {threshold}; evidence: {}",
                cite(record)
            ),
        )
    } else {
        (
            Action::Pass,
            DecisionPath::BelowThreshold,
            format!("{BELOW_THRESHOLD_REASON}; evidence: {}", cite(record)),
        )
    };

    Judgement {
        risk_score: score,
        action,
        reason,
        path,
        source: Some(chosen.source),
        category: Some(category),
        threshold: Some(threshold),
        rule_id: rule.and_then(|r| r.rule_id),
    }
}

/// Top evidence spans, or the visual evidence text when no spans were cited.
fn cite(record: &EvidenceRecord) -> String {
    if record.evidence_spans().is_empty() {
        return record.visual_evidence().to_string();
    }
    record
        .evidence_spans()
        .iter()
        .take(REASON_SPAN_CITATIONS)
        .collect::<Vec<_>>()
        .join(", ")
}
