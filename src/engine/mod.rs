//! Decision fusion engine.
//!
//! Pipeline for one frame: detector → hard-block check → rule extraction → conditional text and
//! visual review (concurrent) → fusion → policy threshold → [`FinalDecision`].
//!
//! [`FusionEngine::decide`] never fails. Collaborator failures are recorded in
//! [`DecisionEvidence::degraded`] and the pipeline continues with neutral evidence.

pub mod fusion;
pub mod hard_block;
pub mod types;


use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::constants::HARD_BLOCK_SCORE;
use crate::detector::{Detector, DetectorOutput};
use crate::evidence::EvidenceRecord;
use crate::extractor::RuleExtractor;
use crate::policy::{Action, PolicyStore};
use crate::reviewer::{ReviewBackend, ReviewOutcome, ReviewerGateway};

pub use fusion::{Candidate, Judgement, effective_threshold, judge, select_candidate};
pub use hard_block::{CODE_MARKER_LABEL, HARD_BLOCK_CATEGORY, HARD_BLOCK_LABELS, hard_block_hits};
pub use types::{
    DecisionEvidence, DecisionPath, EvidenceSource, FinalDecision, L1Trace, ReviewStatus,
};

pub const DEFAULT_SKIN_RATIO_TRIGGER: f32 = 0.18;
pub const DEFAULT_TEXT_ESCALATION_FLOOR: u8 = 0;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Visual review runs when the detector's skin ratio exceeds this.
    pub skin_ratio_trigger: f32,
    /// Minimum rule score for text escalation.
    pub text_escalation_floor: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            skin_ratio_trigger: DEFAULT_SKIN_RATIO_TRIGGER,
            text_escalation_floor: DEFAULT_TEXT_ESCALATION_FLOOR,
        }
    }
}

impl EngineConfig {
    pub fn skin_ratio_trigger(mut self, trigger: f32) -> Self {
        self.skin_ratio_trigger = trigger;
        self
    }

    pub fn text_escalation_floor(mut self, floor: u8) -> Self {
        self.text_escalation_floor = floor;
        self
    }
}

pub struct FusionEngine<B: ReviewBackend> {
    detector: Arc<dyn Detector>,
    gateway: Arc<ReviewerGateway<B>>,
    policy: Arc<PolicyStore>,
    extractor: RuleExtractor,
    config: EngineConfig,
}

impl<B: ReviewBackend> std::fmt::Debug for FusionEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionEngine")
            .field("gateway", &self.gateway)
            .field("policy_rules", &self.policy.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<B: ReviewBackend> FusionEngine<B> {
    pub fn new(
        detector: Arc<dyn Detector>,
        gateway: Arc<ReviewerGateway<B>>,
        policy: Arc<PolicyStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            detector,
            gateway,
            policy,
            extractor: RuleExtractor::new(),
            config,
        }
    }

    pub fn gateway(&self) -> &ReviewerGateway<B> {
        &self.gateway
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[instrument(skip(self, frame_path), fields(frame = %frame_path.display()))]
    pub async fn decide(
        &self,
        frame_path: &Path,
        override_threshold: Option<u32>,
        hard_block_enabled: bool,
    ) -> FinalDecision {
        let started = Instant::now();
        let mut degraded = Vec::new();

        let (output, detector_error) = match self.detector.detect(frame_path).await {
            Ok(output) => (output, None),
            Err(e) => {
                warn!(error = %e, "Detector failed, continuing with empty signals");
                degraded.push(format!("detector: {e}"));
                (DetectorOutput::default(), Some(e.to_string()))
            }
        };

        let labels = output.normalized_labels();
        let l1 = L1Trace {
            labels,
            detections: output.detections.clone(),
            text_spans: output.text_spans.clone(),
            hit_summary: output.hit_summary.clone(),
            detector_error,
        };

        if hard_block_enabled {
            let hits = hard_block_hits(&l1.labels, &l1.hit_summary);
            if !hits.is_empty() {
                info!(labels = ?hits, "Hard block");
                let reason = format!("hard block: {}", hits.join(", "));
                let mut evidence = DecisionEvidence::new(l1, DecisionPath::HardBlock);
                evidence.chosen_category = Some(HARD_BLOCK_CATEGORY.to_string());
                evidence.degraded = degraded;
                evidence.elapsed_ms = elapsed_ms(started);
                return FinalDecision::new(HARD_BLOCK_SCORE, Action::Block, reason, evidence);
            }
        }

        let texts = output.texts();
        let rules = (!texts.is_empty() || !l1.labels.is_empty())
            .then(|| self.extractor.extract(&output.text_spans));

        let escalate_text = !texts.is_empty()
            && rules
                .as_ref()
                .is_some_and(|record| self.needs_text_review(record));
        let summary = &l1.hit_summary;
        let escalate_visual =
            summary.skin_trigger || summary.skin_ratio > self.config.skin_ratio_trigger;
        debug!(escalate_text, escalate_visual, "Escalation evaluated");

        let text_context = escalate_text.then(|| text_context(&l1.labels, &texts));
        let text_review = async {
            match &text_context {
                Some(context) => {
                    info!("Escalating to text review");
                    Some(self.gateway.review_text(context).await)
                }
                None => None,
            }
        };
        let visual_review = async {
            if !escalate_visual {
                return None;
            }
            info!(skin_ratio = summary.skin_ratio, "Escalating to visual review");
            let image = match tokio::fs::read(frame_path).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(error = %e, "Frame unreadable for visual review");
                    None
                }
            };
            Some(self.gateway.review_visual(image.as_deref()).await)
        };
        let (text_outcome, visual_outcome) = tokio::join!(text_review, visual_review);

        for (name, outcome) in [("text_review", &text_outcome), ("visual_review", &visual_outcome)] {
            if let Some(reason) = outcome.as_ref().and_then(ReviewOutcome::degrade_reason) {
                degraded.push(format!("{name}: {reason}"));
            }
        }

        let judgement = {
            let candidates: Vec<Candidate<'_>> = [
                (EvidenceSource::Rules, rules.as_ref()),
                (
                    EvidenceSource::TextReview,
                    text_outcome.as_ref().map(ReviewOutcome::record),
                ),
                (
                    EvidenceSource::VisualReview,
                    visual_outcome.as_ref().map(ReviewOutcome::record),
                ),
            ]
            .into_iter()
            .filter_map(|(source, record)| {
                record
                    .filter(|r| !r.is_neutral())
                    .map(|r| Candidate::new(source, r))
            })
            .collect();
            judge(&candidates, &self.policy, override_threshold)
        };
        info!(
            score = judgement.risk_score,
            action = %judgement.action,
            path = judgement.path.as_str(),
            "Decision"
        );

        let mut evidence = DecisionEvidence::new(l1, judgement.path);
        evidence.l2_text_status = text_outcome.as_ref().map(ReviewStatus::from);
        evidence.l2_visual_status = visual_outcome.as_ref().map(ReviewStatus::from);
        evidence.l2_text = text_outcome.map(ReviewOutcome::into_record);
        evidence.l2_visual = visual_outcome.map(ReviewOutcome::into_record);
        evidence.l2_rules = rules;
        evidence.chosen_category = judgement.category.map(|c| c.to_string());
        evidence.chosen_source = judgement.source;
        evidence.threshold = judgement.threshold;
        evidence.rule_id = judgement.rule_id;
        evidence.degraded = degraded;
        evidence.elapsed_ms = elapsed_ms(started);

        FinalDecision::new(
            judgement.risk_score,
            judgement.action,
            judgement.reason,
            evidence,
        )
    }

    /// Rules found nothing concrete, the score clears the floor and the text is not whitelisted.
    fn needs_text_review(&self, record: &EvidenceRecord) -> bool {
        record.evidence_spans().is_empty()
            && record.evidence_strength() == 0
            && record.risk_score() >= self.config.text_escalation_floor
            && !record.is_whitelisted()
    }
}

/// Reviewer context: detection labels and recognized text.
fn text_context(labels: &[String], texts: &[&str]) -> String {
    format!("objects: [{}] | text: {}", labels.join(", "), texts.join(" / "))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
