//! Deterministic, local evidence extraction over recognized text.
//!
//! [`RuleExtractor::extract`] is pure: identical spans always yield an identical
//! [`EvidenceRecord`], which keeps downstream caching sound.

pub mod normalize;
pub mod patterns;
pub mod rules;

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::detector::TextSpan;
use crate::evidence::{Category, EvidenceRecord, EvidenceSpans};

pub use normalize::{PreparedText, fold_confusables};
pub use patterns::{PatternHits, PatternSet};
pub use rules::{ExtractionRule, default_rules};

#[derive(Debug, Clone)]
pub struct RuleExtractor {
    patterns: &'static PatternSet,
    rules: Vec<ExtractionRule>,
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleExtractor {
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::shared(),
            rules: default_rules(),
        }
    }

    pub fn patterns(&self) -> &'static PatternSet {
        self.patterns
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn extract(&self, spans: &[TextSpan]) -> EvidenceRecord {
        self.extract_texts(spans.iter().map(|s| s.text.as_str()))
    }

    pub fn extract_texts<I, S>(&self, texts: I) -> EvidenceRecord
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prepared = PreparedText::from_texts(texts);
        if prepared.is_empty() {
            return EvidenceRecord::neutral("no recognized text");
        }

        let hits = self.patterns.scan(&prepared);
        let spans: EvidenceSpans = hits.matches.iter().collect();

        let record = match self.rules.iter().find(|rule| rule.matches(&hits)) {
            Some(rule) => {
                debug!(
                    rule = rule.name,
                    category = %rule.category,
                    spans = spans.len(),
                    "Rule matched"
                );
                EvidenceRecord::new(
                    rule.category.clone(),
                    i64::from(rule.score),
                    i64::from(rule.strength),
                )
                .with_reason(format!("rule {}", rule.name))
            }
            None => EvidenceRecord::new(Category::Normal, 0, 0).with_reason("no rule matched"),
        };

        record.with_spans(spans).with_whitelisted(hits.whitelisted)
    }
}
