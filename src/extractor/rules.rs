//! Priority table mapping pattern hits to a category, strength and score.
//!
//! Evaluation is first-match: the first rule whose predicate holds decides the record.

use crate::evidence::Category;

use super::patterns::PatternHits;

#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub predicate: fn(&PatternHits) -> bool,
    pub category: Category,
    pub strength: u8,
    pub score: u8,
}

impl ExtractionRule {
    pub fn matches(&self, hits: &PatternHits) -> bool {
        (self.predicate)(hits)
    }
}

pub fn default_rules() -> Vec<ExtractionRule> {
    vec![
        ExtractionRule {
            name: "gambling_terms",
            predicate: |h| h.gambling,
            category: Category::Gambling,
            strength: 3,
            score: 90,
        },
        ExtractionRule {
            name: "sexual_terms",
            predicate: |h| h.sexual,
            category: Category::Sex,
            strength: 2,
            score: 80,
        },
        ExtractionRule {
            name: "contact_identifier",
            predicate: |h| h.has_contact_id() || (h.solicits_contact() && h.long_digits),
            category: Category::Ad,
            strength: 3,
            score: 92,
        },
        ExtractionRule {
            name: "contact_solicitation",
            predicate: |h| h.solicits_contact() || h.long_digits,
            category: Category::Ad,
            strength: 2,
            score: 70,
        },
    ]
}
