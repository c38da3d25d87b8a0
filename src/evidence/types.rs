use serde::{Deserialize, Serialize};

use crate::constants::{
    GROUNDED_EVIDENCE_STRENGTH, MAX_EVIDENCE_SPANS, MAX_EVIDENCE_STRENGTH, MAX_REASON_CHARS,
    MAX_RISK_SCORE, MAX_SPAN_CHARS, MAX_VISUAL_EVIDENCE_CHARS, truncate_chars,
};

/// Risk category attached to a piece of evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Normal,
    Ad,
    Sex,
    Gambling,
    Violence,
    /// Category named by a reviewer or policy file that has no dedicated variant.
    Other(String),
}

impl Category {
    /// Parses a category name, tolerating case and common aliases. Empty input maps to `Normal`.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "normal" | "safe" | "none" | "pass" => Category::Normal,
            "ad" | "ads" | "advert" | "advertising" | "illegal ads" | "illegal_ads" | "spam" => {
                Category::Ad
            }
            "sex" | "sexual" | "porn" | "pornography" | "nsfw" | "adult" => Category::Sex,
            "gambling" | "gamble" | "betting" => Category::Gambling,
            "violence" | "violent" | "weapon" | "weapons" => Category::Violence,
            _ => Category::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Normal => "Normal",
            Category::Ad => "Ad",
            Category::Sex => "Sex",
            Category::Gambling => "Gambling",
            Category::Violence => "Violence",
            Category::Other(name) => name,
        }
    }

    #[inline]
    pub fn is_normal(&self) -> bool {
        matches!(self, Category::Normal)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, de-duplicated list of matched evidence strings (first seen wins, capped).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceSpans(Vec<String>);

impl EvidenceSpans {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a span unless it is blank, already present, or the list is full.
    /// Returns `true` if the span was added.
    pub fn push(&mut self, span: &str) -> bool {
        let span = truncate_chars(span.trim(), MAX_SPAN_CHARS);
        if span.is_empty() || self.0.len() >= MAX_EVIDENCE_SPANS || self.0.contains(&span) {
            return false;
        }
        self.0.push(span);
        true
    }

    pub fn extend<I, S>(&mut self, spans: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for span in spans {
            self.push(span.as_ref());
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for EvidenceSpans {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut spans = Self::new();
        spans.extend(iter);
        spans
    }
}

/// Canonical unit of evidence produced by every source (rules, text review, visual review).
///
/// `risk_score` and `evidence_strength` are independent: a high score with low strength is weak
/// evidence. Fields are private so every record passes through the clamping constructors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    category: Category,
    risk_score: u8,
    evidence_strength: u8,
    evidence_spans: EvidenceSpans,
    visual_evidence: String,
    is_whitelisted: bool,
    reason: String,
}

impl EvidenceRecord {
    /// Builds a record, clamping `risk_score` to 0..=100 and `evidence_strength` to 0..=3.
    pub fn new(category: Category, risk_score: i64, evidence_strength: i64) -> Self {
        Self {
            category,
            risk_score: clamp_score(risk_score),
            evidence_strength: clamp_strength(evidence_strength),
            ..Default::default()
        }
    }

    /// Zero-score `Normal` record carrying a diagnostic reason.
    pub fn neutral(reason: impl AsRef<str>) -> Self {
        Self::new(Category::Normal, 0, 0).with_reason(reason)
    }

    pub fn with_spans(mut self, spans: EvidenceSpans) -> Self {
        self.evidence_spans = spans;
        self
    }

    pub fn with_visual_evidence(mut self, text: impl AsRef<str>) -> Self {
        self.visual_evidence = truncate_chars(text.as_ref().trim(), MAX_VISUAL_EVIDENCE_CHARS);
        self
    }

    pub fn with_whitelisted(mut self, whitelisted: bool) -> Self {
        self.is_whitelisted = whitelisted;
        self
    }

    pub fn with_reason(mut self, reason: impl AsRef<str>) -> Self {
        self.reason = truncate_chars(reason.as_ref().trim(), MAX_REASON_CHARS);
        self
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn risk_score(&self) -> u8 {
        self.risk_score
    }

    pub fn evidence_strength(&self) -> u8 {
        self.evidence_strength
    }

    pub fn evidence_spans(&self) -> &EvidenceSpans {
        &self.evidence_spans
    }

    pub fn visual_evidence(&self) -> &str {
        &self.visual_evidence
    }

    pub fn is_whitelisted(&self) -> bool {
        self.is_whitelisted
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// `true` if the record names something concrete: spans or visual evidence text.
    pub fn has_grounding(&self) -> bool {
        !self.evidence_spans.is_empty() || !self.visual_evidence.is_empty()
    }

    /// `true` if strength meets the grounded level and the record cites something.
    pub fn is_grounded(&self) -> bool {
        self.evidence_strength >= GROUNDED_EVIDENCE_STRENGTH && self.has_grounding()
    }

    /// `true` for the zero-score, zero-strength `Normal` shape with no evidence.
    pub fn is_neutral(&self) -> bool {
        self.category.is_normal()
            && self.risk_score == 0
            && self.evidence_strength == 0
            && !self.has_grounding()
    }
}

#[inline]
pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, i64::from(MAX_RISK_SCORE)) as u8
}

#[inline]
pub fn clamp_strength(strength: i64) -> u8 {
    strength.clamp(0, i64::from(MAX_EVIDENCE_STRENGTH)) as u8
}
