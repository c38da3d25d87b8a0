//! Cross-cutting, shared constants.
//!
//! Scores live on a 0..=100 scale and evidence strength on 0..=3. Thresholds are compared with
//! `>=` against the chosen candidate's score, so a threshold above [`MAX_RISK_SCORE`] can never be
//! reached.

pub const MAX_RISK_SCORE: u8 = 100;
pub const MAX_EVIDENCE_STRENGTH: u8 = 3;

/// Strength at or above which evidence counts as grounded (and overrides the whitelist).
pub const GROUNDED_EVIDENCE_STRENGTH: u8 = 2;

/// Score ceiling applied to weakly grounded evidence.
pub const SUPPRESSED_SCORE_CEILING: u8 = 30;

/// Score emitted for an L1 hard block.
pub const HARD_BLOCK_SCORE: u8 = 95;

/// Threshold of the `Normal` rule synthesised when a policy file omits one.
pub const DEFAULT_BLOCK_THRESHOLD: u32 = 80;

/// Threshold of the permissive fallback policy; unreachable by any score.
pub const PERMISSIVE_THRESHOLD: u32 = MAX_RISK_SCORE as u32 + 1;

pub const MAX_EVIDENCE_SPANS: usize = 10;
pub const MAX_REASON_CHARS: usize = 160;
pub const MAX_VISUAL_EVIDENCE_CHARS: usize = 200;
pub const MAX_SPAN_CHARS: usize = 64;

/// Cap applied to joined OCR text before pattern matching.
pub const MAX_MATCH_TEXT_CHARS: usize = 500;

/// Cap applied to the context summary sent to the text reviewer.
pub const MAX_REVIEW_CONTEXT_CHARS: usize = 500;

/// How many spans a decision reason cites.
pub const REASON_SPAN_CITATIONS: usize = 5;

pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Truncates `text` to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("加v看福利", 2), "加v");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_permissive_threshold_unreachable() {
        assert!(u32::from(MAX_RISK_SCORE) < PERMISSIVE_THRESHOLD);
    }
}
