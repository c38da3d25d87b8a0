use super::*;
use crate::constants::{MAX_EVIDENCE_SPANS, MAX_REASON_CHARS};

#[test]
fn test_category_parse_aliases() {
    assert_eq!(Category::parse("Normal"), Category::Normal);
    assert_eq!(Category::parse(""), Category::Normal);
    assert_eq!(Category::parse("  ad "), Category::Ad);
    assert_eq!(Category::parse("Illegal Ads"), Category::Ad);
    assert_eq!(Category::parse("PORN"), Category::Sex);
    assert_eq!(Category::parse("gambling"), Category::Gambling);
    assert_eq!(Category::parse("weapon"), Category::Violence);
    assert_eq!(
        Category::parse("Evasive Language"),
        Category::Other("Evasive Language".to_string())
    );
}

#[test]
fn test_category_serde_as_string() {
    let json = serde_json::to_string(&Category::Gambling).expect("serialize");
    assert_eq!(json, "\"Gambling\"");

    let parsed: Category = serde_json::from_str("\"sexual\"").expect("deserialize");
    assert_eq!(parsed, Category::Sex);
}

#[test]
fn test_record_clamps_ranges() {
    let record = EvidenceRecord::new(Category::Ad, 250, 9);
    assert_eq!(record.risk_score(), 100);
    assert_eq!(record.evidence_strength(), 3);

    let record = EvidenceRecord::new(Category::Ad, -4, -1);
    assert_eq!(record.risk_score(), 0);
    assert_eq!(record.evidence_strength(), 0);
}

#[test]
fn test_record_caps_reason_length() {
    let long = "x".repeat(MAX_REASON_CHARS * 2);
    let record = EvidenceRecord::neutral(&long);
    assert_eq!(record.reason().chars().count(), MAX_REASON_CHARS);
}

#[test]
fn test_neutral_record_shape() {
    let record = EvidenceRecord::neutral("rate limited");
    assert!(record.is_neutral());
    assert_eq!(record.category(), &Category::Normal);
    assert_eq!(record.reason(), "rate limited");
}

#[test]
fn test_spans_dedup_preserves_first_seen_order() {
    let spans: EvidenceSpans = ["加v", "私聊", "加v", " ", "私聊", "wechat"].into_iter().collect();
    assert_eq!(spans.as_slice(), ["加v", "私聊", "wechat"]);
}

#[test]
fn test_spans_capped() {
    let mut spans = EvidenceSpans::new();
    for i in 0..(MAX_EVIDENCE_SPANS + 5) {
        spans.push(&format!("span-{i}"));
    }
    assert_eq!(spans.len(), MAX_EVIDENCE_SPANS);
    assert_eq!(spans.as_slice()[0], "span-0");
    assert!(!spans.push("one-more"));
}

#[test]
fn test_grounding_requires_strength_and_citation() {
    let cited: EvidenceSpans = ["13812345678"].into_iter().collect();

    let strong = EvidenceRecord::new(Category::Ad, 92, 3).with_spans(cited.clone());
    assert!(strong.is_grounded());

    let weak = EvidenceRecord::new(Category::Ad, 92, 1).with_spans(cited);
    assert!(!weak.is_grounded());

    let uncited = EvidenceRecord::new(Category::Sex, 90, 3);
    assert!(!uncited.is_grounded());

    let visual = EvidenceRecord::new(Category::Sex, 90, 3).with_visual_evidence("exposed torso");
    assert!(visual.is_grounded());
}

#[test]
fn test_record_roundtrips_through_json() {
    let record = EvidenceRecord::new(Category::Ad, 70, 2)
        .with_spans(["加v"].into_iter().collect())
        .with_reason("contact solicitation");

    let json = serde_json::to_string(&record).expect("serialize");
    let back: EvidenceRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, record);
}
