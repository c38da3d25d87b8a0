use super::*;
use crate::constants::MAX_MATCH_TEXT_CHARS;

fn extract(texts: &[&str]) -> EvidenceRecord {
    RuleExtractor::new().extract_texts(texts.iter().copied())
}

#[test]
fn test_contact_hint_with_ad_term_is_weak_ad() {
    let record = extract(&["加v 看福利", "私聊"]);

    assert_eq!(record.category(), &Category::Ad);
    assert_eq!(record.evidence_strength(), 2);
    assert_eq!(record.risk_score(), 70);
    assert_eq!(record.evidence_spans().as_slice(), ["加v", "私聊"]);
    assert!(!record.is_whitelisted());
}

#[test]
fn test_gambling_takes_priority() {
    let record = extract(&["百家乐 加v 13812345678 裸聊"]);

    assert_eq!(record.category(), &Category::Gambling);
    assert_eq!(record.evidence_strength(), 3);
    assert_eq!(record.risk_score(), 90);
    assert_eq!(record.evidence_spans().as_slice()[0], "百家乐");
}

#[test]
fn test_sexual_beats_contact() {
    let record = extract(&["约炮 加微信"]);

    assert_eq!(record.category(), &Category::Sex);
    assert_eq!(record.evidence_strength(), 2);
    assert_eq!(record.risk_score(), 80);
}

#[test]
fn test_phone_number_is_strong_ad() {
    let record = extract(&["热线 13812345678"]);

    assert_eq!(record.category(), &Category::Ad);
    assert_eq!(record.evidence_strength(), 3);
    assert_eq!(record.risk_score(), 92);
    assert_eq!(record.evidence_spans().as_slice(), ["13812345678"]);
}

#[test]
fn test_adjacent_phone_numbers_are_both_captured() {
    let record = extract(&["13812345678 13987654321"]);

    assert_eq!(record.risk_score(), 92);
    let spans = record.evidence_spans().as_slice();
    assert_eq!(spans[0], "13812345678");
    assert_eq!(spans[1], "13987654321");
}

#[test]
fn test_phone_glued_to_digits_is_not_strict() {
    let hits = PatternSet::shared().scan(&PreparedText::from_texts(["ref 013812345678"]));

    assert!(!hits.phone);
    assert!(hits.long_digits);
}

#[test]
fn test_phone_with_country_prefix() {
    let hits = PatternSet::shared().scan(&PreparedText::from_texts(["+86 13812345678"]));

    assert!(hits.phone);
    assert!(hits.matches.iter().any(|m| m == "+86 13812345678"));
}

#[test]
fn test_extractors_share_compiled_patterns() {
    let a = RuleExtractor::new();
    let b = RuleExtractor::default();

    assert!(std::ptr::eq(a.patterns(), b.patterns()));
    assert!(std::ptr::eq(a.patterns(), PatternSet::shared()));
}

#[test]
fn test_obfuscated_phone_is_folded() {
    let record = extract(&["call 1381234567O"]);

    assert_eq!(record.risk_score(), 92);
    assert!(record.evidence_spans().iter().any(|s| s == "13812345670"));
}

#[test]
fn test_full_width_digits_are_folded() {
    assert_eq!(fold_confusables("１３８"), "138");
    assert_eq!(fold_confusables("lOl|"), "1011");
}

#[test]
fn test_qq_id_is_strong_ad() {
    let record = extract(&["QQ: 123456"]);

    assert_eq!(record.category(), &Category::Ad);
    assert_eq!(record.evidence_strength(), 3);
    assert_eq!(record.risk_score(), 92);
}

#[test]
fn test_contact_hint_plus_long_digits_is_strong_ad() {
    let record = extract(&["wechat 2233 4455"]);

    assert_eq!(record.category(), &Category::Ad);
    assert_eq!(record.evidence_strength(), 3);
    assert_eq!(record.risk_score(), 92);
}

#[test]
fn test_long_digits_alone_is_weak_ad() {
    let record = extract(&["order 9876-5432"]);

    assert_eq!(record.category(), &Category::Ad);
    assert_eq!(record.evidence_strength(), 2);
    assert_eq!(record.risk_score(), 70);
}

#[test]
fn test_short_digit_runs_ignored() {
    let record = extract(&["room 1024, price 99"]);

    assert_eq!(record.category(), &Category::Normal);
    assert_eq!(record.risk_score(), 0);
    assert!(record.evidence_spans().is_empty());
}

#[test]
fn test_benign_text_is_normal() {
    let record = extract(&["今天天气不错", "hello world"]);

    assert_eq!(record.category(), &Category::Normal);
    assert_eq!(record.evidence_strength(), 0);
    assert_eq!(record.risk_score(), 0);
}

#[test]
fn test_whitelist_is_independent_of_category() {
    let benign = extract(&["欢迎来到直播间"]);
    assert!(benign.is_whitelisted());
    assert_eq!(benign.category(), &Category::Normal);

    let mixed = extract(&["感谢关注 加v"]);
    assert!(mixed.is_whitelisted());
    assert_eq!(mixed.category(), &Category::Ad);
}

#[test]
fn test_empty_input_is_neutral() {
    let record = RuleExtractor::new().extract(&[]);
    assert!(record.is_neutral());

    let blank = extract(&["   ", ""]);
    assert!(blank.is_neutral());
}

#[test]
fn test_extraction_is_deterministic() {
    let spans = vec![TextSpan::new("加v 看福利"), TextSpan::new("私聊 13812345678")];
    let extractor = RuleExtractor::new();

    assert_eq!(extractor.extract(&spans), extractor.extract(&spans));
}

#[test]
fn test_spans_capped_at_ten() {
    let text = (0..20)
        .map(|i| format!("私聊{i} 加v{i} 微信{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    let record = extract(&[&text]);

    assert!(record.evidence_spans().len() <= crate::constants::MAX_EVIDENCE_SPANS);
}

#[test]
fn test_prepared_text_is_capped() {
    let long = "a".repeat(MAX_MATCH_TEXT_CHARS * 3);
    let prepared = PreparedText::from_texts([long.as_str()]);
    assert_eq!(prepared.raw.chars().count(), MAX_MATCH_TEXT_CHARS);
    assert_eq!(prepared.normalized.chars().count(), MAX_MATCH_TEXT_CHARS);
}

#[test]
fn test_rule_table_order() {
    let extractor = RuleExtractor::new();
    let names: Vec<_> = extractor.rules().iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        [
            "gambling_terms",
            "sexual_terms",
            "contact_identifier",
            "contact_solicitation"
        ]
    );
}

#[test]
fn test_each_rule_predicate_in_isolation() {
    let rules = default_rules();

    let gambling = PatternHits {
        gambling: true,
        ..Default::default()
    };
    assert!(rules[0].matches(&gambling));
    assert!(!rules[1].matches(&gambling));

    let hint_only = PatternHits {
        contact_hint: true,
        ..Default::default()
    };
    assert!(!rules[2].matches(&hint_only));
    assert!(rules[3].matches(&hint_only));

    let hint_and_digits = PatternHits {
        contact_hint: true,
        long_digits: true,
        ..Default::default()
    };
    assert!(rules[2].matches(&hint_and_digits));

    let nothing = PatternHits::default();
    assert!(rules.iter().all(|r| !r.matches(&nothing)));
}
