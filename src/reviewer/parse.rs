//! Defensive decoding of backend verdicts.
//!
//! Missing fields default to neutral values, numbers are clamped, text is length-capped. Only a
//! payload that is not a JSON object at all is rejected.

use serde_json::{Map, Value};

use crate::constants::truncate_chars;
use crate::evidence::{Category, EvidenceRecord, EvidenceSpans};

use super::error::{ReviewerError, ReviewerResult};
use super::types::ReviewKind;

const MAX_RAW_IN_ERROR: usize = 80;

pub fn parse_verdict(kind: ReviewKind, content: &str) -> ReviewerResult<EvidenceRecord> {
    let body = extract_json_object(content).ok_or_else(|| ReviewerError::Malformed {
        reason: format!(
            "no JSON object in response: {:?}",
            truncate_chars(content.trim(), MAX_RAW_IN_ERROR)
        ),
    })?;

    let value: Value = serde_json::from_str(body).map_err(|e| ReviewerError::Malformed {
        reason: e.to_string(),
    })?;

    let Value::Object(fields) = value else {
        return Err(ReviewerError::Malformed {
            reason: "verdict is not a JSON object".to_string(),
        });
    };

    Ok(record_from_fields(kind, &fields))
}

fn record_from_fields(kind: ReviewKind, fields: &Map<String, Value>) -> EvidenceRecord {
    let category = fields
        .get("category")
        .and_then(Value::as_str)
        .map(Category::parse)
        .unwrap_or_default();

    let risk_score = integer_field(fields, "risk_score").unwrap_or(0);
    let evidence_strength = integer_field(fields, "evidence_strength").unwrap_or(0);
    let reason = fields
        .get("reason")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or("no reason given");

    let mut record = EvidenceRecord::new(category, risk_score, evidence_strength)
        .with_spans(span_field(fields))
        .with_reason(reason);

    if kind == ReviewKind::Visual {
        if let Some(text) = fields.get("visual_evidence").and_then(Value::as_str) {
            record = record.with_visual_evidence(text);
        }
        record = record.with_whitelisted(bool_field(fields, "is_whitelisted"));
    }

    record
}

/// Strips markdown fences and surrounding prose, returning the outermost `{...}`.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

fn integer_field(fields: &Map<String, Value>, name: &str) -> Option<i64> {
    match fields.get(name)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn bool_field(fields: &Map<String, Value>, name: &str) -> bool {
    match fields.get(name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn span_field(fields: &Map<String, Value>) -> EvidenceSpans {
    match fields.get("evidence_spans") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => std::iter::once(s.as_str()).collect(),
        _ => EvidenceSpans::new(),
    }
}
