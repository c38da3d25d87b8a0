use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates: `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Labeled object detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    #[serde(default, alias = "conf", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: None,
            bbox: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    /// Trimmed, lowercased label; `None` when blank.
    pub fn normalized_label(&self) -> Option<String> {
        let label = self.label.trim().to_lowercase();
        (!label.is_empty()).then_some(label)
    }
}

/// Recognized text span (OCR).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    #[serde(default, alias = "conf", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl TextSpan {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            bbox: None,
        }
    }
}

impl From<&str> for TextSpan {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Secondary per-frame signals. Drive gating, never scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitSummary {
    #[serde(default)]
    pub skin_ratio: f32,
    #[serde(default)]
    pub skin_trigger: bool,
    #[serde(default, alias = "qr_found")]
    pub code_marker_found: bool,
    #[serde(default, alias = "time_ms")]
    pub timings_ms: BTreeMap<String, u64>,
}

/// Everything the detector reports for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorOutput {
    #[serde(default, alias = "objects")]
    pub detections: Vec<Detection>,
    #[serde(default, alias = "texts")]
    pub text_spans: Vec<TextSpan>,
    #[serde(default)]
    pub hit_summary: HitSummary,
}

impl DetectorOutput {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty() && self.text_spans.is_empty()
    }

    /// Normalized labels in detection order, blanks dropped.
    pub fn normalized_labels(&self) -> Vec<String> {
        self.detections
            .iter()
            .filter_map(Detection::normalized_label)
            .collect()
    }

    /// Non-blank recognized texts, trimmed.
    pub fn texts(&self) -> Vec<&str> {
        self.text_spans
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
