use crate::detector::HitSummary;

/// Detector labels that block without further review.
pub const HARD_BLOCK_LABELS: &[&str] = &[
    "knife",
    "scissors",
    "gun",
    "pistol",
    "rifle",
    "weapon",
    "baseball bat",
    "fire",
    "qr code",
    "qrcode",
    "qr_code",
    "barcode",
    "contact_marker",
    "risky_content",
];

/// Synthetic label reported when the detector flags a scannable code marker.
pub const CODE_MARKER_LABEL: &str = "code_marker";

pub const HARD_BLOCK_CATEGORY: &str = "HardBlock";

/// Hard-block labels present in `labels` (already normalized), in detection order, deduplicated.
pub fn hard_block_hits(labels: &[String], summary: &HitSummary) -> Vec<String> {
    let mut hits: Vec<String> = Vec::new();
    for label in labels {
        if HARD_BLOCK_LABELS.contains(&label.as_str()) && !hits.contains(label) {
            hits.push(label.clone());
        }
    }
    if summary.code_marker_found {
        hits.push(CODE_MARKER_LABEL.to_string());
    }
    hits
}
