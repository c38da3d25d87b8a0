//! Evidence records shared by the rule extractor, the reviewer gateway and the fusion engine.

pub mod types;

#[cfg(test)]
mod tests;

pub use types::{Category, EvidenceRecord, EvidenceSpans, clamp_score, clamp_strength};
