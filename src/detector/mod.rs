//! L1 detector seam: object/text detection plus secondary heuristics.
//!
//! The detector itself is an external model service. This module defines what the engine
//! consumes ([`DetectorOutput`]), the [`Detector`] trait, an HTTP client for a detector sidecar,
//! and a scripted mock.

pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;


use std::path::Path;

use async_trait::async_trait;

pub use error::{DetectorError, DetectorResult};
pub use http::{DEFAULT_DETECTOR_TIMEOUT_MS, HttpDetector};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockDetector;
pub use types::{BoundingBox, Detection, DetectorOutput, HitSummary, TextSpan};

/// Produces L1 signals for a frame on disk.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, frame_path: &Path) -> DetectorResult<DetectorOutput>;
}
