//! Scripted detector for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{DetectorError, DetectorResult};
use super::types::DetectorOutput;
use super::Detector;

#[derive(Debug, Default, Clone)]
pub struct MockDetector {
    outputs: Arc<RwLock<HashMap<PathBuf, DetectorOutput>>>,
    default_output: Arc<RwLock<DetectorOutput>>,
    failing: Arc<RwLock<bool>>,
    calls: Arc<AtomicUsize>,
}

impl MockDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector that answers every frame with `output`.
    pub fn with_output(output: DetectorOutput) -> Self {
        let mock = Self::new();
        *mock.default_output.write() = output;
        mock
    }

    /// Registers the output returned for a specific frame path.
    pub fn insert(&self, path: impl Into<PathBuf>, output: DetectorOutput) {
        self.outputs.write().insert(path.into(), output);
    }

    /// Makes every subsequent call fail as an unreadable frame.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.write() = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn detect(&self, frame_path: &Path) -> DetectorResult<DetectorOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if *self.failing.read() {
            return Err(DetectorError::UnreadableFrame {
                path: frame_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock failure"),
            });
        }

        let output = self
            .outputs
            .read()
            .get(frame_path)
            .cloned()
            .unwrap_or_else(|| self.default_output.read().clone());
        Ok(output)
    }
}
