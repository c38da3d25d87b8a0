use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::error::{DetectorError, DetectorResult};
use super::types::DetectorOutput;
use super::Detector;

pub const DEFAULT_DETECTOR_TIMEOUT_MS: u64 = 5_000;

/// Client for a detector sidecar that accepts raw frame bytes and answers with
/// [`DetectorOutput`] JSON.
#[derive(Debug, Clone)]
pub struct HttpDetector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDetector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> DetectorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Detector for HttpDetector {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn detect(&self, frame_path: &Path) -> DetectorResult<DetectorOutput> {
        let bytes =
            tokio::fs::read(frame_path)
                .await
                .map_err(|source| DetectorError::UnreadableFrame {
                    path: frame_path.to_path_buf(),
                    source,
                })?;

        if bytes.is_empty() {
            return Err(DetectorError::UnsupportedFrame {
                path: frame_path.to_path_buf(),
                reason: "frame is empty".to_string(),
            });
        }

        debug!(frame_bytes = bytes.len(), "Posting frame to detector");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DetectorError::Status {
                status: status.as_u16(),
                body: crate::constants::truncate_chars(&body, 200),
            });
        }

        serde_json::from_str(&body).map_err(|e| DetectorError::Decode {
            reason: e.to_string(),
        })
    }
}
