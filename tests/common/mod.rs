//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use riskgate::{
    Detection, DetectorOutput, EngineConfig, FusionEngine, GatewayConfig, ManualClock,
    MockDetector, MockReviewBackend, PolicyStore, ReviewerGateway, SharedClock, TextSpan,
};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const POLICY_YAML: &str = r#"
rules:
  - category: Normal
    risk_threshold: 80
    action: pass
    label_cn: 合规
  - category: Ad
    risk_threshold: 80
    action: block
    label_cn: 违规广告
    rule_id: ad-contact
  - category: Sex
    risk_threshold: 75
    action: block
  - category: Gambling
    risk_threshold: 70
    action: block
"#;

pub struct Harness {
    pub engine: FusionEngine<MockReviewBackend>,
    pub detector: MockDetector,
    pub backend: MockReviewBackend,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(output: DetectorOutput) -> Self {
        Self::with_gateway(output, GatewayConfig::default())
    }

    pub fn with_gateway(output: DetectorOutput, config: GatewayConfig) -> Self {
        let detector = MockDetector::with_output(output);
        let backend = MockReviewBackend::new();
        let clock = ManualClock::new();
        let shared: SharedClock = Arc::new(clock.clone());
        let gateway = ReviewerGateway::with_clock(backend.clone(), config, shared);
        let policy = PolicyStore::from_yaml_str(POLICY_YAML).expect("policy");
        let engine = FusionEngine::new(
            Arc::new(detector.clone()),
            Arc::new(gateway),
            Arc::new(policy),
            EngineConfig::default(),
        );
        Self {
            engine,
            detector,
            backend,
            clock,
        }
    }
}

pub fn frame(labels: &[&str], texts: &[&str]) -> DetectorOutput {
    DetectorOutput {
        detections: labels.iter().map(|l| Detection::new(*l)).collect(),
        text_spans: texts.iter().map(|t| TextSpan::new(*t)).collect(),
        ..Default::default()
    }
}

pub fn skin_frame() -> DetectorOutput {
    let mut output = frame(&["person"], &[]);
    output.hit_summary.skin_trigger = true;
    output.hit_summary.skin_ratio = 0.42;
    output
}

/// Small JPEG-looking file on disk.
pub fn image_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp frame");
    file.write_all(bytes).expect("write frame");
    file.flush().expect("flush frame");
    file
}

/// Serves exactly one HTTP response on an ephemeral port.
/// Returns the base URL and a handle resolving to the raw request bytes.
pub async fn serve_once(status: u16, content_type: &str, body: String) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let content_type = content_type.to_string();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut stream).await;

        let response = format!(
            "HTTP/1.1 {status} Status\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        stream.shutdown().await.ok();
        request
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    buf
}

/// Body of a captured request (after the blank line).
pub fn request_body(request: &[u8]) -> &[u8] {
    request
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| &request[i + 4..])
        .unwrap_or_default()
}
