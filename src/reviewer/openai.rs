//! OpenAI-compatible chat-completions backend (DashScope compatible mode by default).

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::backend::ReviewBackend;
use super::error::{ReviewerError, ReviewerResult};
use crate::constants::{MAX_REVIEW_CONTEXT_CHARS, truncate_chars};

pub const DEFAULT_REVIEWER_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_REVIEWER_MODEL: &str = "qwen-vl-plus";
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

const TEXT_REVIEW_PROMPT: &str = r#"Role: content moderation expert.
Task: audit the provided text for risks (Sex, Gambling, Ad, Violence, or evasive language such as homophones and onomatopoeia used for solicitation).
Rules:
1. Respond with a single JSON object.
2. "reason" must be concise (under 12 words).
3. "evidence_spans" must quote the exact substrings that justify the verdict; use [] if none.
4. "evidence_strength" is 0 (nothing), 1 (vague), 2 (clear), or 3 (explicit, e.g. contact id or gambling site).
5. Pornographic solicitation or gambling requires risk_score > 85.
Output format: {"category": "Ad", "risk_score": 90, "evidence_strength": 2, "evidence_spans": ["加v"], "reason": "solicitation via homophone"}"#;

const VISUAL_REVIEW_PROMPT: &str = r#"Role: content moderation expert for live-stream frames.
Task: decide whether the image shows sexual exposure, gambling, violence, or advertising.
Rules:
1. Respond with a single JSON object.
2. "visual_evidence" must describe what is visible that justifies the verdict; use "" if nothing.
3. "evidence_strength" is 0 (nothing), 1 (vague), 2 (clear), or 3 (explicit).
4. Set "is_whitelisted" to true for ordinary scenes such as swimwear at a pool or medical imagery.
Output format: {"category": "Sex", "risk_score": 90, "evidence_strength": 3, "visual_evidence": "exposed genitals", "is_whitelisted": false, "reason": "explicit nudity"}"#;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REVIEWER_URL.to_string(),
            api_key: None,
            model: DEFAULT_REVIEWER_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BackendConfig {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatBackend {
    client: Client,
    config: BackendConfig,
    endpoint: String,
}

impl OpenAiCompatBackend {
    pub fn new(config: BackendConfig) -> ReviewerResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request_body(&self, system_prompt: &str, user_content: Value) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "response_format": { "type": "json_object" },
        })
    }

    async fn complete(&self, body: Value) -> ReviewerResult<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(ReviewerError::Config {
                reason: "reviewer API key not set".to_string(),
            });
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewerError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, 200),
            });
        }

        let completion: ChatCompletion =
            response.json().await.map_err(|e| ReviewerError::Malformed {
                reason: e.to_string(),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ReviewerError::Malformed {
                reason: "empty completion".to_string(),
            })?;

        debug!(chars = content.len(), "Reviewer completion received");
        Ok(content)
    }
}

impl ReviewBackend for OpenAiCompatBackend {
    async fn review_text(&self, context: &str) -> ReviewerResult<String> {
        let context = truncate_chars(context, MAX_REVIEW_CONTEXT_CHARS);
        let body = self.request_body(
            TEXT_REVIEW_PROMPT,
            Value::String(format!("Audit target: {context}")),
        );
        self.complete(body).await
    }

    async fn review_visual(&self, image: &[u8]) -> ReviewerResult<String> {
        let url = image_data_url(image);
        let body = self.request_body(
            VISUAL_REVIEW_PROMPT,
            json!([
                { "type": "image_url", "image_url": { "url": url } },
                { "type": "text", "text": "Audit this frame." },
            ]),
        );
        self.complete(body).await
    }

    fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// `data:` URL for raw image bytes, sniffing the MIME type from magic bytes.
pub fn image_data_url(image: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    format!("data:{};base64,{}", sniff_image_mime(image), encoded)
}

pub fn sniff_image_mime(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => "image/jpeg",
    }
}
