//! Scripted reviewer backend for tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use super::backend::ReviewBackend;
use super::error::{ReviewerError, ReviewerResult};

/// One scripted backend answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw message content handed to the verdict parser.
    Content(String),
    /// Backend error.
    Fail(String),
}

impl MockReply {
    pub fn verdict(value: Value) -> Self {
        MockReply::Content(value.to_string())
    }

    pub fn neutral() -> Self {
        MockReply::Content(
            r#"{"category":"Normal","risk_score":0,"evidence_strength":0,"reason":"nothing found"}"#
                .to_string(),
        )
    }
}

impl Default for MockReply {
    fn default() -> Self {
        MockReply::neutral()
    }
}

#[derive(Debug, Default)]
struct ReplyScript {
    queued: VecDeque<MockReply>,
    fallback: MockReply,
}

impl ReplyScript {
    fn next(&mut self) -> MockReply {
        self.queued.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Debug, Default)]
struct MockState {
    text: Mutex<ReplyScript>,
    visual: Mutex<ReplyScript>,
    text_calls: AtomicUsize,
    visual_calls: AtomicUsize,
    unconfigured: AtomicBool,
    delay: Mutex<Duration>,
    contexts: Mutex<Vec<String>>,
}

/// Clones share state, so a test can keep a handle after moving one into a gateway.
#[derive(Debug, Default, Clone)]
pub struct MockReviewBackend {
    state: Arc<MockState>,
}

impl MockReviewBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used for every text call once the queue is drained.
    pub fn set_text_reply(&self, reply: MockReply) {
        self.state.text.lock().fallback = reply;
    }

    pub fn set_visual_reply(&self, reply: MockReply) {
        self.state.visual.lock().fallback = reply;
    }

    pub fn push_text_reply(&self, reply: MockReply) {
        self.state.text.lock().queued.push_back(reply);
    }

    pub fn push_visual_reply(&self, reply: MockReply) {
        self.state.visual.lock().queued.push_back(reply);
    }

    /// Sleeps this long inside every call.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock() = delay;
    }

    pub fn set_configured(&self, configured: bool) {
        self.state.unconfigured.store(!configured, Ordering::SeqCst);
    }

    pub fn text_calls(&self) -> usize {
        self.state.text_calls.load(Ordering::SeqCst)
    }

    pub fn visual_calls(&self) -> usize {
        self.state.visual_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.text_calls() + self.visual_calls()
    }

    /// Text contexts received, in call order.
    pub fn contexts(&self) -> Vec<String> {
        self.state.contexts.lock().clone()
    }

    async fn answer(&self, reply: MockReply) -> ReviewerResult<String> {
        let delay = *self.state.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            MockReply::Content(content) => Ok(content),
            MockReply::Fail(reason) => Err(ReviewerError::Backend { reason }),
        }
    }
}

impl ReviewBackend for MockReviewBackend {
    async fn review_text(&self, context: &str) -> ReviewerResult<String> {
        self.state.text_calls.fetch_add(1, Ordering::SeqCst);
        self.state.contexts.lock().push(context.to_string());
        let reply = self.state.text.lock().next();
        self.answer(reply).await
    }

    async fn review_visual(&self, _image: &[u8]) -> ReviewerResult<String> {
        self.state.visual_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.state.visual.lock().next();
        self.answer(reply).await
    }

    fn is_configured(&self) -> bool {
        !self.state.unconfigured.load(Ordering::SeqCst)
    }
}
