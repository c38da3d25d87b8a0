//! Cache-first access to the semantic reviewer.
//!
//! Order of checks for every request: fingerprint, fresh cache entry, enabled, per-key
//! single-flight, rate limit, remote call under a timeout. Every path produces an
//! [`EvidenceRecord`]; nothing here returns an error to the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use super::backend::ReviewBackend;
use super::cache::{
    CacheEntry, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_COOLDOWN_SECS,
    VerdictCache,
};
use super::error::{ReviewerError, ReviewerResult};
use super::limiter::{DEFAULT_RATE_LIMIT_PER_MINUTE, MAX_RATE_LIMIT_PER_MINUTE, RateLimiter};
use super::parse::parse_verdict;
use super::types::{DegradeReason, ReviewKind, ReviewOutcome, ReviewPayload};
use crate::clock::{SharedClock, system_clock};
use crate::constants::{MAX_REVIEW_CONTEXT_CHARS, truncate_chars};
use crate::evidence::EvidenceRecord;
use crate::hashing::{Fingerprint, cache_key, fingerprint_bytes, fingerprint_text};

pub const DEFAULT_REVIEWER_TIMEOUT_MS: u64 = 8_000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub cache_ttl: Duration,
    pub cooldown: Duration,
    pub cache_capacity: u64,
    pub rate_limit_per_minute: usize,
    pub call_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            call_timeout: Duration::from_millis(DEFAULT_REVIEWER_TIMEOUT_MS),
        }
    }
}

impl GatewayConfig {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn rate_limit_per_minute(mut self, limit: usize) -> Self {
        self.rate_limit_per_minute = limit;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn validate(&self) -> ReviewerResult<()> {
        if self.cache_ttl.is_zero() {
            return Err(ReviewerError::Config {
                reason: "cache TTL must be positive".to_string(),
            });
        }
        if self.cooldown > self.cache_ttl {
            return Err(ReviewerError::Config {
                reason: format!(
                    "cooldown ({}s) exceeds cache TTL ({}s)",
                    self.cooldown.as_secs(),
                    self.cache_ttl.as_secs()
                ),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ReviewerError::Config {
                reason: "cache capacity must be positive".to_string(),
            });
        }
        if !(1..=MAX_RATE_LIMIT_PER_MINUTE).contains(&self.rate_limit_per_minute) {
            return Err(ReviewerError::Config {
                reason: format!(
                    "rate limit must be within 1..={MAX_RATE_LIMIT_PER_MINUTE}, got {}",
                    self.rate_limit_per_minute
                ),
            });
        }
        if self.call_timeout.is_zero() {
            return Err(ReviewerError::Config {
                reason: "reviewer timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

pub struct ReviewerGateway<B: ReviewBackend> {
    backend: B,
    config: GatewayConfig,
    cache: VerdictCache,
    limiter: RateLimiter,
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    remote_calls: AtomicU64,
}

impl<B: ReviewBackend> std::fmt::Debug for ReviewerGateway<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerGateway")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("limiter", &self.limiter)
            .field("remote_calls", &self.remote_calls())
            .finish()
    }
}

impl<B: ReviewBackend> ReviewerGateway<B> {
    pub fn new(backend: B, config: GatewayConfig) -> Self {
        Self::with_clock(backend, config, system_clock())
    }

    /// Gateway whose cache ages and rate window read time from `clock`.
    pub fn with_clock(backend: B, config: GatewayConfig, clock: SharedClock) -> Self {
        let cache = VerdictCache::new(
            config.cache_capacity,
            config.cache_ttl,
            config.cooldown,
            clock.clone(),
        );
        let limiter = RateLimiter::per_minute(config.rate_limit_per_minute, clock);
        Self {
            backend,
            config,
            cache,
            limiter,
            inflight: Mutex::new(HashMap::new()),
            remote_calls: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn cache(&self) -> &VerdictCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Number of requests actually sent to the backend.
    pub fn remote_calls(&self) -> u64 {
        self.remote_calls.load(Ordering::Relaxed)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.backend.is_configured()
    }

    /// Cached entry for `fingerprint`/`kind`, if still within TTL.
    pub fn peek(&self, fingerprint: &Fingerprint, kind: ReviewKind) -> Option<CacheEntry> {
        self.cache.peek(&cache_key(fingerprint, kind))
    }

    /// Reviews a textual context, truncated to the reviewer context limit before fingerprinting.
    pub async fn review_text(&self, context: &str) -> ReviewOutcome {
        let context = truncate_chars(context.trim(), MAX_REVIEW_CONTEXT_CHARS);
        let fingerprint = (!context.is_empty()).then(|| fingerprint_text(&context));
        self.review(fingerprint, ReviewPayload::Text(&context)).await
    }

    /// Reviews frame bytes. `None` or empty bytes degrade without a call.
    pub async fn review_visual(&self, image: Option<&[u8]>) -> ReviewOutcome {
        let image = image.filter(|bytes| !bytes.is_empty());
        let fingerprint = image.map(fingerprint_bytes);
        self.review(fingerprint, ReviewPayload::Visual(image.unwrap_or_default()))
            .await
    }

    #[instrument(skip_all, fields(kind = %payload.kind()))]
    pub async fn review(
        &self,
        fingerprint: Option<Fingerprint>,
        payload: ReviewPayload<'_>,
    ) -> ReviewOutcome {
        let kind = payload.kind();
        let Some(fingerprint) = fingerprint else {
            warn!("Review skipped: content has no fingerprint");
            return ReviewOutcome::degraded(DegradeReason::NoFingerprint);
        };
        let key = cache_key(&fingerprint, kind);

        if let Some(entry) = self.cache.lookup(&key).fresh() {
            debug!(key = %key, "Verdict cache hit");
            return ReviewOutcome::Cached(entry.value);
        }

        if !self.is_enabled() {
            return self.store_degraded(&key, DegradeReason::Disabled);
        }

        let lock = self.inflight_lock(&key);
        let outcome = {
            let _guard = lock.lock().await;
            match self.cache.lookup(&key).fresh() {
                Some(entry) => {
                    debug!(key = %key, "Verdict filled by concurrent review");
                    ReviewOutcome::Cached(entry.value)
                }
                None => self.call_backend(&key, payload).await,
            }
        };
        self.release_inflight(&key, &lock);

        outcome
    }

    async fn call_backend(&self, key: &str, payload: ReviewPayload<'_>) -> ReviewOutcome {
        let kind = payload.kind();

        if !self.limiter.try_acquire() {
            info!(
                limit = self.limiter.max_calls(),
                "Reviewer rate limit reached, degrading"
            );
            return self.store_degraded(key, DegradeReason::RateLimited);
        }

        self.remote_calls.fetch_add(1, Ordering::Relaxed);
        let call = async {
            match payload {
                ReviewPayload::Text(context) => self.backend.review_text(context).await,
                ReviewPayload::Visual(image) => self.backend.review_visual(image).await,
            }
        };

        let result = match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(Ok(content)) => parse_verdict(kind, &content),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ReviewerError::Timeout {
                after_ms: self.config.call_timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(record) => {
                info!(
                    category = %record.category(),
                    score = record.risk_score(),
                    strength = record.evidence_strength(),
                    "Reviewer verdict"
                );
                self.cache.insert(key, record.clone());
                ReviewOutcome::Reviewed(record)
            }
            Err(e) => {
                warn!(error = %e, "Reviewer call failed, degrading");
                self.store_degraded(key, DegradeReason::Failed(e.to_string()))
            }
        }
    }

    fn store_degraded(&self, key: &str, reason: DegradeReason) -> ReviewOutcome {
        let record = EvidenceRecord::neutral(reason.to_string());
        self.cache.insert(key, record.clone());
        ReviewOutcome::Degraded { reason, record }
    }

    fn inflight_lock(&self, key: &str) -> Arc<AsyncMutex<()>> {
        self.inflight
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Drops the per-key lock once no other task holds or awaits it.
    fn release_inflight(&self, key: &str, lock: &Arc<AsyncMutex<()>>) {
        let mut inflight = self.inflight.lock();
        if let Some(current) = inflight.get(key)
            && Arc::ptr_eq(current, lock)
            && Arc::strong_count(lock) <= 2
        {
            inflight.remove(key);
        }
    }
}
