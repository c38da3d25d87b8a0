//! Reviewer gateway caching, cooldown and rate limiting against a fake clock.

use std::sync::Arc;
use std::time::Duration;

use riskgate::reviewer::CacheLookup;
use riskgate::{
    DegradeReason, GatewayConfig, ManualClock, MockReply, MockReviewBackend, ReviewKind,
    ReviewOutcome, ReviewerGateway, SharedClock, cache_key, fingerprint_bytes,
};
use serde_json::json;

fn gateway(config: GatewayConfig) -> (ReviewerGateway<MockReviewBackend>, MockReviewBackend, ManualClock) {
    let backend = MockReviewBackend::new();
    let clock = ManualClock::new();
    let shared: SharedClock = Arc::new(clock.clone());
    (
        ReviewerGateway::with_clock(backend.clone(), config, shared),
        backend,
        clock,
    )
}

#[tokio::test]
async fn test_cooldown_then_stale_then_expired() {
    let (gateway, backend, clock) = gateway(GatewayConfig::default());
    backend.set_visual_reply(MockReply::verdict(json!({
        "category": "Sex",
        "risk_score": 88,
        "evidence_strength": 3,
        "visual_evidence": "exposure"
    })));
    let image = b"\xff\xd8\xff\xe0frame".as_slice();
    let key = cache_key(&fingerprint_bytes(image), ReviewKind::Visual);

    assert!(matches!(
        gateway.review_visual(Some(image)).await,
        ReviewOutcome::Reviewed(_)
    ));

    clock.advance(Duration::from_secs(10));
    assert!(gateway.review_visual(Some(image)).await.is_cached());
    assert!(matches!(gateway.cache().lookup(&key), CacheLookup::Fresh(_)));

    clock.advance(Duration::from_secs(10));
    assert!(matches!(gateway.cache().lookup(&key), CacheLookup::Stale(_)));

    clock.advance(Duration::from_secs(290));
    assert_eq!(gateway.cache().lookup(&key), CacheLookup::Miss);
    assert_eq!(backend.visual_calls(), 1);
}

#[tokio::test]
async fn test_cache_hit_keeps_original_timestamp() {
    let (gateway, _backend, clock) = gateway(GatewayConfig::default());
    let fingerprint = riskgate::fingerprint_text("加v");

    gateway.review_text("加v").await;
    let written = gateway
        .peek(&fingerprint, ReviewKind::Text)
        .expect("entry")
        .timestamp;

    clock.advance(Duration::from_secs(5));
    assert!(gateway.review_text("加v").await.is_cached());

    let after_hit = gateway
        .peek(&fingerprint, ReviewKind::Text)
        .expect("entry")
        .timestamp;
    assert_eq!(written, after_hit);
}

#[tokio::test]
async fn test_rate_limited_result_is_cached_under_key() {
    let (gateway, backend, clock) = gateway(GatewayConfig::default().rate_limit_per_minute(1));

    gateway.review_text("first").await;
    let limited = gateway.review_text("second").await;
    assert_eq!(limited.degrade_reason(), Some(&DegradeReason::RateLimited));

    let again = gateway.review_text("second").await;
    assert!(again.is_cached());
    assert!(again.record().is_neutral());
    assert_eq!(backend.text_calls(), 1);

    clock.advance(Duration::from_secs(61));
    assert!(matches!(
        gateway.review_text("second").await,
        ReviewOutcome::Reviewed(_)
    ));
    assert_eq!(backend.text_calls(), 2);
}

#[tokio::test]
async fn test_limiter_window_not_consumed_by_cache_hits() {
    let (gateway, _backend, _clock) = gateway(GatewayConfig::default().rate_limit_per_minute(3));

    for _ in 0..5 {
        gateway.review_text("same context").await;
    }

    assert_eq!(gateway.limiter().in_window(), 1);
    assert_eq!(gateway.remote_calls(), 1);
}

#[tokio::test]
async fn test_single_flight_across_tasks() {
    let backend = MockReviewBackend::new();
    backend.set_delay(Duration::from_millis(50));
    let gateway = Arc::new(ReviewerGateway::new(backend.clone(), GatewayConfig::default()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.review_text("兼职 刷单").await })
        })
        .collect();

    for task in tasks {
        let outcome = task.await.expect("task");
        assert!(!outcome.is_degraded());
    }
    assert_eq!(backend.text_calls(), 1);
}
