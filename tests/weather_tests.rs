//! Report resolver tests against fake collaborators.

mod common;

use common::{FailingStore, FakeUpstream, Harness, KEY, NOW, london};
use serde_json::json;
use std::sync::Arc;
use weather_quota_api::{
    Location, ManualClock, QuotaConfig, QuotaGate, ReportResolver, ResolveError, WeatherConfig,
    WeatherReport,
};

fn cloudy() -> FakeUpstream {
    FakeUpstream::returning(json!({"weather": [{"description": "Cloudy"}]}))
}

#[tokio::test]
async fn test_fresh_cached_report_is_returned_verbatim() {
    let harness = Harness::new(cloudy());
    let cached = harness
        .store
        .seed(WeatherReport::new(london(), "Sunny", NOW - 1800))
        .await;

    let report = harness.resolver().resolve(&london(), KEY).await.unwrap();

    assert_eq!(report, cached);
    assert_eq!(harness.upstream.calls(), 0, "fresh report must not hit the provider");
    assert_eq!(harness.store.saves(), 0);
}

#[tokio::test]
async fn test_report_exactly_at_freshness_limit_is_stale() {
    let harness = Harness::new(cloudy());
    harness
        .store
        .seed(WeatherReport::new(london(), "Sunny", NOW - 3600))
        .await;

    let report = harness.resolver().resolve(&london(), KEY).await.unwrap();

    assert_eq!(report.description, "Cloudy");
    assert_eq!(harness.upstream.calls(), 1);
    assert_eq!(harness.store.saves(), 1);
}

#[tokio::test]
async fn test_old_report_triggers_single_fetch() {
    let harness = Harness::new(cloudy());
    harness
        .store
        .seed(WeatherReport::new(london(), "Sunny", NOW - 7200))
        .await;

    harness.resolver().resolve(&london(), KEY).await.unwrap();

    assert_eq!(harness.upstream.calls(), 1);
}

#[tokio::test]
async fn test_miss_fetches_validates_and_saves() {
    let harness = Harness::new(cloudy());

    let report = harness.resolver().resolve(&london(), KEY).await.unwrap();

    assert_eq!(report.description, "Cloudy");
    assert_eq!(report.location, london());
    assert_eq!(report.observed_at, NOW);
    assert!(report.id.is_some(), "returned report is the stored one");
    assert_eq!(harness.store.saves(), 1);
    assert_eq!(harness.upstream.credentials(), vec![KEY.to_string()]);
}

#[tokio::test]
async fn test_saved_report_is_served_from_cache_afterwards() {
    let harness = Harness::new(cloudy());
    let resolver = harness.resolver();

    let first = resolver.resolve(&london(), KEY).await.unwrap();
    harness.clock.advance_secs(60);
    let second = resolver.resolve(&london(), KEY).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.upstream.calls(), 1);
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected_without_saving() {
    let payloads = [
        FakeUpstream::returning(json!({})),
        FakeUpstream::returning(json!({"weather": []})),
        FakeUpstream::returning(json!({"weather": [{"description": ""}]})),
        FakeUpstream::returning(json!({"weather": ["rain"]})),
        FakeUpstream::returning(json!({"weather": [{"main": "Rain"}]})),
        FakeUpstream::returning_nothing(),
    ];

    for upstream in payloads {
        let harness = Harness::new(upstream);

        let err = harness.resolver().resolve(&london(), KEY).await.unwrap_err();

        assert!(
            matches!(err, ResolveError::UpstreamUnavailable(_)),
            "unexpected error: {err:?}"
        );
        assert_eq!(harness.upstream.calls(), 1);
        assert_eq!(harness.store.saves(), 0);
    }
}

#[tokio::test]
async fn test_provider_failure_is_not_retried() {
    let harness = Harness::new(FakeUpstream::failing());

    let err = harness.resolver().resolve(&london(), KEY).await.unwrap_err();

    assert!(matches!(err, ResolveError::UpstreamUnavailable(_)));
    assert_eq!(harness.upstream.calls(), 1);
    assert_eq!(harness.store.saves(), 0);
}

#[tokio::test]
async fn test_unknown_credential_touches_nothing() {
    let harness = Harness::new(cloudy());

    let err = harness
        .resolver()
        .resolve(&london(), "NOT_A_KEY")
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::InvalidCredential));
    assert_eq!(harness.store.lookups(), 0);
    assert_eq!(harness.upstream.calls(), 0);
    for key in harness.gate.credentials() {
        assert_eq!(harness.gate.remaining(key), Some(5), "{key} quota untouched");
    }
}

#[tokio::test]
async fn test_quota_exceeded_after_max_requests() {
    let harness = Harness::new(cloudy());
    let resolver = harness.resolver();

    for _ in 0..5 {
        resolver.resolve(&london(), KEY).await.unwrap();
    }
    let err = resolver.resolve(&london(), KEY).await.unwrap_err();

    assert!(matches!(err, ResolveError::QuotaExceeded));
    assert_eq!(harness.store.lookups(), 5, "denied request never reaches the store");

    // Another key still has its own quota
    assert!(resolver.resolve(&london(), "API_KEY_2").await.is_ok());

    harness.clock.advance_secs(3600);
    assert!(resolver.resolve(&london(), KEY).await.is_ok());
}

#[tokio::test]
async fn test_store_failure_is_unexpected() {
    let clock = ManualClock::at_epoch_seconds(NOW);
    let gate = Arc::new(QuotaGate::new(&QuotaConfig::default(), Arc::new(clock.clone())));
    let upstream = Arc::new(cloudy());
    let resolver = ReportResolver::new(
        gate,
        Arc::new(FailingStore),
        upstream.clone(),
        Arc::new(clock),
        &WeatherConfig::default(),
    );

    let err = resolver.resolve(&london(), KEY).await.unwrap_err();

    assert!(matches!(err, ResolveError::Unexpected(_)));
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_misses_are_not_coalesced() {
    let harness = Harness::new(cloudy());
    let resolver = harness.resolver();

    let (loc_a, loc_b) = (london(), london());
    let (a, b) = tokio::join!(
        resolver.resolve(&loc_a, KEY),
        resolver.resolve(&loc_b, "API_KEY_2"),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(harness.upstream.calls(), 2);
    assert_eq!(harness.store.saves(), 2);
    assert_eq!(harness.store.inner.count_for(&london()), 2);
}

#[tokio::test]
async fn test_locations_are_cached_independently() {
    let harness = Harness::new(cloudy());
    harness
        .store
        .seed(WeatherReport::new(london(), "Sunny", NOW - 10))
        .await;

    let paris = Location::new("Paris", "FR");
    let report = harness.resolver().resolve(&paris, KEY).await.unwrap();

    assert_eq!(report.location, paris);
    assert_eq!(harness.upstream.calls(), 1);
}
