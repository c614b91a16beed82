//! Integration tests for the allocation engine over the in-memory store.

use std::sync::Arc;

use chrono::Duration;
use tokio::task::JoinSet;

use couponhub_core::config::{AllocationConfig, SeedCoupon};
use couponhub_core::traits::{Clock, ManualClock};
use couponhub_engine::store::{CouponCatalog, MemoryCouponStore};
use couponhub_engine::{AllocationEngine, CatalogSeeder, ClaimError, ClaimLedger};
use couponhub_entity::coupon::NewCoupon;

fn config(max_claims_per_session: u32, cooldown_seconds: u64) -> AllocationConfig {
    AllocationConfig {
        max_claims_per_session,
        cooldown_seconds,
        seed_coupons: vec![],
    }
}

fn setup(
    config: &AllocationConfig,
) -> (Arc<MemoryCouponStore>, ManualClock, AllocationEngine) {
    let store = Arc::new(MemoryCouponStore::new());
    let clock = ManualClock::default();
    let engine = AllocationEngine::new(store.clone(), Arc::new(clock.clone()), config);
    (store, clock, engine)
}

#[tokio::test]
async fn sequential_exhaustion_of_a_two_unit_coupon() {
    // Fresh catalog, one coupon with capacity 2; third claimant finds
    // the pool exhausted.
    let (store, clock, engine) = setup(&config(10, 10));
    store
        .insert(&NewCoupon::new("SUMMER20", "20% off", "summer sale", 2))
        .await
        .unwrap();

    assert_eq!(engine.claim("s1", Some("ip1")).await.unwrap().code, "SUMMER20");
    clock.advance(Duration::seconds(11));
    assert_eq!(engine.claim("s2", Some("ip2")).await.unwrap().code, "SUMMER20");
    clock.advance(Duration::seconds(11));

    assert!(matches!(
        engine.claim("s3", Some("ip3")).await.unwrap_err(),
        ClaimError::NoCouponsAvailable
    ));
}

#[tokio::test]
async fn session_cap_applies_across_origins() {
    let (store, _clock, engine) = setup(&config(1, 0));
    store
        .insert(&NewCoupon::new("SUMMER20", "20% off", "summer sale", 10))
        .await
        .unwrap();

    engine.claim("s1", Some("ip1")).await.unwrap();

    // Different, unused origin; the session cap still binds.
    match engine.claim("s1", Some("ip2")).await.unwrap_err() {
        ClaimError::SessionClaimLimitExceeded { limit } => assert_eq!(limit, 1),
        other => panic!("expected session cap, got {other:?}"),
    }
}

#[tokio::test]
async fn origin_cooldown_applies_across_sessions() {
    let (store, clock, engine) = setup(&config(10, 10));
    store
        .insert(&NewCoupon::new("SUMMER20", "20% off", "summer sale", 10))
        .await
        .unwrap();

    engine.claim("s1", Some("ip1")).await.unwrap();

    // Same origin, different session, still inside the window.
    assert!(matches!(
        engine.claim("s2", Some("ip1")).await.unwrap_err(),
        ClaimError::OriginCooldownActive { .. }
    ));

    clock.advance(Duration::seconds(10));
    engine.claim("s2", Some("ip1")).await.unwrap();
}

#[tokio::test]
async fn boundary_last_unit_deactivates_coupon() {
    let (store, _clock, engine) = setup(&config(10, 0));
    let coupon = store
        .insert(&NewCoupon::new("LAST1", "5% off", "almost gone", 3))
        .await
        .unwrap();

    engine.claim("s1", None).await.unwrap();
    engine.claim("s2", None).await.unwrap();
    assert_eq!(engine.list_available().await.unwrap().len(), 1);

    // The final unit is accepted, then the coupon leaves the listing.
    engine.claim("s3", None).await.unwrap();
    assert!(engine.list_available().await.unwrap().is_empty());
    assert!(store.find_eligible().await.unwrap().is_none());
    assert_eq!(store.find_by_coupon(coupon.id).await.unwrap().len(), 3);

    assert!(matches!(
        engine.claim("s4", None).await.unwrap_err(),
        ClaimError::NoCouponsAvailable
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_claims_never_oversell() {
    // 50 tasks race for a single coupon with capacity 10: exactly 10
    // succeed, the rest see pool exhaustion, and the ledger matches the
    // counter.
    let (store, _clock, engine) = setup(&config(10, 0));
    let coupon = store
        .insert(&NewCoupon::new("HAMMER", "50% off", "contended", 10))
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..50 {
        let engine = engine.clone();
        tasks.spawn(async move {
            engine
                .claim(&format!("session-{i}"), Some(&format!("10.0.0.{i}")))
                .await
        });
    }

    let mut successes = 0;
    let mut exhausted = 0;
    while let Some(result) = tasks.join_next().await {
        match result.expect("task panicked") {
            Ok(public) => {
                assert_eq!(public.code, "HAMMER");
                successes += 1;
            }
            Err(ClaimError::NoCouponsAvailable) => exhausted += 1,
            Err(other) => panic!("unexpected claim failure: {other:?}"),
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(exhausted, 40);
    assert_eq!(store.find_by_coupon(coupon.id).await.unwrap().len(), 10);
    assert!(store.find_eligible().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_claims_spill_into_next_coupon() {
    let (store, _clock, engine) = setup(&config(10, 0));
    store
        .insert(&NewCoupon::new("POOL1", "10% off", "first pool", 5))
        .await
        .unwrap();
    store
        .insert(&NewCoupon::new("POOL2", "10% off", "second pool", 5))
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..20 {
        let engine = engine.clone();
        tasks.spawn(async move { engine.claim(&format!("session-{i}"), None).await });
    }

    let mut successes = 0;
    while let Some(result) = tasks.join_next().await {
        if result.expect("task panicked").is_ok() {
            successes += 1;
        }
    }

    // Both pools drain fully; no unit is lost to races.
    assert_eq!(successes, 10);
    assert!(engine.list_available().await.unwrap().is_empty());
}

#[tokio::test]
async fn ledger_matches_counters_after_mixed_outcomes() {
    let (store, clock, engine) = setup(&config(2, 10));
    let coupon = store
        .insert(&NewCoupon::new("AUDIT", "15% off", "audited", 10))
        .await
        .unwrap();

    engine.claim("s1", Some("ip1")).await.unwrap();

    // Rejected attempts must not consume capacity or touch the ledger.
    assert!(engine.claim("s2", Some("ip1")).await.is_err()); // cooldown
    assert!(engine.claim("", Some("ip2")).await.is_err()); // missing session

    clock.advance(Duration::seconds(10));
    engine.claim("s1", Some("ip2")).await.unwrap();
    clock.advance(Duration::seconds(10));
    assert!(engine.claim("s1", Some("ip3")).await.is_err()); // session cap

    let claims = store.find_by_coupon(coupon.id).await.unwrap();
    assert_eq!(claims.len(), 2);
    assert_eq!(store.count_by_session("s1").await.unwrap(), 2);
    assert_eq!(store.count_by_session("s2").await.unwrap(), 0);
}

#[tokio::test]
async fn seeded_catalog_serves_claims_end_to_end() {
    let store = Arc::new(MemoryCouponStore::new());
    let clock = ManualClock::default();
    let seeder = CatalogSeeder::new(store.clone());

    let seeds = vec![SeedCoupon {
        code: "SUMMER20".to_string(),
        discount: "20% off".to_string(),
        description: "20% off the summer collection".to_string(),
        claim_limit: 2,
    }];
    assert_eq!(seeder.seed_if_empty(&seeds).await.unwrap(), 1);
    assert_eq!(seeder.seed_if_empty(&seeds).await.unwrap(), 0);

    let engine = AllocationEngine::new(store, Arc::new(clock.clone()), &config(10, 10));
    assert_eq!(engine.claim("s1", Some("ip1")).await.unwrap().code, "SUMMER20");
    clock.advance(Duration::seconds(11));
    assert_eq!(engine.claim("s2", Some("ip2")).await.unwrap().code, "SUMMER20");
    clock.advance(Duration::seconds(11));
    assert!(matches!(
        engine.claim("s3", Some("ip3")).await.unwrap_err(),
        ClaimError::NoCouponsAvailable
    ));
}

#[tokio::test]
async fn manual_clock_is_shared_with_engine() {
    let (_store, clock, _engine) = setup(&config(10, 10));
    let before = clock.now();
    clock.advance(Duration::seconds(30));
    assert_eq!(clock.now() - before, Duration::seconds(30));
}
