//! In-memory coupon store using a Tokio mutex for single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use couponhub_core::error::AppError;
use couponhub_core::result::AppResult;
use couponhub_core::types::id::{ClaimId, CouponId};
use couponhub_entity::claim::{Claim, ClaimStatus, NewClaim};
use couponhub_entity::coupon::{canonical_code, Coupon, NewCoupon};

use super::{ClaimLedger, ClaimOutcome, CouponCatalog};

/// Internal state for the memory-based coupon store.
#[derive(Debug, Default)]
struct InnerState {
    /// Coupon catalog in insertion order.
    coupons: Vec<Coupon>,
    /// Append-only claim ledger.
    claims: Vec<Claim>,
}

/// In-memory coupon store guarded by a Tokio mutex.
///
/// Every trait method is a single critical section, so the conditional
/// increment, the deactivation at the limit, and the ledger append in
/// [`try_claim`](CouponCatalog::try_claim) are atomic by construction.
/// Suitable for single-node deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCouponStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryCouponStore {
    /// Creates a new, empty memory-based coupon store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CouponCatalog for MemoryCouponStore {
    async fn find_eligible(&self) -> AppResult<Option<Coupon>> {
        let state = self.state.lock().await;
        Ok(state.coupons.iter().find(|c| c.has_capacity()).cloned())
    }

    async fn list_available(&self) -> AppResult<Vec<Coupon>> {
        let state = self.state.lock().await;
        Ok(state
            .coupons
            .iter()
            .filter(|c| c.has_capacity())
            .cloned()
            .collect())
    }

    async fn try_claim(&self, coupon_id: CouponId, data: &NewClaim) -> AppResult<ClaimOutcome> {
        let mut state = self.state.lock().await;

        let Some(coupon) = state.coupons.iter_mut().find(|c| c.id == coupon_id) else {
            return Err(AppError::not_found(format!("Coupon {coupon_id} not found")));
        };

        if !coupon.has_capacity() {
            return Ok(ClaimOutcome::LostRace);
        }

        coupon.current_claims += 1;
        if coupon.is_exhausted() {
            coupon.is_active = false;
        }
        let coupon = coupon.clone();

        let claim = Claim {
            id: ClaimId::new(),
            coupon_id,
            session_id: data.session_id.clone(),
            origin_address: data.origin_address.clone(),
            status: ClaimStatus::Claimed,
            claimed_at: data.claimed_at,
        };
        state.claims.push(claim.clone());

        Ok(ClaimOutcome::Claimed { coupon, claim })
    }

    async fn insert(&self, data: &NewCoupon) -> AppResult<Coupon> {
        let mut state = self.state.lock().await;
        let code = canonical_code(&data.code);

        if state.coupons.iter().any(|c| c.code == code) {
            return Err(AppError::conflict(format!(
                "Coupon code {code} already exists"
            )));
        }

        let coupon = Coupon {
            id: CouponId::new(),
            code,
            discount: data.discount.clone(),
            description: data.description.clone(),
            claim_limit: data.claim_limit,
            current_claims: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        state.coupons.push(coupon.clone());
        info!(code = %coupon.code, claim_limit = coupon.claim_limit, "Coupon inserted");

        Ok(coupon)
    }

    async fn count(&self) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state.coupons.len() as u64)
    }
}

#[async_trait]
impl ClaimLedger for MemoryCouponStore {
    async fn count_by_session(&self, session_id: &str) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .claims
            .iter()
            .filter(|c| c.session_id == session_id)
            .count() as u64)
    }

    async fn latest_by_origin(&self, origin_address: &str) -> AppResult<Option<Claim>> {
        let state = self.state.lock().await;
        Ok(state
            .claims
            .iter()
            .filter(|c| c.origin_address.as_deref() == Some(origin_address))
            .max_by_key(|c| c.claimed_at)
            .cloned())
    }

    async fn find_by_coupon(&self, coupon_id: CouponId) -> AppResult<Vec<Claim>> {
        let state = self.state.lock().await;
        Ok(state
            .claims
            .iter()
            .filter(|c| c.coupon_id == coupon_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_coupon(code: &str, claim_limit: i32) -> NewCoupon {
        NewCoupon::new(code, "20% off", "test coupon", claim_limit)
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_code_case_insensitive() {
        let store = MemoryCouponStore::new();
        store.insert(&new_coupon("SUMMER20", 2)).await.unwrap();

        let err = store.insert(&new_coupon("summer20", 2)).await.unwrap_err();
        assert_eq!(err.kind, couponhub_core::error::ErrorKind::Conflict);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_canonicalizes_field_built_payloads() {
        let store = MemoryCouponStore::new();
        // Bypass NewCoupon::new so the store sees a non-canonical code.
        let data = NewCoupon {
            code: "lower20".to_string(),
            discount: "20% off".to_string(),
            description: "test coupon".to_string(),
            claim_limit: 2,
        };

        let coupon = store.insert(&data).await.unwrap();
        assert_eq!(coupon.code, "LOWER20");

        let err = store.insert(&data).await.unwrap_err();
        assert_eq!(err.kind, couponhub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_try_claim_consumes_capacity_and_appends() {
        let store = MemoryCouponStore::new();
        let coupon = store.insert(&new_coupon("SUMMER20", 1)).await.unwrap();

        let data = NewClaim::new(coupon.id, "s1", Some("ip1"), Utc::now());
        match store.try_claim(coupon.id, &data).await.unwrap() {
            ClaimOutcome::Claimed { coupon, claim } => {
                assert_eq!(coupon.current_claims, 1);
                assert!(!coupon.is_active);
                assert_eq!(claim.status, ClaimStatus::Claimed);
            }
            ClaimOutcome::LostRace => panic!("expected a successful claim"),
        }

        // Second attempt loses the race: capacity is gone.
        let data = NewClaim::new(coupon.id, "s2", Some("ip2"), Utc::now());
        assert!(matches!(
            store.try_claim(coupon.id, &data).await.unwrap(),
            ClaimOutcome::LostRace
        ));
        assert_eq!(store.find_by_coupon(coupon.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_try_claim_unknown_coupon_is_not_found() {
        let store = MemoryCouponStore::new();
        let missing = CouponId::new();
        let data = NewClaim::new(missing, "s1", None, Utc::now());
        let err = store.try_claim(missing, &data).await.unwrap_err();
        assert_eq!(err.kind, couponhub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_find_eligible_prefers_insertion_order() {
        let store = MemoryCouponStore::new();
        let first = store.insert(&new_coupon("FIRST", 5)).await.unwrap();
        store.insert(&new_coupon("SECOND", 5)).await.unwrap();

        let eligible = store.find_eligible().await.unwrap().unwrap();
        assert_eq!(eligible.id, first.id);
    }

    #[tokio::test]
    async fn test_latest_by_origin_picks_most_recent() {
        let store = MemoryCouponStore::new();
        let coupon = store.insert(&new_coupon("SUMMER20", 5)).await.unwrap();

        let t0 = Utc::now();
        let older = NewClaim::new(coupon.id, "s1", Some("ip1"), t0);
        let newer = NewClaim::new(coupon.id, "s2", Some("ip1"), t0 + chrono::Duration::seconds(5));
        store.try_claim(coupon.id, &older).await.unwrap();
        store.try_claim(coupon.id, &newer).await.unwrap();

        let latest = store.latest_by_origin("ip1").await.unwrap().unwrap();
        assert_eq!(latest.session_id, "s2");
        assert!(store.latest_by_origin("ip9").await.unwrap().is_none());
    }
}
