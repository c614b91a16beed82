//! The allocation engine.
//!
//! Given a requester identity (session id + origin address), atomically
//! selects an available coupon, records the claim, decrements remaining
//! capacity, and deactivates coupons that hit their limit. This is the
//! component under concurrency pressure: two concurrent callers must
//! never both take the last unit of a coupon's capacity.

use std::sync::Arc;

use tracing::{debug, info};

use couponhub_core::config::AllocationConfig;
use couponhub_core::traits::Clock;
use couponhub_entity::claim::NewClaim;
use couponhub_entity::coupon::PublicCoupon;

use crate::error::ClaimError;
use crate::store::{ClaimOutcome, CouponStore};

use super::rate_limiter::RateLimiter;

/// Upper bound on select-and-claim attempts when candidates keep losing
/// races. Each lost race means some coupon just filled up, so in practice
/// one or two retries suffice; the bound only prevents unbounded looping
/// against a churning catalog.
const MAX_CLAIM_ATTEMPTS: usize = 4;

/// The core coupon allocation engine.
///
/// All collaborators are injected at construction; the engine holds no
/// global state and takes no locks of its own. Capacity accounting is
/// delegated to the store's atomic claim unit.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    store: Arc<dyn CouponStore>,
    limiter: RateLimiter,
    clock: Arc<dyn Clock>,
}

impl AllocationEngine {
    /// Create an engine over the given store and clock.
    pub fn new(
        store: Arc<dyn CouponStore>,
        clock: Arc<dyn Clock>,
        config: &AllocationConfig,
    ) -> Self {
        let limiter = RateLimiter::new(store.clone(), clock.clone(), config);
        Self {
            store,
            limiter,
            clock,
        }
    }

    /// Claim one coupon for the requester.
    ///
    /// Rate limits are checked before any mutation, so rejected attempts
    /// never consume capacity. On success only the coupon's public
    /// fields are returned.
    pub async fn claim(
        &self,
        session_id: &str,
        origin_address: Option<&str>,
    ) -> Result<PublicCoupon, ClaimError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(ClaimError::SessionIdRequired);
        }

        self.limiter.check(session_id, origin_address).await?;

        for attempt in 1..=MAX_CLAIM_ATTEMPTS {
            let Some(candidate) = self.store.find_eligible().await? else {
                return Err(ClaimError::NoCouponsAvailable);
            };

            let data = NewClaim::new(candidate.id, session_id, origin_address, self.clock.now());
            match self.store.try_claim(candidate.id, &data).await? {
                ClaimOutcome::Claimed { coupon, claim } => {
                    info!(
                        code = %coupon.code,
                        session_id = %session_id,
                        claim_id = %claim.id,
                        remaining = coupon.remaining(),
                        "Coupon claimed"
                    );
                    return Ok(PublicCoupon::from(&coupon));
                }
                ClaimOutcome::LostRace => {
                    debug!(
                        code = %candidate.code,
                        attempt = attempt,
                        "Lost claim race, re-selecting"
                    );
                }
            }
        }

        Err(ClaimError::NoCouponsAvailable)
    }

    /// List coupons that can still be claimed, as public projections.
    pub async fn list_available(&self) -> Result<Vec<PublicCoupon>, ClaimError> {
        let coupons = self.store.list_available().await?;
        Ok(coupons.iter().map(PublicCoupon::from).collect())
    }
}
