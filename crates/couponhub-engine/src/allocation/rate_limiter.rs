//! Session-cap and origin-cooldown throttling.
//!
//! Both checks are derived from the claim ledger; there is no separate
//! rate-limiting state to drift. The session cap stops one client from
//! draining the pool across many requests; the origin cooldown throttles
//! request rate independent of session identity, so cycling session ids
//! does not bypass it.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use couponhub_core::config::AllocationConfig;
use couponhub_core::traits::Clock;

use crate::error::ClaimError;
use crate::store::CouponStore;

/// Evaluates whether a requester may claim right now.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    ledger: Arc<dyn CouponStore>,
    clock: Arc<dyn Clock>,
    max_claims_per_session: u32,
    cooldown: Duration,
}

impl RateLimiter {
    /// Create a rate limiter over the given ledger and clock.
    pub fn new(
        ledger: Arc<dyn CouponStore>,
        clock: Arc<dyn Clock>,
        config: &AllocationConfig,
    ) -> Self {
        Self {
            ledger,
            clock,
            max_claims_per_session: config.max_claims_per_session,
            cooldown: Duration::seconds(config.cooldown_seconds as i64),
        }
    }

    /// Check both limits for the requester identity. Passes only if the
    /// session is under its cap and the origin is outside its cooldown.
    pub async fn check(
        &self,
        session_id: &str,
        origin_address: Option<&str>,
    ) -> Result<(), ClaimError> {
        self.check_session(session_id).await?;
        self.check_origin(origin_address).await
    }

    async fn check_session(&self, session_id: &str) -> Result<(), ClaimError> {
        let held = self.ledger.count_by_session(session_id).await?;
        if held >= u64::from(self.max_claims_per_session) {
            debug!(
                session_id = %session_id,
                held = held,
                limit = self.max_claims_per_session,
                "Session claim limit reached"
            );
            return Err(ClaimError::SessionClaimLimitExceeded {
                limit: self.max_claims_per_session,
            });
        }
        Ok(())
    }

    /// Cooldown is skipped when the origin is unresolvable: there is
    /// nothing to throttle against. The session cap still applies.
    async fn check_origin(&self, origin_address: Option<&str>) -> Result<(), ClaimError> {
        let Some(origin) = origin_address.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        if self.cooldown.is_zero() {
            return Ok(());
        }

        let Some(latest) = self.ledger.latest_by_origin(origin).await? else {
            return Ok(());
        };

        let elapsed = self.clock.now() - latest.claimed_at;
        // A claim timestamped in the future means clock skew; degrade to
        // passing rather than blocking the origin indefinitely.
        if elapsed < Duration::zero() {
            debug!(origin = %origin, "Latest claim is in the future, skipping cooldown");
            return Ok(());
        }

        if elapsed < self.cooldown {
            let remaining = self.cooldown - elapsed;
            let remaining_seconds = (remaining.num_milliseconds() as u64).div_ceil(1000).max(1);
            debug!(
                origin = %origin,
                remaining_seconds = remaining_seconds,
                "Origin cooldown active"
            );
            return Err(ClaimError::OriginCooldownActive { remaining_seconds });
        }

        Ok(())
    }
}
