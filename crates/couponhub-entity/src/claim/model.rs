//! Claim entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use couponhub_core::types::id::{ClaimId, CouponId};

use super::status::ClaimStatus;

/// A record of one successful allocation of a coupon to a requester.
///
/// The ledger is append-only: claims are created exactly once per
/// successful allocation, immutable thereafter, and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Claim {
    /// Unique claim identifier.
    pub id: ClaimId,
    /// The coupon this claim was drawn against.
    pub coupon_id: CouponId,
    /// Opaque caller-supplied session identifier.
    pub session_id: String,
    /// Requester network origin, used for throttling only. `None` when
    /// the request layer could not resolve an address.
    pub origin_address: Option<String>,
    /// Claim status. The engine only writes [`ClaimStatus::Claimed`].
    pub status: ClaimStatus,
    /// When the claim was recorded. Immutable.
    pub claimed_at: DateTime<Utc>,
}

/// Data required to append a new claim to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClaim {
    /// The coupon being claimed.
    pub coupon_id: CouponId,
    /// Opaque caller-supplied session identifier.
    pub session_id: String,
    /// Requester network origin, if resolved.
    pub origin_address: Option<String>,
    /// Timestamp supplied by the engine clock.
    pub claimed_at: DateTime<Utc>,
}

impl NewClaim {
    /// Build a claim payload for the given coupon and requester identity.
    pub fn new(
        coupon_id: CouponId,
        session_id: impl Into<String>,
        origin_address: Option<&str>,
        claimed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            coupon_id,
            session_id: session_id.into(),
            origin_address: origin_address
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
            claimed_at,
        }
    }
}
