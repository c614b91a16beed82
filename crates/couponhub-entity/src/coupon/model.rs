//! Coupon entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use couponhub_core::types::id::CouponId;

/// A reward code with a fixed claim capacity.
///
/// Coupons are created by the catalog seeder (or an external admin path)
/// and mutated only by successful claims. They are never deleted; a coupon
/// that reaches its claim limit is deactivated in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    /// Unique coupon identifier.
    pub id: CouponId,
    /// Unique coupon code, stored uppercase.
    pub code: String,
    /// Display string for the discount value.
    pub discount: String,
    /// Display description.
    pub description: String,
    /// Maximum total successful claims.
    pub claim_limit: i32,
    /// Claims recorded so far. Always within `0..=claim_limit`.
    pub current_claims: i32,
    /// Whether the coupon can still be claimed. Flips to `false`
    /// automatically when `current_claims` reaches `claim_limit`.
    pub is_active: bool,
    /// When the coupon was created.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Check whether the coupon can accept another claim.
    pub fn has_capacity(&self) -> bool {
        self.is_active && self.current_claims < self.claim_limit
    }

    /// Number of claims remaining before the coupon is exhausted.
    pub fn remaining(&self) -> i32 {
        (self.claim_limit - self.current_claims).max(0)
    }

    /// Check whether the coupon has reached its claim limit.
    pub fn is_exhausted(&self) -> bool {
        self.current_claims >= self.claim_limit
    }
}

/// Data required to create a new coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCoupon {
    /// Coupon code, canonicalized to uppercase.
    pub code: String,
    /// Display string for the discount value.
    pub discount: String,
    /// Display description.
    pub description: String,
    /// Maximum total successful claims.
    pub claim_limit: i32,
}

impl NewCoupon {
    /// Create a new coupon payload, canonicalizing the code.
    pub fn new(
        code: impl Into<String>,
        discount: impl Into<String>,
        description: impl Into<String>,
        claim_limit: i32,
    ) -> Self {
        Self {
            code: canonical_code(&code.into()),
            discount: discount.into(),
            description: description.into(),
            claim_limit,
        }
    }
}

/// Canonical form of a coupon code: trimmed and uppercased.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The caller-facing projection of a coupon.
///
/// Internal bookkeeping fields (`claim_limit`, `current_claims`,
/// `is_active`) are never exposed to requesters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicCoupon {
    /// Coupon code.
    pub code: String,
    /// Display string for the discount value.
    pub discount: String,
    /// Display description.
    pub description: String,
}

impl From<&Coupon> for PublicCoupon {
    fn from(coupon: &Coupon) -> Self {
        Self {
            code: coupon.code.clone(),
            discount: coupon.discount.clone(),
            description: coupon.description.clone(),
        }
    }
}
