//! Coupon allocation and throttling configuration.

use serde::{Deserialize, Serialize};

/// Allocation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Maximum number of successful claims a single session may hold
    /// across all coupons.
    #[serde(default = "default_max_claims_per_session")]
    pub max_claims_per_session: u32,
    /// Minimum seconds an origin address must wait between successful
    /// claims. `0` disables the cooldown entirely.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    /// Coupons inserted into an empty catalog on first boot.
    #[serde(default = "default_seed_coupons")]
    pub seed_coupons: Vec<SeedCoupon>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_claims_per_session: default_max_claims_per_session(),
            cooldown_seconds: default_cooldown_seconds(),
            seed_coupons: default_seed_coupons(),
        }
    }
}

/// One coupon in the seed catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCoupon {
    /// Coupon code. Canonicalized to uppercase on insert.
    pub code: String,
    /// Display string for the discount value.
    pub discount: String,
    /// Display description.
    pub description: String,
    /// Maximum total successful claims.
    pub claim_limit: i32,
}

fn default_max_claims_per_session() -> u32 {
    10
}

fn default_cooldown_seconds() -> u64 {
    10
}

fn default_seed_coupons() -> Vec<SeedCoupon> {
    vec![
        SeedCoupon {
            code: "WELCOME10".to_string(),
            discount: "10% off".to_string(),
            description: "10% off your first order".to_string(),
            claim_limit: 100,
        },
        SeedCoupon {
            code: "SUMMER20".to_string(),
            discount: "20% off".to_string(),
            description: "20% off the summer collection".to_string(),
            claim_limit: 50,
        },
        SeedCoupon {
            code: "FREESHIP".to_string(),
            discount: "Free shipping".to_string(),
            description: "Free shipping on any order".to_string(),
            claim_limit: 200,
        },
    ]
}
