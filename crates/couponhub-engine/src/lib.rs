//! # couponhub-engine
//!
//! The core allocation engine: hands out a strictly limited pool of
//! coupon codes to concurrent requesters while enforcing per-session and
//! per-origin rate limits, and guaranteeing no coupon is ever claimed
//! more times than its configured limit.
//!
//! The engine consumes a [`store::CouponStore`] (in-memory or Postgres)
//! and a [`couponhub_core::traits::Clock`], both injected at construction.
//! No process-wide state.

pub mod allocation;
pub mod error;
pub mod store;

pub use allocation::engine::AllocationEngine;
pub use allocation::rate_limiter::RateLimiter;
pub use allocation::seeder::CatalogSeeder;
pub use error::ClaimError;
pub use store::{ClaimLedger, ClaimOutcome, CouponCatalog, CouponStore};
