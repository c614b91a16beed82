//! Store traits the allocation engine depends on.
//!
//! Two implementations are provided:
//! - [`MemoryCouponStore`](memory::MemoryCouponStore) (using
//!   `tokio::sync::Mutex`, single-node and tests)
//! - [`PgCouponStore`](postgres::PgCouponStore) (PostgreSQL, delegating
//!   to the repository layer)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use couponhub_core::result::AppResult;
use couponhub_core::types::id::CouponId;
use couponhub_entity::claim::{Claim, NewClaim};
use couponhub_entity::coupon::{Coupon, NewCoupon};

pub use memory::MemoryCouponStore;
pub use postgres::PgCouponStore;

/// Outcome of an atomic claim attempt against one coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClaimOutcome {
    /// The capacity unit was taken and the ledger entry recorded.
    Claimed {
        /// The coupon as it stands after the increment.
        coupon: Coupon,
        /// The appended ledger entry.
        claim: Claim,
    },
    /// The coupon filled up between selection and update. Not an error;
    /// the engine re-selects another candidate.
    LostRace,
}

/// Read/write store of coupon records.
///
/// Implementations must guarantee that [`try_claim`](Self::try_claim) is
/// atomic: the conditional increment, the deactivation at the limit, and
/// the ledger append either all happen or none do. Nothing stronger is
/// assumed by the engine.
#[async_trait]
pub trait CouponCatalog: Send + Sync + std::fmt::Debug {
    /// Find the next claimable coupon (active, spare capacity).
    /// Selection is deterministic within one invocation: earliest
    /// created first.
    async fn find_eligible(&self) -> AppResult<Option<Coupon>>;

    /// List all coupons that can still be claimed.
    async fn list_available(&self) -> AppResult<Vec<Coupon>>;

    /// Atomically take one unit of the coupon's capacity and append the
    /// matching ledger entry.
    async fn try_claim(&self, coupon_id: CouponId, data: &NewClaim) -> AppResult<ClaimOutcome>;

    /// Insert a new coupon. Duplicate codes (case-insensitive) yield a
    /// `Conflict` error.
    async fn insert(&self, data: &NewCoupon) -> AppResult<Coupon>;

    /// Count all coupons in the catalog, active or not.
    async fn count(&self) -> AppResult<u64>;
}

/// Append-only store of claim events, queried for throttling decisions.
#[async_trait]
pub trait ClaimLedger: Send + Sync + std::fmt::Debug {
    /// Count claims recorded for a session, across all coupons.
    async fn count_by_session(&self, session_id: &str) -> AppResult<u64>;

    /// Find the most recent claim from an origin address.
    async fn latest_by_origin(&self, origin_address: &str) -> AppResult<Option<Claim>>;

    /// List all claims recorded against a coupon.
    async fn find_by_coupon(&self, coupon_id: CouponId) -> AppResult<Vec<Claim>>;
}

/// Combined store dependency held by the engine.
pub trait CouponStore: CouponCatalog + ClaimLedger {}

impl<T: CouponCatalog + ClaimLedger> CouponStore for T {}
