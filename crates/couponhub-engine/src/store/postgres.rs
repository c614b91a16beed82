//! PostgreSQL coupon store delegating to the repository layer.

use async_trait::async_trait;
use sqlx::PgPool;

use couponhub_core::config::DatabaseConfig;
use couponhub_core::result::AppResult;
use couponhub_core::types::id::CouponId;
use couponhub_database::repositories::{ClaimRepository, CouponRepository};
use couponhub_database::{migration, DatabasePool};
use couponhub_entity::claim::{Claim, NewClaim};
use couponhub_entity::coupon::{Coupon, NewCoupon};

use super::{ClaimLedger, ClaimOutcome, CouponCatalog};

/// Production coupon store backed by PostgreSQL.
///
/// Atomicity of the claim unit comes from the single transaction in
/// [`CouponRepository::try_claim`]; this type only adapts the
/// repositories to the store traits.
#[derive(Debug, Clone)]
pub struct PgCouponStore {
    coupons: CouponRepository,
    claims: ClaimRepository,
}

impl PgCouponStore {
    /// Create a new Postgres-backed coupon store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            coupons: CouponRepository::new(pool.clone()),
            claims: ClaimRepository::new(pool),
        }
    }

    /// Connect to PostgreSQL, apply pending migrations, and build the
    /// store. The usual startup path.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(config).await?;
        migration::run_migrations(db.pool()).await?;
        Ok(Self::new(db.into_pool()))
    }
}

#[async_trait]
impl CouponCatalog for PgCouponStore {
    async fn find_eligible(&self) -> AppResult<Option<Coupon>> {
        self.coupons.find_eligible().await
    }

    async fn list_available(&self) -> AppResult<Vec<Coupon>> {
        self.coupons.list_available().await
    }

    async fn try_claim(&self, coupon_id: CouponId, data: &NewClaim) -> AppResult<ClaimOutcome> {
        match self.coupons.try_claim(coupon_id, data).await? {
            Some((coupon, claim)) => Ok(ClaimOutcome::Claimed { coupon, claim }),
            None => Ok(ClaimOutcome::LostRace),
        }
    }

    async fn insert(&self, data: &NewCoupon) -> AppResult<Coupon> {
        self.coupons.insert(data).await
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.coupons.count().await?.max(0) as u64)
    }
}

#[async_trait]
impl ClaimLedger for PgCouponStore {
    async fn count_by_session(&self, session_id: &str) -> AppResult<u64> {
        Ok(self.claims.count_by_session(session_id).await?.max(0) as u64)
    }

    async fn latest_by_origin(&self, origin_address: &str) -> AppResult<Option<Claim>> {
        self.claims.latest_by_origin(origin_address).await
    }

    async fn find_by_coupon(&self, coupon_id: CouponId) -> AppResult<Vec<Claim>> {
        self.claims.find_by_coupon(coupon_id).await
    }
}
