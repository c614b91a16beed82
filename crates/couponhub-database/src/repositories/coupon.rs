//! Coupon catalog repository implementation.

use sqlx::PgPool;
use tracing::debug;

use couponhub_core::error::{AppError, ErrorKind};
use couponhub_core::result::AppResult;
use couponhub_core::types::id::CouponId;
use couponhub_entity::claim::{Claim, ClaimStatus, NewClaim};
use couponhub_entity::coupon::{canonical_code, Coupon, NewCoupon};

/// Repository for coupon catalog queries and the atomic claim transaction.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    /// Create a new coupon repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a coupon by ID.
    pub async fn find_by_id(&self, id: CouponId) -> AppResult<Option<Coupon>> {
        sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find coupon", e))
    }

    /// Find the next claimable coupon.
    ///
    /// Ordering by creation time (then ID) makes the selection
    /// deterministic within a single invocation.
    pub async fn find_eligible(&self) -> AppResult<Option<Coupon>> {
        sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE is_active AND current_claims < claim_limit \
             ORDER BY created_at, id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find eligible coupon", e)
        })
    }

    /// List all coupons that can still be claimed.
    pub async fn list_available(&self) -> AppResult<Vec<Coupon>> {
        sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE is_active AND current_claims < claim_limit \
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list available coupons", e)
        })
    }

    /// Count all coupons in the catalog, active or not.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count coupons", e))
    }

    /// Insert a new coupon.
    ///
    /// Duplicate codes surface as a `Conflict` error via the unique
    /// constraint so concurrent seeders can treat them as benign. The
    /// code is canonicalized here so uniqueness stays case-insensitive
    /// even for payloads built field-wise.
    pub async fn insert(&self, data: &NewCoupon) -> AppResult<Coupon> {
        let code = canonical_code(&data.code);
        sqlx::query_as::<_, Coupon>(
            "INSERT INTO coupons (code, discount, description, claim_limit) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&code)
        .bind(&data.discount)
        .bind(&data.description)
        .bind(data.claim_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict(format!("Coupon code {code} already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert coupon", e),
        })
    }

    /// Atomically claim one unit of a coupon's capacity.
    ///
    /// The conditional `UPDATE` and the ledger `INSERT` run in a single
    /// transaction: either both happen or neither does. The `WHERE`
    /// clause guards against overshoot, and `is_active` is recomputed in
    /// the same statement (Postgres evaluates the right-hand side against
    /// the pre-update row). Returns `None` when the coupon had no
    /// remaining capacity, i.e. the caller lost the race.
    pub async fn try_claim(
        &self,
        coupon_id: CouponId,
        data: &NewClaim,
    ) -> AppResult<Option<(Coupon, Claim)>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin claim transaction", e)
        })?;

        let coupon: Option<Coupon> = sqlx::query_as::<_, Coupon>(
            "UPDATE coupons SET current_claims = current_claims + 1, \
             is_active = current_claims + 1 < claim_limit \
             WHERE id = $1 AND is_active AND current_claims < claim_limit \
             RETURNING *",
        )
        .bind(coupon_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to increment claim count", e)
        })?;

        let Some(coupon) = coupon else {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back claim", e)
            })?;
            debug!(coupon_id = %coupon_id, "Coupon had no remaining capacity");
            return Ok(None);
        };

        let claim: Claim = sqlx::query_as::<_, Claim>(
            "INSERT INTO claims (coupon_id, session_id, origin_address, status, claimed_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.coupon_id)
        .bind(&data.session_id)
        .bind(&data.origin_address)
        .bind(ClaimStatus::Claimed)
        .bind(data.claimed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append claim", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit claim transaction", e)
        })?;

        Ok(Some((coupon, claim)))
    }
}
