//! Claim ledger repository implementation.
//!
//! The ledger is append-only; inserts happen inside the claim transaction
//! owned by [`CouponRepository::try_claim`](super::coupon::CouponRepository),
//! so this repository only exposes read queries.

use sqlx::PgPool;

use couponhub_core::error::{AppError, ErrorKind};
use couponhub_core::result::AppResult;
use couponhub_core::types::id::CouponId;
use couponhub_entity::claim::Claim;

/// Repository for claim ledger queries.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    /// Create a new claim repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count claims recorded for a session, across all coupons.
    pub async fn count_by_session(&self, session_id: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM claims WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count session claims", e)
            })
    }

    /// Find the most recent claim from an origin address.
    pub async fn latest_by_origin(&self, origin_address: &str) -> AppResult<Option<Claim>> {
        sqlx::query_as::<_, Claim>(
            "SELECT * FROM claims WHERE origin_address = $1 \
             ORDER BY claimed_at DESC LIMIT 1",
        )
        .bind(origin_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find latest origin claim", e)
        })
    }

    /// List all claims recorded against a coupon.
    pub async fn find_by_coupon(&self, coupon_id: CouponId) -> AppResult<Vec<Claim>> {
        sqlx::query_as::<_, Claim>(
            "SELECT * FROM claims WHERE coupon_id = $1 ORDER BY claimed_at",
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list coupon claims", e)
        })
    }
}
