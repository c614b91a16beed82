//! Claim failure taxonomy.
//!
//! Every variant implies a different caller action (fix the request,
//! wait, give up, alert operators), so they are never collapsed into a
//! generic failure. The transport layer maps [`ClaimError::kind`] onto
//! its own status codes.

use thiserror::Error;

use couponhub_core::error::{AppError, ErrorKind};

/// Failure modes of the claim operation.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The caller supplied no session identifier. A malformed request,
    /// not a capacity problem; nothing was mutated.
    #[error("session id is required")]
    SessionIdRequired,

    /// The session already holds the maximum number of claims.
    #[error("session has reached its claim limit of {limit}")]
    SessionClaimLimitExceeded {
        /// The configured per-session limit.
        limit: u32,
    },

    /// The origin address claimed too recently. Retryable after the
    /// stated delay.
    #[error("origin is cooling down, retry in {remaining_seconds}s")]
    OriginCooldownActive {
        /// Seconds until the origin may claim again (rounded up, min 1).
        remaining_seconds: u64,
    },

    /// No coupon has remaining capacity. Transient: may succeed later if
    /// the catalog is restocked externally.
    #[error("no coupons available")]
    NoCouponsAvailable,

    /// The storage layer failed. Always surfaced, never retried here.
    #[error(transparent)]
    Storage(#[from] AppError),
}

impl ClaimError {
    /// Map the variant onto the application-wide error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionIdRequired => ErrorKind::Validation,
            Self::SessionClaimLimitExceeded { .. } => ErrorKind::RateLimit,
            Self::OriginCooldownActive { .. } => ErrorKind::RateLimit,
            Self::NoCouponsAvailable => ErrorKind::ServiceUnavailable,
            Self::Storage(err) => err.kind,
        }
    }

    /// Whether the caller can retry the identical request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OriginCooldownActive { .. } | Self::NoCouponsAvailable
        )
    }
}
