//! Claim status enum.

use serde::{Deserialize, Serialize};

/// Status of a claim ledger entry.
///
/// The engine only ever writes `Claimed`; `Expired` is reserved for a
/// future revocation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimStatus {
    /// The claim is live.
    Claimed,
    /// The claim has lapsed.
    Expired,
}

impl ClaimStatus {
    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "CLAIMED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = couponhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CLAIMED" => Ok(Self::Claimed),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(couponhub_core::AppError::validation(format!(
                "Unknown claim status: {s}"
            ))),
        }
    }
}
