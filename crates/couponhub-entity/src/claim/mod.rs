//! Claim ledger domain entities.

pub mod model;
pub mod status;

pub use model::{Claim, NewClaim};
pub use status::ClaimStatus;
