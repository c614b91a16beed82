//! Coupon domain entities.

pub mod model;

pub use model::{canonical_code, Coupon, NewCoupon, PublicCoupon};
