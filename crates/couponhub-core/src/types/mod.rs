//! Shared value types used across CouponHub crates.

pub mod id;
