//! Concrete repository implementations.

pub mod claim;
pub mod coupon;

pub use claim::ClaimRepository;
pub use coupon::CouponRepository;
