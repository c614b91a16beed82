//! # couponhub-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for the coupon catalog and the claim ledger.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
