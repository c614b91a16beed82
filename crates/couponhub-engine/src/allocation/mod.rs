//! Allocation engine, rate limiting, and catalog seeding.

pub mod engine;
pub mod rate_limiter;
pub mod seeder;

pub use engine::AllocationEngine;
pub use rate_limiter::RateLimiter;
pub use seeder::CatalogSeeder;
