//! Idempotent catalog seeding.

use std::sync::Arc;

use tracing::{debug, info, warn};

use couponhub_core::config::SeedCoupon;
use couponhub_core::error::ErrorKind;
use couponhub_core::result::AppResult;
use couponhub_entity::coupon::NewCoupon;

use crate::store::CouponStore;

/// Populates an empty coupon catalog on first boot.
///
/// Safe to call on every startup: a non-empty catalog is left untouched,
/// and duplicate-code conflicts from concurrent boots racing on an empty
/// catalog are swallowed as non-fatal (the unique constraint on `code`
/// guarantees at most one insert wins per code).
#[derive(Debug, Clone)]
pub struct CatalogSeeder {
    catalog: Arc<dyn CouponStore>,
}

impl CatalogSeeder {
    /// Create a seeder over the given catalog.
    pub fn new(catalog: Arc<dyn CouponStore>) -> Self {
        Self { catalog }
    }

    /// Insert the default coupons if the catalog is empty.
    ///
    /// Returns the number of coupons inserted (0 when the catalog was
    /// already populated).
    pub async fn seed_if_empty(&self, defaults: &[SeedCoupon]) -> AppResult<u64> {
        let existing = self.catalog.count().await?;
        if existing > 0 {
            debug!(existing = existing, "Catalog already populated, skipping seed");
            return Ok(0);
        }

        let mut inserted = 0u64;
        for seed in defaults {
            if seed.claim_limit <= 0 {
                warn!(code = %seed.code, claim_limit = seed.claim_limit, "Skipping seed coupon with non-positive claim limit");
                continue;
            }

            let data = NewCoupon::new(
                &seed.code,
                &seed.discount,
                &seed.description,
                seed.claim_limit,
            );
            match self.catalog.insert(&data).await {
                Ok(_) => inserted += 1,
                Err(err) if err.kind == ErrorKind::Conflict => {
                    warn!(code = %data.code, "Seed coupon already inserted by a concurrent boot");
                }
                Err(err) => return Err(err),
            }
        }

        info!(inserted = inserted, "Catalog seeded");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::{CouponCatalog, MemoryCouponStore};

    fn seed(code: &str, claim_limit: i32) -> SeedCoupon {
        SeedCoupon {
            code: code.to_string(),
            discount: "10% off".to_string(),
            description: "test".to_string(),
            claim_limit,
        }
    }

    #[tokio::test]
    async fn test_seed_if_empty_is_idempotent() {
        let store = Arc::new(MemoryCouponStore::new());
        let seeder = CatalogSeeder::new(store.clone());
        let defaults = vec![seed("WELCOME10", 100), seed("SUMMER20", 50)];

        assert_eq!(seeder.seed_if_empty(&defaults).await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 2);

        // Second boot: catalog size unchanged.
        assert_eq!(seeder.seed_if_empty(&defaults).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seed_skips_non_positive_limits() {
        let store = Arc::new(MemoryCouponStore::new());
        let seeder = CatalogSeeder::new(store.clone());

        let inserted = seeder
            .seed_if_empty(&[seed("BROKEN", 0), seed("GOOD", 5)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_codes_are_canonicalized() {
        let store = Arc::new(MemoryCouponStore::new());
        let seeder = CatalogSeeder::new(store.clone());

        seeder.seed_if_empty(&[seed("welcome10", 10)]).await.unwrap();
        let available = store.list_available().await.unwrap();
        assert_eq!(available[0].code, "WELCOME10");
    }
}
