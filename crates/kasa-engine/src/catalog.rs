//! Product catalog lookup.

use std::future::Future;

use kasa_core::CatalogItem;

/// Resolves a product reference to a sellable item.
///
/// The engine does not own the catalog; deployments back this with
/// whatever product store they have. Returning `None` means the product
/// cannot be sold at this location.
pub trait CatalogLookup: Send + Sync {
    fn resolve(
        &self,
        product_id: &str,
        variation_id: &str,
        location_id: &str,
    ) -> impl Future<Output = Option<CatalogItem>> + Send;
}
