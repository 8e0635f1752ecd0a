use std::sync::Arc;

use recon_core::{DomainResult, ProductId};

use crate::product::Product;

/// Product records as seen by the stock ledger.
///
/// Lookups return `Ok(None)` for a miss; `Err` is reserved for the store
/// itself failing.
pub trait ProductStore: Send + Sync {
    fn get_product(&self, id: ProductId) -> DomainResult<Option<Product>>;

    /// `normalized_name` is already trimmed and lowercased
    /// (see [`crate::normalize_name`]).
    fn find_product_by_name(&self, normalized_name: &str) -> DomainResult<Option<Product>>;

    fn set_product_stock(&self, id: ProductId, new_stock: i64) -> DomainResult<()>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn get_product(&self, id: ProductId) -> DomainResult<Option<Product>> {
        (**self).get_product(id)
    }

    fn find_product_by_name(&self, normalized_name: &str) -> DomainResult<Option<Product>> {
        (**self).find_product_by_name(normalized_name)
    }

    fn set_product_stock(&self, id: ProductId, new_stock: i64) -> DomainResult<()> {
        (**self).set_product_stock(id, new_stock)
    }
}
