use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use recon_core::{DomainError, DomainResult, EntityRole, ProductId, TransactionKind};

use crate::product::{Product, ProductRef, normalize_name};
use crate::store::ProductStore;

/// An accepted, persisted stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: ProductId,
    pub kind: TransactionKind,
    /// Signed: negative for sales and purchase returns.
    pub delta: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub min_stock_level: i64,
    /// `new_stock` is at or below `min_stock_level`.
    pub low_stock: bool,
}

/// Why a call left stock untouched without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "role", rename_all = "snake_case")]
pub enum SkipReason {
    /// Only customer transactions are inventory-linked.
    NonInventoryRole(EntityRole),
    /// Free-text line: no product with that id or name.
    NoCatalogMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StockOutcome {
    Applied(StockMovement),
    Skipped { reason: SkipReason },
}

impl StockOutcome {
    pub fn movement(&self) -> Option<&StockMovement> {
        match self {
            StockOutcome::Applied(m) => Some(m),
            StockOutcome::Skipped { .. } => None,
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        StockOutcome::Skipped { reason }
    }
}

/// Applies signed stock deltas through a [`ProductStore`].
///
/// Each accepted call performs exactly one stock write. Retries are not
/// deduplicated here; callers only invoke the ledger for quantity that has
/// just crossed a commit boundary.
#[derive(Debug)]
pub struct StockLedger<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> StockLedger<'a, S>
where
    S: ProductStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Role-gated movement for invoice lines.
    ///
    /// Non-customer roles are open items: the call is a reported no-op.
    pub fn apply_delta(
        &self,
        product: ProductRef<'_>,
        quantity: i64,
        kind: TransactionKind,
        role: EntityRole,
    ) -> DomainResult<StockOutcome> {
        if !role.is_inventory_linked() {
            debug!(%product, %role, "stock sync skipped for non-inventory role");
            return Ok(StockOutcome::skipped(SkipReason::NonInventoryRole(role)));
        }
        self.apply_movement(product, quantity, kind)
    }

    /// Movement without the role gate (purchase-order receipts).
    ///
    /// An outbound movement that would leave stock negative is rejected with
    /// `InsufficientStock` and writes nothing. Inbound movements are always
    /// accepted, even onto stock that is already negative.
    pub fn apply_movement(
        &self,
        product: ProductRef<'_>,
        quantity: i64,
        kind: TransactionKind,
    ) -> DomainResult<StockOutcome> {
        if quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }

        let Some(current) = self.resolve(product)? else {
            debug!(%product, "no catalog match; treating line as open item");
            return Ok(StockOutcome::skipped(SkipReason::NoCatalogMatch));
        };

        let delta = quantity
            .checked_mul(kind.stock_direction())
            .ok_or_else(|| DomainError::invariant("stock delta overflow"))?;
        let new_stock = current
            .current_stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock level overflow"))?;

        if delta < 0 && new_stock < 0 {
            warn!(
                product_id = %current.id,
                available = current.current_stock,
                requested = quantity,
                %kind,
                "insufficient stock; movement rejected"
            );
            return Err(DomainError::insufficient_stock(current.current_stock, quantity));
        }

        self.store.set_product_stock(current.id, new_stock)?;

        let low_stock = new_stock <= current.min_stock_level;
        if low_stock && delta < 0 {
            warn!(
                product_id = %current.id,
                stock = new_stock,
                min_stock_level = current.min_stock_level,
                "product at or below minimum stock level"
            );
        }
        info!(product_id = %current.id, delta, new_stock, %kind, "stock adjusted");

        Ok(StockOutcome::Applied(StockMovement {
            product_id: current.id,
            kind,
            delta,
            previous_stock: current.current_stock,
            new_stock,
            min_stock_level: current.min_stock_level,
            low_stock,
        }))
    }

    fn resolve(&self, product: ProductRef<'_>) -> DomainResult<Option<Product>> {
        match product {
            ProductRef::Id(id) => self.store.get_product(id),
            ProductRef::Name(name) => {
                let key = normalize_name(name);
                if key.is_empty() {
                    return Ok(None);
                }
                self.store.find_product_by_name(&key)
            }
        }
    }
}
