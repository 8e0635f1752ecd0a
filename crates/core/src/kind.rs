//! Shared transaction vocabulary.

use serde::{Deserialize, Serialize};

/// What a transaction does to stock and to the tax period.
///
/// Returns are the additive inverse of their forward counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Purchase,
    SaleReturn,
    PurchaseReturn,
}

impl TransactionKind {
    pub fn is_return(self) -> bool {
        matches!(self, Self::SaleReturn | Self::PurchaseReturn)
    }

    /// The forward kind this transaction mirrors (identity for forward kinds).
    pub fn forward(self) -> Self {
        match self {
            Self::Sale | Self::SaleReturn => Self::Sale,
            Self::Purchase | Self::PurchaseReturn => Self::Purchase,
        }
    }

    /// +1 for stock coming in, -1 for stock going out.
    pub fn stock_direction(self) -> i64 {
        match self {
            Self::Sale | Self::PurchaseReturn => -1,
            Self::Purchase | Self::SaleReturn => 1,
        }
    }

    /// +1 for forward kinds, -1 for returns.
    pub fn period_sign(self) -> i64 {
        if self.is_return() { -1 } else { 1 }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::SaleReturn => "sale_return",
            Self::PurchaseReturn => "purchase_return",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of the counterparty on a transaction.
///
/// Only `Customer` transactions are linked to inventory; every other role is an
/// open item even if a line happens to name a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Customer,
    Supplier,
    Wholesaler,
    Transport,
    Labour,
    Other,
}

impl EntityRole {
    pub fn is_inventory_linked(self) -> bool {
        self == Self::Customer
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
            Self::Wholesaler => "wholesaler",
            Self::Transport => "transport",
            Self::Labour => "labour",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for EntityRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
