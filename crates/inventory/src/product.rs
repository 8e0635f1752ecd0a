use serde::{Deserialize, Serialize};

use recon_core::{DomainError, DomainResult, Entity, ProductId};

/// Catalog product, reduced to what the stock ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub current_stock: i64,
    #[serde(default)]
    pub min_stock_level: i64,
}

impl Product {
    pub fn new(name: impl Into<String>, current_stock: i64, min_stock_level: i64) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            current_stock,
            min_stock_level,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Checks a catalog record before it is stored.
    pub fn validate(&self) -> DomainResult<()> {
        if normalize_name(&self.name).is_empty() {
            return Err(DomainError::validation(format!("product {} needs a name", self.id)));
        }
        if self.current_stock < 0 {
            return Err(DomainError::validation(format!(
                "product {} has negative stock {}",
                self.id, self.current_stock
            )));
        }
        if self.min_stock_level < 0 {
            return Err(DomainError::validation(format!(
                "product {} has negative minimum stock level {}",
                self.id, self.min_stock_level
            )));
        }
        Ok(())
    }

    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock_level
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Key used for name matching: trimmed, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// How a line points at the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductRef<'a> {
    Id(ProductId),
    Name(&'a str),
}

impl<'a> ProductRef<'a> {
    /// Explicit id wins; otherwise fall back to the free-text name.
    pub fn for_line(product_id: Option<ProductId>, name: &'a str) -> Self {
        match product_id {
            Some(id) => ProductRef::Id(id),
            None => ProductRef::Name(name),
        }
    }
}

impl core::fmt::Display for ProductRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProductRef::Id(id) => write!(f, "product {id}"),
            ProductRef::Name(name) => write!(f, "product named {name:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_normalize_case_and_whitespace() {
        assert_eq!(normalize_name("  Basmati Rice "), "basmati rice");
        assert_eq!(Product::new("ABC", 0, 0).normalized_name(), "abc");
    }

    #[test]
    fn explicit_id_takes_precedence_over_name() {
        let id = ProductId::new();
        assert_eq!(ProductRef::for_line(Some(id), "Widget"), ProductRef::Id(id));
        assert_eq!(ProductRef::for_line(None, "Widget"), ProductRef::Name("Widget"));
    }
}
