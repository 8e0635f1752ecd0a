//! `recon-core` — shared building blocks for the tax & reconciliation engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod kind;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EntryId, InvoiceId, PartyId, ProductId, PurchaseOrderId, PurchaseOrderLineId};
pub use kind::{EntityRole, TransactionKind};
