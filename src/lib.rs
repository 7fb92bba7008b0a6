//! Stockbook is the stock ledger and transaction-reconciliation engine for a
//! seal-parts point-of-sale system.
//!
//! The persisted state is a flat table of buy/sell/count rows per product.
//! Everything else is derived at read time: per-product running-stock
//! histories (where stock can become "unknown" rather than negative),
//! fabrication events inferred from paired restock/sale rows, and the edit
//! rules that keep the ledger consistent when an entry changes logical kind.

#![warn(missing_docs)]

pub mod catalog;
mod database_id;
pub mod db;
mod defaults;
pub mod editor;
mod error;
pub mod ledger;
pub mod transaction;

pub use database_id::{DatabaseId, RowId};
pub use defaults::LastEntryDefaults;
pub use error::Error;
