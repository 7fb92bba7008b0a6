//! The stock transaction store: raw buy/sell/count rows keyed by product.
//!
//! Rows are the only persisted state of the ledger engine; everything in
//! [crate::ledger] is derived from them at read time.

mod core;
mod query;

pub use core::{
    TransactionKind, TransactionRecord, TransactionRecordBuilder, create_stock_transaction_table,
    create_transaction, delete_transaction, get_transaction, update_transaction,
};
pub use query::get_product_transactions;
