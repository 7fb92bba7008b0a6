//! Derived, read-time views over the transaction store: orderings, running
//! balances, fabrication pairs and display rows.
//!
//! Everything here is a pure function of the current rows for one product
//! key. Nothing is persisted or cached; a [Ledger] must be re-loaded after
//! every write.

mod balance;
mod builder;
mod fabrication;
mod view;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use std::collections::HashMap;

use crate::{
    Error, catalog::ProductKey, database_id::RowId, transaction::get_product_transactions,
    transaction::TransactionRecord,
};

pub use balance::{StockValue, running_balances};
pub use builder::{group_by_product, sort_computation_order, sort_display_order};
pub use fabrication::{FabricationPairMap, FabricationView, resolve_fabrication_pairs};
pub use view::{LedgerDisplayRow, display_rows};

/// One consistent snapshot of a product's ledger: the rows in computation
/// order, the stock after every row, and the detected fabrication pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// The product this ledger belongs to.
    pub product: ProductKey,
    /// Every transaction row for the product, in computation order.
    pub rows: Vec<TransactionRecord>,
    /// The stock after each row, keyed by row ID.
    pub balances: HashMap<RowId, StockValue>,
    /// The fabrication pairs detected over `rows`.
    pub pairs: FabricationPairMap,
}

impl Ledger {
    /// Load a consistent snapshot of the ledger for `product`.
    ///
    /// The row read, balance fold and pair resolution all happen inside one
    /// SQLite read transaction, so an interleaved write cannot produce a
    /// balance computed over rows it never saw.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is some SQL
    /// error.
    pub fn load(product: &ProductKey, connection: &Connection) -> Result<Self, Error> {
        let sql_transaction =
            SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

        let rows = get_product_transactions(product, &sql_transaction)?;

        sql_transaction.commit()?;

        Ok(Self::from_rows(product.clone(), rows))
    }

    /// Build the derived views over rows already read elsewhere.
    ///
    /// `rows` may arrive in any order; they are re-sorted into computation
    /// order here.
    pub fn from_rows(product: ProductKey, mut rows: Vec<TransactionRecord>) -> Self {
        sort_computation_order(&mut rows);

        let balances = running_balances(&rows);
        let pairs = resolve_fabrication_pairs(&rows);

        Self {
            product,
            rows,
            balances,
            pairs,
        }
    }

    /// The stock after the row with `row_id`, if the row is in this ledger.
    pub fn stock_after(&self, row_id: RowId) -> Option<StockValue> {
        self.balances.get(&row_id).copied()
    }

    /// The final running balance, or `Known(0)` for an empty ledger.
    pub fn current_stock(&self) -> StockValue {
        self.rows
            .last()
            .and_then(|record| self.stock_after(record.row_id))
            .unwrap_or(StockValue::Known(0))
    }

    /// The display-ordered table rows, with fabrication pairs collapsed.
    pub fn display_rows(&self) -> Vec<LedgerDisplayRow> {
        display_rows(&self.rows, &self.balances, &self.pairs)
    }
}
