//! Detection of fabrication pairs: restock/sale row pairs that jointly
//! represent one "made N units, sold M of them" event.
//!
//! Pairing is a display and editing grouping only. The running balance
//! calculator never sees pairs; it always processes the two underlying rows
//! as ordinary restock and sale events, which rules out double-application
//! bugs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    catalog::ProductKey,
    database_id::RowId,
    transaction::{TransactionKind, TransactionRecord},
};

/// One fabrication event, viewed over its two stored rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricationView {
    /// The restock side: the units that were made.
    pub restock: TransactionRecord,
    /// The sale side: the units that were sold on immediately.
    pub sale: TransactionRecord,
}

impl FabricationView {
    /// The number of units fabricated.
    pub fn qty_restocked(&self) -> i64 {
        self.restock.quantity
    }

    /// The number of units sold out of the fabricated batch.
    pub fn qty_sold(&self) -> i64 {
        self.sale.quantity.abs()
    }

    /// Units fabricated minus units sold. May be negative; flagging that as
    /// an error state is the caller's concern, not this engine's.
    pub fn net_quantity(&self) -> i64 {
        self.qty_restocked() - self.qty_sold()
    }

    /// The displayed price of the event: the fabrication sale price.
    pub fn price(&self) -> f64 {
        self.sale.price
    }

    /// The shared date of both rows.
    pub fn date(&self) -> Date {
        self.restock.date
    }

    /// The row ID of whichever member is later by `(date, row_id)`.
    ///
    /// The running balance at this row is the stock after both sides of the
    /// pair have been applied.
    pub fn later_row_id(&self) -> RowId {
        let restock_key = (self.restock.date, self.restock.row_id);
        let sale_key = (self.sale.date, self.sale.row_id);

        if sale_key > restock_key {
            self.sale.row_id
        } else {
            self.restock.row_id
        }
    }

    /// Whether `row_id` is one of the two member rows.
    pub fn contains(&self, row_id: RowId) -> bool {
        self.restock.row_id == row_id || self.sale.row_id == row_id
    }
}

/// Maps each member row ID to the fabrication pair it belongs to.
///
/// Both members of a pair key the same [FabricationView]. Recomputed on every
/// read alongside the ledger series; never cached across a write.
pub type FabricationPairMap = HashMap<RowId, FabricationView>;

/// Scan `rows` for restock/sale pairs that represent one fabrication event.
///
/// Rows are grouped by `(date, product, name)`. Within a group the i-th
/// restock pairs with the i-th sale in encounter order; when the counts
/// differ, the surplus rows remain ordinary single entries rather than
/// raising an error.
pub fn resolve_fabrication_pairs(rows: &[TransactionRecord]) -> FabricationPairMap {
    let mut restocks: HashMap<(Date, ProductKey, String), Vec<&TransactionRecord>> = HashMap::new();
    let mut sales: HashMap<(Date, ProductKey, String), Vec<&TransactionRecord>> = HashMap::new();

    for record in rows {
        let group = match record.kind {
            TransactionKind::Restock => &mut restocks,
            TransactionKind::Sale => &mut sales,
            TransactionKind::ActualCount => continue,
        };

        group
            .entry((record.date, record.product.clone(), record.name.clone()))
            .or_default()
            .push(record);
    }

    let mut pairs = FabricationPairMap::new();

    for (group_key, group_restocks) in restocks {
        let Some(group_sales) = sales.get(&group_key) else {
            continue;
        };

        for (restock, sale) in group_restocks.iter().zip(group_sales.iter()) {
            let view = FabricationView {
                restock: (*restock).clone(),
                sale: (*sale).clone(),
            };

            pairs.insert(restock.row_id, view.clone());
            pairs.insert(sale.row_id, view);
        }
    }

    pairs
}
