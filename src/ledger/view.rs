//! Assembly of display rows for the report/UI layer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    database_id::RowId,
    transaction::{TransactionKind, TransactionRecord},
};

use super::{FabricationPairMap, StockValue, builder::sort_display_order};

/// One line of the rendered ledger table.
///
/// A fabrication pair collapses into a single row; its `row_id` is the later
/// member's, so `stock_after` reflects both underlying rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDisplayRow {
    /// The underlying row ID, or the later member for a fabrication pair.
    pub row_id: RowId,
    /// When the event happened.
    pub date: Date,
    /// Units restocked or fabricated, if any.
    pub restock_qty: Option<i64>,
    /// The per-unit cost of the restock side, if any.
    pub cost: Option<f64>,
    /// The customer or fabricator name.
    pub name: String,
    /// Units sold, as a positive magnitude, if any.
    pub sold_qty: Option<i64>,
    /// The per-unit sale price, if any.
    pub price: Option<f64>,
    /// The stock after this event. Renders as `?` when unknown.
    pub stock_after: StockValue,
    /// Whether this row stands for a fabrication pair.
    pub is_fabrication: bool,
}

/// Build the display-ordered rows for one product's ledger.
///
/// `rows` may arrive in any order; `balances` and `pairs` must come from the
/// same snapshot read as `rows`.
pub fn display_rows(
    rows: &[TransactionRecord],
    balances: &HashMap<RowId, StockValue>,
    pairs: &FabricationPairMap,
) -> Vec<LedgerDisplayRow> {
    let mut ordered: Vec<TransactionRecord> = rows.to_vec();
    sort_display_order(&mut ordered);

    let mut emitted_pairs: HashSet<RowId> = HashSet::new();
    let mut display = Vec::with_capacity(ordered.len());

    for record in &ordered {
        let Some(pair) = pairs.get(&record.row_id) else {
            display.push(single_row(record, balances));
            continue;
        };

        // Emit each pair once, at its first (latest) member in display order.
        if !emitted_pairs.insert(pair.later_row_id()) {
            continue;
        }

        let stock_after = balances
            .get(&pair.later_row_id())
            .copied()
            .unwrap_or(StockValue::Unknown);

        display.push(LedgerDisplayRow {
            row_id: pair.later_row_id(),
            date: pair.date(),
            restock_qty: Some(pair.qty_restocked()),
            cost: Some(pair.restock.price),
            name: pair.restock.name.clone(),
            sold_qty: Some(pair.qty_sold()),
            price: Some(pair.price()),
            stock_after,
            is_fabrication: true,
        });
    }

    display
}

fn single_row(
    record: &TransactionRecord,
    balances: &HashMap<RowId, StockValue>,
) -> LedgerDisplayRow {
    let stock_after = balances
        .get(&record.row_id)
        .copied()
        .unwrap_or(StockValue::Unknown);

    let (restock_qty, cost, sold_qty, price) = match record.kind {
        TransactionKind::Restock => (Some(record.quantity), Some(record.price), None, None),
        TransactionKind::Sale => (None, None, Some(record.quantity.abs()), Some(record.price)),
        // A count carries no traded quantity; it shows through stock_after.
        TransactionKind::ActualCount => (None, None, None, None),
    };

    LedgerDisplayRow {
        row_id: record.row_id,
        date: record.date,
        restock_qty,
        cost,
        name: record.name.clone(),
        sold_qty,
        price,
        stock_after,
        is_fabrication: false,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        catalog::ProductKey,
        ledger::{StockValue, resolve_fabrication_pairs, running_balances},
        transaction::{TransactionKind, TransactionRecord},
    };

    use super::display_rows;

    fn row(
        row_id: i64,
        date: time::Date,
        kind: TransactionKind,
        quantity: i64,
        name: &str,
        price: f64,
    ) -> TransactionRecord {
        TransactionRecord {
            row_id,
            date,
            product: ProductKey::new("O-Ring", "25", "32", "4", "NOK"),
            name: name.to_owned(),
            quantity,
            price,
            kind,
        }
    }

    #[test]
    fn fabrication_pair_collapses_to_one_row() {
        let rows = vec![
            row(1, date!(2025 - 03 - 01), TransactionKind::Restock, 50, "FAB-X", 1.2),
            row(2, date!(2025 - 03 - 01), TransactionKind::Sale, -30, "FAB-X", 4.0),
            row(3, date!(2025 - 03 - 02), TransactionKind::Sale, -5, "Walk-in", 4.5),
        ];
        let balances = running_balances(&rows);
        let pairs = resolve_fabrication_pairs(&rows);

        let display = display_rows(&rows, &balances, &pairs);

        assert_eq!(display.len(), 2);
        // Most recent first.
        assert_eq!(display[0].row_id, 3);
        let fabrication = &display[1];
        assert!(fabrication.is_fabrication);
        assert_eq!(fabrication.restock_qty, Some(50));
        assert_eq!(fabrication.sold_qty, Some(30));
        assert_eq!(fabrication.cost, Some(1.2));
        assert_eq!(fabrication.price, Some(4.0));
        // Stock after both sides of the pair: 50 - 30.
        assert_eq!(fabrication.stock_after, StockValue::Known(20));
    }

    #[test]
    fn unknown_stock_renders_as_placeholder() {
        let rows = vec![row(1, date!(2025 - 03 - 01), TransactionKind::Sale, -5, "", 4.0)];
        let balances = running_balances(&rows);

        let display = display_rows(&rows, &balances, &Default::default());

        assert_eq!(display[0].stock_after, StockValue::Unknown);
        assert_eq!(display[0].stock_after.to_string(), "?");
        assert_eq!(display[0].sold_qty, Some(5));
    }

    #[test]
    fn actual_count_shows_no_traded_quantities() {
        let rows = vec![row(1, date!(2025 - 03 - 01), TransactionKind::ActualCount, 9, "", 0.0)];
        let balances = running_balances(&rows);

        let display = display_rows(&rows, &balances, &Default::default());

        assert_eq!(display[0].restock_qty, None);
        assert_eq!(display[0].sold_qty, None);
        assert_eq!(display[0].stock_after, StockValue::Known(9));
    }
}
