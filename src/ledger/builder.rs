//! Ordering and grouping of raw transaction rows into per-product ledgers.

use std::collections::HashMap;

use crate::{catalog::ProductKey, transaction::TransactionRecord};

/// Sort rows into computation order: ascending by `(date, row_id)`.
///
/// Row ID breaks ties between same-day entries so the running balance is
/// deterministic and stable across re-reads.
pub fn sort_computation_order(rows: &mut [TransactionRecord]) {
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.row_id.cmp(&b.row_id)));
}

/// Sort rows into display order: descending by `(date, row_id)`, most recent
/// first.
pub fn sort_display_order(rows: &mut [TransactionRecord]) {
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.row_id.cmp(&a.row_id)));
}

/// Group a mixed row set by product key, each group in computation order.
///
/// The grouping key is the exact 5-tuple as stored; no normalization or fuzzy
/// matching happens here.
pub fn group_by_product(
    rows: Vec<TransactionRecord>,
) -> HashMap<ProductKey, Vec<TransactionRecord>> {
    let mut groups: HashMap<ProductKey, Vec<TransactionRecord>> = HashMap::new();

    for row in rows {
        groups.entry(row.product.clone()).or_default().push(row);
    }

    for group in groups.values_mut() {
        sort_computation_order(group);
    }

    groups
}
