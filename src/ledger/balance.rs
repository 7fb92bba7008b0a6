//! The running stock balance over a computation-ordered ledger.

use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    database_id::RowId,
    transaction::{TransactionKind, TransactionRecord},
};

/// The on-hand stock after a ledger event.
///
/// A known value is never negative. `Unknown` means the true count can no
/// longer be trusted, which happens precisely when a sale would drive the
/// balance below zero. Negative stock is meaningless to the business, and
/// clamping to zero would silently hide the data-entry problem, so the series
/// stays unknown until a restock or physical count re-anchors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockValue {
    /// A trusted on-hand count.
    Known(i64),
    /// The count cannot be trusted.
    Unknown,
}

impl Display for StockValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockValue::Known(count) => write!(f, "{count}"),
            StockValue::Unknown => write!(f, "?"),
        }
    }
}

impl StockValue {
    /// Apply one ledger event to this balance.
    pub fn apply(self, record: &TransactionRecord) -> StockValue {
        match record.kind {
            // A physical count overrides history unconditionally.
            TransactionKind::ActualCount => StockValue::Known(record.quantity),
            TransactionKind::Restock => match self {
                StockValue::Known(balance) => StockValue::Known(balance + record.quantity),
                // An unknown quantity cannot be added to; the restocked
                // amount is the only trustworthy count.
                StockValue::Unknown => StockValue::Known(record.quantity),
            },
            TransactionKind::Sale => {
                let magnitude = record.quantity.abs();
                match self {
                    StockValue::Known(balance) if balance - magnitude >= 0 => {
                        StockValue::Known(balance - magnitude)
                    }
                    // An over-sale, or a sale on an already unknown balance.
                    _ => StockValue::Unknown,
                }
            }
        }
    }
}

/// Compute the stock-after value for every row of a computation-ordered
/// ledger, keyed by row ID.
///
/// Keying by row ID lets callers look up the balance at any point without
/// recomputing for display orderings. The fold is seeded at `Known(0)` and is
/// pairing-agnostic: fabrication members are processed as the ordinary
/// restock and sale rows they are stored as.
pub fn running_balances(rows: &[TransactionRecord]) -> HashMap<RowId, StockValue> {
    let mut balances = HashMap::with_capacity(rows.len());
    let mut balance = StockValue::Known(0);

    for record in rows {
        balance = balance.apply(record);
        balances.insert(record.row_id, balance);
    }

    balances
}
