//! Database query helpers for per-product ledger reads.

use rusqlite::{Connection, params};

use crate::{Error, catalog::ProductKey};

use super::{TransactionRecord, core::map_transaction_row};

/// Get every transaction row for one product, in computation order.
///
/// Rows are sorted by date, and then row ID so that same-day entries keep a
/// stable, deterministic order across re-reads.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_product_transactions(
    product: &ProductKey,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    connection
        .prepare(
            "SELECT id, date, type, id_size, od_size, th_size, brand, name, quantity, price, is_restock
             FROM stock_transaction
             WHERE type = ?1 AND id_size = ?2 AND od_size = ?3 AND th_size = ?4 AND brand = ?5
             ORDER BY date ASC, id ASC",
        )?
        .query_map(
            params![
                product.part_type,
                product.id_size,
                product.od_size,
                product.th_size,
                product.brand,
            ],
            map_transaction_row,
        )?
        .map(|record_result| record_result.map_err(Error::from))
        .collect()
}
