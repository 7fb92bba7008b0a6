//! Defines the core data models and database queries for stock transactions.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, catalog::ProductKey, database_id::RowId};

// ============================================================================
// MODELS
// ============================================================================

/// The stored kind of a ledger entry.
///
/// Fabrication is deliberately absent: it is never persisted as its own kind.
/// A fabrication event is stored as a [Restock](TransactionKind::Restock) row
/// and a [Sale](TransactionKind::Sale) row sharing the same date, product and
/// name, and is re-detected at read time by
/// [resolve_fabrication_pairs](crate::ledger::resolve_fabrication_pairs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Units bought in; `quantity` is positive.
    Restock,
    /// Units sold; `quantity` is stored negative, its magnitude is the number
    /// of units sold.
    Sale,
    /// A physical stock-take; `quantity` is the absolute counted amount and
    /// overrides the running balance.
    ActualCount,
}

impl TransactionKind {
    /// The integer code stored in the `is_restock` column.
    pub fn code(self) -> i64 {
        match self {
            TransactionKind::Sale => 0,
            TransactionKind::Restock => 1,
            TransactionKind::ActualCount => 2,
        }
    }

    /// Convert an `is_restock` column code back into a kind.
    ///
    /// # Errors
    /// Returns [Error::UnknownKindCode] for codes outside 0..=2.
    pub fn from_code(code: i64) -> Result<Self, Error> {
        match code {
            0 => Ok(TransactionKind::Sale),
            1 => Ok(TransactionKind::Restock),
            2 => Ok(TransactionKind::ActualCount),
            other => Err(Error::UnknownKindCode(other)),
        }
    }
}

/// One ledger entry: a buy, sell or count event for a single product.
///
/// To create a new `TransactionRecord`, use [TransactionRecord::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The ID of the transaction row. Stable across edits.
    pub row_id: RowId,
    /// When the transaction happened.
    pub date: Date,
    /// The product the transaction is for.
    pub product: ProductKey,
    /// The customer or fabricator name.
    pub name: String,
    /// The signed unit count. Positive for restocks, negative for sales, the
    /// absolute counted amount for actual counts.
    pub quantity: i64,
    /// The per-unit price of the transaction.
    pub price: f64,
    /// The stored kind of the transaction.
    pub kind: TransactionKind,
}

impl TransactionRecord {
    /// Create a new transaction row.
    ///
    /// Shortcut for [TransactionRecordBuilder] for discoverability.
    pub fn build(
        product: ProductKey,
        date: Date,
        kind: TransactionKind,
        quantity: i64,
    ) -> TransactionRecordBuilder {
        TransactionRecordBuilder {
            product,
            date,
            kind,
            quantity,
            name: String::new(),
            price: 0.0,
        }
    }
}

/// A builder for inserting [TransactionRecord] rows.
///
/// `quantity` is stored exactly as given; sign adjustment for sales is the
/// responsibility of the caller (normally [crate::editor]).
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionRecordBuilder {
    /// The product the transaction is for.
    pub product: ProductKey,
    /// When the transaction happened.
    pub date: Date,
    /// The stored kind of the transaction.
    pub kind: TransactionKind,
    /// The signed unit count to store.
    pub quantity: i64,
    /// The customer or fabricator name.
    pub name: String,
    /// The per-unit price of the transaction.
    pub price: f64,
}

impl TransactionRecordBuilder {
    /// Set the customer or fabricator name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    /// Set the per-unit price.
    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction row in the database from a builder.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    builder: TransactionRecordBuilder,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let record = connection
        .prepare(
            "INSERT INTO stock_transaction
                 (date, type, id_size, od_size, th_size, brand, name, quantity, price, is_restock)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING id, date, type, id_size, od_size, th_size, brand, name, quantity, price, is_restock",
        )?
        .query_row(
            params![
                builder.date,
                builder.product.part_type,
                builder.product.id_size,
                builder.product.od_size,
                builder.product.th_size,
                builder.product.brand,
                builder.name,
                builder.quantity,
                builder.price,
                builder.kind.code(),
            ],
            map_transaction_row,
        )?;

    Ok(record)
}

/// Retrieve a transaction row from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: RowId, connection: &Connection) -> Result<TransactionRecord, Error> {
    let record = connection
        .prepare(
            "SELECT id, date, type, id_size, od_size, th_size, brand, name, quantity, price, is_restock
             FROM stock_transaction WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(record)
}

/// Update a transaction row in place, keeping its row ID.
///
/// The product key columns are left untouched; an edit never moves an entry
/// to a different product's series.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingEntry] if `id` does not refer to a valid row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: RowId,
    date: Date,
    name: &str,
    quantity: i64,
    price: f64,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE stock_transaction
         SET date = ?1, name = ?2, quantity = ?3, price = ?4, is_restock = ?5
         WHERE id = ?6;",
        params![date, name, quantity, price, kind.code(), id],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingEntry);
    }

    Ok(())
}

/// Delete a transaction row by its `id`.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingEntry] if `id` does not refer to a valid row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: RowId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM stock_transaction WHERE id = ?1;", params![id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingEntry);
    }

    Ok(())
}

/// Create the stock transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_stock_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS stock_transaction (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                id_size TEXT NOT NULL,
                od_size TEXT NOT NULL,
                th_size TEXT NOT NULL,
                brand TEXT NOT NULL,
                name TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                is_restock INTEGER NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('stock_transaction', 0)",
        (),
    )?;

    // Composite index used by per-product ledger reads.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_stock_transaction_product_date
         ON stock_transaction(type, id_size, od_size, th_size, brand, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a TransactionRecord.
pub(crate) fn map_transaction_row(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    let row_id = row.get(0)?;
    let date = row.get(1)?;
    let part_type = row.get(2)?;
    let id_size = row.get(3)?;
    let od_size = row.get(4)?;
    let th_size = row.get(5)?;
    let brand = row.get(6)?;
    let name = row.get(7)?;
    let quantity = row.get(8)?;
    let price = row.get(9)?;
    let code: i64 = row.get(10)?;

    let kind = TransactionKind::from_code(code).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Integer, Box::new(error))
    })?;

    Ok(TransactionRecord {
        row_id,
        date,
        product: ProductKey {
            part_type,
            id_size,
            od_size,
            th_size,
            brand,
        },
        name,
        quantity,
        price,
        kind,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, catalog::ProductKey, db::initialize};

    use super::{
        TransactionKind, TransactionRecord, create_transaction, delete_transaction,
        get_transaction, update_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn test_product() -> ProductKey {
        ProductKey::new("O-Ring", "25", "32", "4", "NOK")
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let record = create_transaction(
            TransactionRecord::build(test_product(), date!(2025 - 10 - 05), TransactionKind::Restock, 10)
                .name("ACME Hydraulics")
                .price(3.5),
            &conn,
        )
        .expect("Could not create transaction");

        assert!(record.row_id > 0);
        assert_eq!(record.quantity, 10);
        assert_eq!(record.kind, TransactionKind::Restock);
        assert_eq!(record.name, "ACME Hydraulics");
    }

    #[test]
    fn get_round_trips() {
        let conn = get_test_connection();
        let created = create_transaction(
            TransactionRecord::build(test_product(), date!(2025 - 10 - 05), TransactionKind::Sale, -3)
                .price(5.0),
            &conn,
        )
        .unwrap();

        let fetched = get_transaction(created.row_id, &conn).expect("Could not get transaction");

        assert_eq!(created, fetched);
    }

    #[test]
    fn get_missing_row_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_rewrites_fields_and_keeps_id() {
        let conn = get_test_connection();
        let created = create_transaction(
            TransactionRecord::build(test_product(), date!(2025 - 10 - 05), TransactionKind::Restock, 10),
            &conn,
        )
        .unwrap();

        update_transaction(
            created.row_id,
            date!(2025 - 10 - 06),
            "Rewritten",
            -4,
            9.99,
            TransactionKind::Sale,
            &conn,
        )
        .expect("Could not update transaction");

        let fetched = get_transaction(created.row_id, &conn).unwrap();
        assert_eq!(fetched.row_id, created.row_id);
        assert_eq!(fetched.date, date!(2025 - 10 - 06));
        assert_eq!(fetched.quantity, -4);
        assert_eq!(fetched.kind, TransactionKind::Sale);
    }

    #[test]
    fn update_missing_row_fails() {
        let conn = get_test_connection();

        let result = update_transaction(
            42,
            date!(2025 - 10 - 06),
            "",
            1,
            0.0,
            TransactionKind::Restock,
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingEntry));
    }

    #[test]
    fn delete_removes_row() {
        let conn = get_test_connection();
        let created = create_transaction(
            TransactionRecord::build(test_product(), date!(2025 - 10 - 05), TransactionKind::ActualCount, 7),
            &conn,
        )
        .unwrap();

        delete_transaction(created.row_id, &conn).expect("Could not delete transaction");

        assert_eq!(get_transaction(created.row_id, &conn), Err(Error::NotFound));
        assert_eq!(delete_transaction(created.row_id, &conn), Err(Error::DeleteMissingEntry));
    }

    #[test]
    fn kind_codes_round_trip() {
        for kind in [
            TransactionKind::Sale,
            TransactionKind::Restock,
            TransactionKind::ActualCount,
        ] {
            assert_eq!(TransactionKind::from_code(kind.code()), Ok(kind));
        }

        assert_eq!(TransactionKind::from_code(3), Err(Error::UnknownKindCode(3)));
    }
}
