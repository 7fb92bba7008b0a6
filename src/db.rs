//! Database initialisation for the application's tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, catalog::create_product_table, transaction::create_stock_transaction_table,
};

/// Create the application's tables if they do not exist.
///
/// All tables are created inside a single exclusive transaction.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_product_table(&sql_transaction)?;
    create_stock_transaction_table(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
