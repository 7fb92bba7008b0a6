//! Add/Edit/Delete operations over the ledger, including the type-conversion
//! rules for entries that change logical kind during editing.
//!
//! A fabrication entry is two stored rows, so retyping an entry can require
//! several row mutations. Every operation here runs inside one SQLite
//! transaction: either all of its row mutations apply, or none do. A failure
//! part-way can therefore never leave a dangling single row masquerading as
//! half a pair.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::Date;

use crate::{
    Error,
    catalog::{ProductKey, product_exists},
    database_id::RowId,
    defaults::LastEntryDefaults,
    ledger::FabricationPairMap,
    transaction::{
        TransactionKind, TransactionRecord, create_transaction, delete_transaction,
        get_transaction, update_transaction,
    },
};

/// The caller-facing description of one logical ledger entry.
///
/// Quantities are positive unit counts as entered on the form; the engine
/// applies the storage sign convention. For a fabrication,
/// `qty_restocked >= qty_sold` is the form layer's concern; the engine
/// accepts and stores a deficit and only computes the (negative) net.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryForm {
    /// A plain restock, sale or actual count.
    Single {
        /// The stored kind of the entry.
        kind: TransactionKind,
        /// When the event happened.
        date: Date,
        /// The customer or fabricator name.
        name: String,
        /// The positive unit count.
        quantity: i64,
        /// The per-unit price.
        price: f64,
    },
    /// A fabrication: made `qty_restocked` units, sold `qty_sold` of them.
    Fabrication {
        /// When the event happened.
        date: Date,
        /// The fabricator name, shared by both stored rows.
        name: String,
        /// The positive number of units made.
        qty_restocked: i64,
        /// The positive number of units sold on immediately.
        qty_sold: i64,
        /// The per-unit cost of the restock side.
        cost: f64,
        /// The per-unit price of the sale side.
        price: f64,
    },
}

impl EntryForm {
    fn validate(&self) -> Result<(), Error> {
        match self {
            EntryForm::Single { quantity, price, .. } => {
                validate_quantity(*quantity)?;
                validate_price(*price)
            }
            EntryForm::Fabrication {
                qty_restocked,
                qty_sold,
                cost,
                price,
                ..
            } => {
                validate_quantity(*qty_restocked)?;
                validate_quantity(*qty_sold)?;
                validate_price(*cost)?;
                validate_price(*price)
            }
        }
    }
}

fn validate_quantity(quantity: i64) -> Result<(), Error> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity(quantity));
    }

    Ok(())
}

fn validate_price(price: f64) -> Result<(), Error> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice(price));
    }

    Ok(())
}

/// Apply the storage sign convention to a positive form quantity.
fn stored_quantity(kind: TransactionKind, quantity: i64) -> i64 {
    match kind {
        TransactionKind::Sale => -quantity,
        TransactionKind::Restock | TransactionKind::ActualCount => quantity,
    }
}

/// The rows inserted by a successful add, plus the prefill context for the
/// caller's next add form.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedEntry {
    /// The inserted rows: one, or two for a fabrication.
    pub records: Vec<TransactionRecord>,
    /// Prefill values for the next add form.
    pub defaults: LastEntryDefaults,
}

/// Insert a new logical entry for `product`.
///
/// A fabrication inserts its restock and sale rows atomically.
///
/// # Errors
/// This function will return a:
/// - [Error::ProductNotFound] if `product` is not in the catalog,
/// - [Error::InvalidQuantity] or [Error::InvalidPrice] for non-positive
///   quantities or invalid prices,
/// - or [Error::SqlError] if there is some SQL error. No rows are left
///   behind in that case.
pub fn add_entry(
    product: &ProductKey,
    form: EntryForm,
    connection: &Connection,
) -> Result<AddedEntry, Error> {
    form.validate()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    if !product_exists(product, &sql_transaction)? {
        return Err(Error::ProductNotFound(product.clone()));
    }

    let records = insert_form_rows(product, &form, &sql_transaction)?;

    sql_transaction.commit()?;

    let defaults = LastEntryDefaults::from_record(&records[0]);

    Ok(AddedEntry { records, defaults })
}

/// Insert the stored row(s) for `form`. Runs inside the caller's transaction.
fn insert_form_rows(
    product: &ProductKey,
    form: &EntryForm,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    match form {
        EntryForm::Single {
            kind,
            date,
            name,
            quantity,
            price,
        } => {
            let record = create_transaction(
                TransactionRecord::build(product.clone(), *date, *kind, stored_quantity(*kind, *quantity))
                    .name(name)
                    .price(*price),
                connection,
            )?;

            Ok(vec![record])
        }
        EntryForm::Fabrication {
            date,
            name,
            qty_restocked,
            qty_sold,
            cost,
            price,
        } => {
            // Same date and name on both rows is what lets the resolver
            // re-detect this pair on the next read.
            let restock = create_transaction(
                TransactionRecord::build(product.clone(), *date, TransactionKind::Restock, *qty_restocked)
                    .name(name)
                    .price(*cost),
                connection,
            )?;
            let sale = create_transaction(
                TransactionRecord::build(product.clone(), *date, TransactionKind::Sale, -qty_sold)
                    .name(name)
                    .price(*price),
                connection,
            )?;

            Ok(vec![restock, sale])
        }
    }
}

/// Rewrite the logical entry containing `row_id` to match `form`.
///
/// `pairs` must come from the same snapshot the caller showed the user; it
/// decides whether `row_id` is a single row or half a fabrication pair.
///
/// Transitions:
/// - single to single: the row is updated in place.
/// - single to fabrication: the row is deleted and two new rows inserted.
/// - fabrication to single: the sale-side row is deleted and the
///   restock-side row updated in place, keeping one stable row ID.
/// - fabrication to fabrication: both rows are updated in place.
///
/// # Errors
/// This function will return a:
/// - [Error::ProductNotFound] if the entry's product is not in the catalog,
/// - [Error::InvalidQuantity] or [Error::InvalidPrice] for bad form values,
/// - [Error::NotFound] / [Error::UpdateMissingEntry] /
///   [Error::DeleteMissingEntry] if the entry vanished since the snapshot,
/// - or [Error::SqlError] if there is some SQL error.
///
/// On any error every row mutation is rolled back.
pub fn edit_entry(
    row_id: RowId,
    form: EntryForm,
    pairs: &FabricationPairMap,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    form.validate()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let existing = get_transaction(row_id, &sql_transaction)?;

    if !product_exists(&existing.product, &sql_transaction)? {
        return Err(Error::ProductNotFound(existing.product));
    }

    let pair = pairs.get(&row_id);

    let records = match (pair, &form) {
        // Single staying single: update the one row in place.
        (None, EntryForm::Single { kind, date, name, quantity, price }) => {
            update_transaction(
                row_id,
                *date,
                name,
                stored_quantity(*kind, *quantity),
                *price,
                *kind,
                &sql_transaction,
            )?;

            vec![get_transaction(row_id, &sql_transaction)?]
        }
        // Single becoming a fabrication: replace the row with a fresh pair.
        (None, EntryForm::Fabrication { .. }) => {
            delete_transaction(row_id, &sql_transaction)?;
            insert_form_rows(&existing.product, &form, &sql_transaction)?
        }
        // Fabrication collapsing to a single: the restock side keeps its row
        // ID and takes the new data, the sale side goes away.
        (Some(pair), EntryForm::Single { kind, date, name, quantity, price }) => {
            delete_transaction(pair.sale.row_id, &sql_transaction)?;
            update_transaction(
                pair.restock.row_id,
                *date,
                name,
                stored_quantity(*kind, *quantity),
                *price,
                *kind,
                &sql_transaction,
            )?;

            vec![get_transaction(pair.restock.row_id, &sql_transaction)?]
        }
        // Fabrication staying a fabrication: both rows keep their IDs.
        (
            Some(pair),
            EntryForm::Fabrication {
                date,
                name,
                qty_restocked,
                qty_sold,
                cost,
                price,
            },
        ) => {
            update_transaction(
                pair.restock.row_id,
                *date,
                name,
                *qty_restocked,
                *cost,
                TransactionKind::Restock,
                &sql_transaction,
            )?;
            update_transaction(
                pair.sale.row_id,
                *date,
                name,
                -qty_sold,
                *price,
                TransactionKind::Sale,
                &sql_transaction,
            )?;

            vec![
                get_transaction(pair.restock.row_id, &sql_transaction)?,
                get_transaction(pair.sale.row_id, &sql_transaction)?,
            ]
        }
    };

    sql_transaction.commit()?;

    Ok(records)
}

/// Delete the logical entry containing `row_id`.
///
/// If the row is half a fabrication pair, both member rows are deleted
/// together; deleting only one half would leave an orphaned row that the
/// resolver can no longer interpret.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingEntry] if the entry vanished since the snapshot,
/// - or [Error::SqlError] if there is some SQL error.
///
/// On any error, neither row is deleted.
pub fn delete_entry(
    row_id: RowId,
    pairs: &FabricationPairMap,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    match pairs.get(&row_id) {
        Some(pair) => {
            delete_transaction(pair.restock.row_id, &sql_transaction)?;
            delete_transaction(pair.sale.row_id, &sql_transaction)?;
        }
        None => delete_transaction(row_id, &sql_transaction)?,
    }

    sql_transaction.commit()?;

    Ok(())
}
