//! Defines the app level error type and conversions from SQL errors.

use crate::catalog::ProductKey;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A write referenced a product that does not exist in the catalog.
    ///
    /// Writes never auto-create products; the caller must add the product
    /// first and retry.
    #[error("the product {0} does not exist in the catalog")]
    ProductNotFound(ProductKey),

    /// A non-positive quantity was used to create or edit a ledger entry.
    ///
    /// Quantities are entered as positive unit counts; the sign convention
    /// for sales is applied by the engine, not by the caller.
    #[error("{0} is not a valid quantity, expected a positive number of units")]
    InvalidQuantity(i64),

    /// A negative price was used to create or edit a ledger entry.
    #[error("{0} is not a valid price")]
    InvalidPrice(f64),

    /// The requested row or product could not be found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a ledger entry that does not exist.
    #[error("tried to delete a ledger entry that is not in the database")]
    DeleteMissingEntry,

    /// Tried to update a ledger entry that does not exist.
    #[error("tried to update a ledger entry that is not in the database")]
    UpdateMissingEntry,

    /// The `is_restock` column held a code outside the known set (0, 1, 2).
    #[error("{0} is not a known transaction kind code")]
    UnknownKindCode(i64),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
