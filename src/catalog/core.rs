//! Defines the core data models and database queries for the product catalog.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// Identifies one stock-bearing item.
///
/// Size fields are free-form strings (they may contain `/` for fractional
/// sizes such as `"3/4"`) and are compared as opaque strings for keying:
/// `"3/4"` and `"0.75"` are two different products. A product key uniquely
/// identifies one running-stock series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    /// The part type, e.g. "O-Ring", "Oil Seal".
    pub part_type: String,
    /// The inner diameter, stored as entered.
    pub id_size: String,
    /// The outer diameter, stored as entered.
    pub od_size: String,
    /// The thickness/height, stored as entered.
    pub th_size: String,
    /// The brand or manufacturer name.
    pub brand: String,
}

impl ProductKey {
    /// Create a product key from its five fields.
    pub fn new(part_type: &str, id_size: &str, od_size: &str, th_size: &str, brand: &str) -> Self {
        Self {
            part_type: part_type.to_owned(),
            id_size: id_size.to_owned(),
            od_size: od_size.to_owned(),
            th_size: th_size.to_owned(),
            brand: brand.to_owned(),
        }
    }
}

impl Display for ProductKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}x{}x{} ({})",
            self.part_type, self.id_size, self.od_size, self.th_size, self.brand
        )
    }
}

/// A catalog entry: a product key plus its database ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// The ID of the catalog row.
    pub id: DatabaseId,
    /// The key identifying the product.
    pub key: ProductKey,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the product table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                id_size TEXT NOT NULL,
                od_size TEXT NOT NULL,
                th_size TEXT NOT NULL,
                brand TEXT NOT NULL
                )",
        (),
    )?;

    // One catalog row per distinct 5-tuple key.
    connection.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_product_key
         ON product(type, id_size, od_size, th_size, brand);",
        (),
    )?;

    Ok(())
}

/// Create a new product in the catalog.
///
/// # Errors
/// This function will return an [Error::SqlError] if the product key already
/// exists or if there is some other SQL error.
pub fn create_product(key: &ProductKey, connection: &Connection) -> Result<Product, Error> {
    let product = connection
        .prepare(
            "INSERT INTO product (type, id_size, od_size, th_size, brand)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, type, id_size, od_size, th_size, brand",
        )?
        .query_row(
            (
                &key.part_type,
                &key.id_size,
                &key.od_size,
                &key.th_size,
                &key.brand,
            ),
            map_product_row,
        )?;

    Ok(product)
}

/// Check whether `key` refers to a product in the catalog.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn product_exists(key: &ProductKey, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection
        .prepare(
            "SELECT COUNT(id) FROM product
             WHERE type = ?1 AND id_size = ?2 AND od_size = ?3 AND th_size = ?4 AND brand = ?5",
        )?
        .query_row(
            (
                &key.part_type,
                &key.id_size,
                &key.od_size,
                &key.th_size,
                &key.brand,
            ),
            |row| row.get(0),
        )?;

    Ok(count > 0)
}

/// Retrieve every product in the catalog.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn get_products(connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare("SELECT id, type, id_size, od_size, th_size, brand FROM product ORDER BY id ASC")?
        .query_map([], map_product_row)?
        .map(|product_result| product_result.map_err(Error::from))
        .collect()
}

/// Retrieve products whose three size fields match `id_size`, `od_size` and
/// `th_size` exactly, ignoring type and brand.
///
/// Sizes are compared as the opaque strings they were stored with. When this
/// returns no rows, callers may fall back to
/// [closest_size_matches](crate::catalog::closest_size_matches).
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn find_products_by_sizes(
    id_size: &str,
    od_size: &str,
    th_size: &str,
    connection: &Connection,
) -> Result<Vec<Product>, Error> {
    connection
        .prepare(
            "SELECT id, type, id_size, od_size, th_size, brand FROM product
             WHERE id_size = ?1 AND od_size = ?2 AND th_size = ?3
             ORDER BY id ASC",
        )?
        .query_map((id_size, od_size, th_size), map_product_row)?
        .map(|product_result| product_result.map_err(Error::from))
        .collect()
}

/// Map a database row to a Product.
pub(crate) fn map_product_row(row: &Row) -> Result<Product, rusqlite::Error> {
    let id = row.get(0)?;
    let part_type = row.get(1)?;
    let id_size = row.get(2)?;
    let od_size = row.get(3)?;
    let th_size = row.get(4)?;
    let brand = row.get(5)?;

    Ok(Product {
        id,
        key: ProductKey {
            part_type,
            id_size,
            od_size,
            th_size,
            brand,
        },
    })
}

// ============================================================================
// TESTS
// ============================================================================
