//! The product catalog: the set of stock-tracked parts and lookups over it.
//!
//! The catalog is a write precondition for the ledger: a transaction row may
//! only reference a product that already exists here.

mod closest;
mod core;

pub use closest::{SizedProduct, closest_size_matches, parse_size};
pub use core::{
    Product, ProductKey, create_product, create_product_table, find_products_by_sizes,
    get_products, product_exists,
};
