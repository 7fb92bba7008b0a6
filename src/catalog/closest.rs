//! Closest-size fallback search over the product catalog.
//!
//! When an exact size lookup returns no rows, this search widens each of the
//! three size dimensions independently by one unit and ranks the remaining
//! candidates by how far they deviate from the requested sizes in total.
//! Read-only; the ledger is never involved.

use rusqlite::Connection;

use crate::Error;

use super::{Product, core::map_product_row};

/// A catalog product paired with its total absolute size deviation from the
/// requested dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedProduct {
    /// The candidate product.
    pub product: Product,
    /// `|id - want_id| + |od - want_od| + |th - want_th|`.
    pub deviation: f64,
}

/// Parse a size string as either a decimal number or an `a/b` fraction.
///
/// Returns [None] for anything else; unparseable sizes are skipped by the
/// search rather than treated as errors.
pub fn parse_size(text: &str) -> Option<f64> {
    let text = text.trim();

    if let Some((numerator, denominator)) = text.split_once('/') {
        let numerator: f64 = numerator.trim().parse().ok()?;
        let denominator: f64 = denominator.trim().parse().ok()?;

        if denominator == 0.0 {
            return None;
        }

        return Some(numerator / denominator);
    }

    text.parse().ok()
}

/// Find the products closest in size to `(id_size, od_size, th_size)`.
///
/// Candidates must lie within one unit of the requested value in every
/// dimension. Exact three-way matches are excluded since this search is a
/// fallback for when the exact lookup found nothing. Results are sorted by
/// [SizedProduct::deviation], ascending.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn closest_size_matches(
    id_size: f64,
    od_size: f64,
    th_size: f64,
    connection: &Connection,
) -> Result<Vec<SizedProduct>, Error> {
    // Sizes are stored as free-form strings, so the numeric widening happens
    // here rather than in SQL.
    let products: Vec<Product> = connection
        .prepare("SELECT id, type, id_size, od_size, th_size, brand FROM product ORDER BY id ASC")?
        .query_map([], map_product_row)?
        .map(|product_result| product_result.map_err(Error::from))
        .collect::<Result<_, _>>()?;

    let mut candidates: Vec<SizedProduct> = products
        .into_iter()
        .filter_map(|product| {
            let id = parse_size(&product.key.id_size)?;
            let od = parse_size(&product.key.od_size)?;
            let th = parse_size(&product.key.th_size)?;

            let id_delta = (id - id_size).abs();
            let od_delta = (od - od_size).abs();
            let th_delta = (th - th_size).abs();

            if id_delta > 1.0 || od_delta > 1.0 || th_delta > 1.0 {
                return None;
            }

            let deviation = id_delta + od_delta + th_delta;
            if deviation == 0.0 {
                return None;
            }

            Some(SizedProduct { product, deviation })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.deviation
            .partial_cmp(&b.deviation)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(candidates)
}

#[cfg(test)]
mod parse_size_tests {
    use super::parse_size;

    #[test]
    fn parses_decimals_and_fractions() {
        assert_eq!(parse_size("25"), Some(25.0));
        assert_eq!(parse_size("0.75"), Some(0.75));
        assert_eq!(parse_size("3/4"), Some(0.75));
        assert_eq!(parse_size(" 1 / 8 "), Some(0.125));
    }

    #[test]
    fn rejects_garbage_and_zero_denominators() {
        assert_eq!(parse_size("big"), None);
        assert_eq!(parse_size("3/0"), None);
        assert_eq!(parse_size(""), None);
    }
}

#[cfg(test)]
mod closest_size_tests {
    use rusqlite::Connection;

    use crate::{
        catalog::{ProductKey, create_product},
        db::initialize,
    };

    use super::closest_size_matches;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn ranks_by_total_deviation() {
        let conn = get_test_connection();
        create_product(&ProductKey::new("O-Ring", "26", "32", "4", "NOK"), &conn).unwrap();
        create_product(&ProductKey::new("O-Ring", "25", "33", "5", "NOK"), &conn).unwrap();

        let matches = closest_size_matches(25.0, 32.0, 4.0, &conn).expect("Search failed");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].product.key.id_size, "26");
        assert_eq!(matches[0].deviation, 1.0);
        assert_eq!(matches[1].deviation, 2.0);
    }

    #[test]
    fn excludes_exact_matches_and_far_candidates() {
        let conn = get_test_connection();
        create_product(&ProductKey::new("O-Ring", "25", "32", "4", "NOK"), &conn).unwrap();
        create_product(&ProductKey::new("O-Ring", "28", "32", "4", "NOK"), &conn).unwrap();

        let matches = closest_size_matches(25.0, 32.0, 4.0, &conn).expect("Search failed");

        assert!(matches.is_empty());
    }

    #[test]
    fn fractional_sizes_participate_numerically() {
        let conn = get_test_connection();
        create_product(&ProductKey::new("O-Ring", "3/4", "1", "1/8", "NOK"), &conn).unwrap();
        create_product(
            &ProductKey::new("O-Ring", "mystery", "1", "1/8", "NOK"),
            &conn,
        )
        .unwrap();

        let matches = closest_size_matches(1.0, 1.0, 0.125, &conn).expect("Search failed");

        // The unparseable row is skipped, the fractional row matches at 0.25.
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].product.key.id_size, "3/4");
        assert_eq!(matches[0].deviation, 0.25);
    }
}
