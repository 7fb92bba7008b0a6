use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};
use unicode_segmentation::UnicodeSegmentation;

use stockbook::{
    catalog::{
        ProductKey, closest_size_matches, find_products_by_sizes, parse_size, product_exists,
    },
    ledger::Ledger,
};

/// Print the stock ledger for one product.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path of the SQLite database.
    #[arg(long, short)]
    db_path: String,

    /// The part type, e.g. "O-Ring".
    #[arg(long)]
    part_type: String,

    /// The inner diameter, as stored.
    #[arg(long)]
    id_size: String,

    /// The outer diameter, as stored.
    #[arg(long)]
    od_size: String,

    /// The thickness/height, as stored.
    #[arg(long)]
    th_size: String,

    /// The brand or manufacturer name.
    #[arg(long)]
    brand: String,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();

    let args = Args::parse();

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            eprintln!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let product = ProductKey::new(
        &args.part_type,
        &args.id_size,
        &args.od_size,
        &args.th_size,
        &args.brand,
    );

    match product_exists(&product, &connection) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("{product} is not in the catalog.");
            suggest_alternatives(&product, &connection);
            exit(1);
        }
        Err(error) => {
            eprintln!("Could not query the catalog: {error}");
            exit(1);
        }
    }

    let ledger = match Ledger::load(&product, &connection) {
        Ok(ledger) => ledger,
        Err(error) => {
            eprintln!("Could not load the ledger for {product}: {error}");
            exit(1);
        }
    };

    println!("Ledger for {product} (current stock: {})", ledger.current_stock());
    println!(
        "{:<12} {:>8} {:>8} {:<24} {:>8} {:>8} {:>8}",
        "date", "restock", "cost", "name", "sold", "price", "stock"
    );

    for row in ledger.display_rows() {
        println!(
            "{:<12} {:>8} {:>8} {:<24} {:>8} {:>8} {:>8}",
            row.date.to_string(),
            format_quantity(row.restock_qty),
            format_price(row.cost),
            truncate_name(&row.name, row.is_fabrication),
            format_quantity(row.sold_qty),
            format_price(row.price),
            row.stock_after.to_string(),
        );
    }
}

fn suggest_alternatives(product: &ProductKey, connection: &Connection) {
    for line in alternative_product_lines(product, connection) {
        eprintln!("{line}");
    }
}

/// Suggestion lines for a product missing from the catalog: products with the
/// same three sizes under a different type or brand, and only when that exact
/// size lookup comes back empty, the closest-size fallback.
fn alternative_product_lines(product: &ProductKey, connection: &Connection) -> Vec<String> {
    let exact = match find_products_by_sizes(
        &product.id_size,
        &product.od_size,
        &product.th_size,
        connection,
    ) {
        Ok(products) => products,
        Err(error) => {
            tracing::error!("Size lookup failed: {error}");
            return Vec::new();
        }
    };

    if !exact.is_empty() {
        let mut lines = vec!["Products with these exact sizes:".to_owned()];
        lines.extend(exact.iter().take(5).map(|entry| format!("  {}", entry.key)));
        return lines;
    }

    let (Some(id), Some(od), Some(th)) = (
        parse_size(&product.id_size),
        parse_size(&product.od_size),
        parse_size(&product.th_size),
    ) else {
        return Vec::new();
    };

    let matches = match closest_size_matches(id, od, th, connection) {
        Ok(matches) => matches,
        Err(error) => {
            tracing::error!("Closest-size search failed: {error}");
            return Vec::new();
        }
    };

    if matches.is_empty() {
        return Vec::new();
    }

    let mut lines = vec!["Closest sizes in the catalog:".to_owned()];
    lines.extend(
        matches
            .iter()
            .take(5)
            .map(|candidate| format!("  {} (off by {})", candidate.product.key, candidate.deviation)),
    );
    lines
}

fn format_quantity(quantity: Option<i64>) -> String {
    quantity.map(|q| q.to_string()).unwrap_or_default()
}

fn format_price(price: Option<f64>) -> String {
    price.map(|p| format!("{p:.2}")).unwrap_or_default()
}

const MAX_NAME_GRAPHEMES: usize = 24;

fn truncate_name(name: &str, is_fabrication: bool) -> String {
    let display = if is_fabrication {
        format!("{name} (fabrication)")
    } else {
        name.to_owned()
    };

    // Names are free-form text, so truncate on grapheme boundaries rather
    // than bytes.
    if display.graphemes(true).count() <= MAX_NAME_GRAPHEMES {
        display
    } else {
        let truncated: String = display.graphemes(true).take(MAX_NAME_GRAPHEMES - 3).collect();
        truncated + "..."
    }
}


#[cfg(test)]
mod alternative_product_lines_tests {
    use rusqlite::Connection;

    use stockbook::{
        catalog::{ProductKey, create_product},
        db::initialize,
    };

    use super::alternative_product_lines;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn exact_size_matches_take_priority_over_closest_sizes() {
        let conn = get_test_connection();
        create_product(&ProductKey::new("Oil Seal", "25", "32", "4", "SKF"), &conn).unwrap();
        create_product(&ProductKey::new("O-Ring", "26", "32", "4", "NOK"), &conn).unwrap();
        let missing = ProductKey::new("O-Ring", "25", "32", "4", "NOK");

        let lines = alternative_product_lines(&missing, &conn);

        assert_eq!(lines[0], "Products with these exact sizes:");
        assert!(lines[1].contains("Oil Seal"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn falls_back_to_closest_sizes_when_no_exact_size_match() {
        let conn = get_test_connection();
        create_product(&ProductKey::new("O-Ring", "26", "32", "4", "NOK"), &conn).unwrap();
        let missing = ProductKey::new("O-Ring", "25", "32", "4", "NOK");

        let lines = alternative_product_lines(&missing, &conn);

        assert_eq!(lines[0], "Closest sizes in the catalog:");
        assert!(lines[1].contains("26x32x4"));
    }

    #[test]
    fn no_suggestions_for_an_empty_catalog() {
        let conn = get_test_connection();
        let missing = ProductKey::new("O-Ring", "25", "32", "4", "NOK");

        assert!(alternative_product_lines(&missing, &conn).is_empty());
    }
}
