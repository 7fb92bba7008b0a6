use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use stockbook::{
    catalog::{ProductKey, create_product},
    db::initialize,
    editor::{EntryForm, add_entry},
    transaction::TransactionKind,
};

/// A utility for creating a test database for stockbook.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize(&conn)?;

    println!("Creating test products...");

    let o_ring = ProductKey::new("O-Ring", "25", "32", "4", "NOK");
    let oil_seal = ProductKey::new("Oil Seal", "30", "42", "7", "SKF");
    let fractional = ProductKey::new("O-Ring", "3/4", "1", "1/8", "NOK");

    for product in [&o_ring, &oil_seal, &fractional] {
        create_product(product, &conn)?;
    }

    println!("Creating test ledger entries...");

    // A series that walks through known stock, an over-sale into unknown
    // stock, and a physical count that re-anchors it.
    add_entry(
        &o_ring,
        EntryForm::Single {
            kind: TransactionKind::Restock,
            date: date!(2025 - 01 - 01),
            name: "Supplier".to_owned(),
            quantity: 10,
            price: 1.2,
        },
        &conn,
    )?;
    add_entry(
        &o_ring,
        EntryForm::Single {
            kind: TransactionKind::Sale,
            date: date!(2025 - 01 - 02),
            name: "Walk-in".to_owned(),
            quantity: 15,
            price: 3.0,
        },
        &conn,
    )?;
    add_entry(
        &o_ring,
        EntryForm::Single {
            kind: TransactionKind::ActualCount,
            date: date!(2025 - 01 - 03),
            name: "Stock-take".to_owned(),
            quantity: 4,
            price: 0.0,
        },
        &conn,
    )?;

    // A fabrication: made 50, sold 30 on the spot.
    add_entry(
        &oil_seal,
        EntryForm::Fabrication {
            date: date!(2025 - 01 - 05),
            name: "FAB-X".to_owned(),
            qty_restocked: 50,
            qty_sold: 30,
            cost: 1.5,
            price: 4.0,
        },
        &conn,
    )?;

    println!("Done!");

    Ok(())
}
