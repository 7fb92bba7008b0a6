//! Prefill context for the next add form.
//!
//! The engine keeps no ambient "last used product" state; callers receive a
//! [LastEntryDefaults] from each successful add and pass it back explicitly
//! when they want the next form prefilled.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{catalog::ProductKey, transaction::TransactionRecord};

/// The values a UI would prefill the next add form with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastEntryDefaults {
    /// The product the last entry was recorded against.
    pub product: ProductKey,
    /// The customer or fabricator name of the last entry.
    pub name: String,
    /// The date of the last entry.
    pub date: Date,
}

impl LastEntryDefaults {
    /// Capture defaults from a freshly inserted row.
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            product: record.product.clone(),
            name: record.name.clone(),
            date: record.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        catalog::ProductKey,
        transaction::{TransactionKind, TransactionRecord},
    };

    use super::LastEntryDefaults;

    #[test]
    fn captures_product_name_and_date() {
        let record = TransactionRecord {
            row_id: 1,
            date: date!(2025 - 03 - 01),
            product: ProductKey::new("O-Ring", "25", "32", "4", "NOK"),
            name: "FAB-X".to_owned(),
            quantity: 5,
            price: 2.0,
            kind: TransactionKind::Restock,
        };

        let defaults = LastEntryDefaults::from_record(&record);

        assert_eq!(defaults.product, record.product);
        assert_eq!(defaults.name, "FAB-X");
        assert_eq!(defaults.date, date!(2025 - 03 - 01));
    }
}
