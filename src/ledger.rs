// 🧾 Quote Ledger - Ordered, priced line items with a running total
//
// The ledger is the only mutable aggregate in the system. Items are created
// exclusively through a successful rate resolution plus quantity validation,
// are immutable once appended, and leave only by explicit removal by id.
// Failed additions never touch ledger state.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::codec;
use crate::resolver::{self, Selection};

/// Export column order. "Laboratory" is the customer-facing label for the
/// service column.
pub const EXPORT_HEADERS: [&str; 8] = [
    "Laboratory",
    "Instrument",
    "Method",
    "Customer Type",
    "Unit Type",
    "Quantity",
    "Rate",
    "Price",
];

// ============================================================================
// ERRORS
// ============================================================================

/// User-facing failures from `add_item`. Neither variant mutates the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Incomplete selection or non-positive / non-finite quantity.
    Validation(String),

    /// Complete, valid selection with no entry in the rate table.
    RateNotFound(Selection),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            LedgerError::RateNotFound(sel) => write!(
                f,
                "No rate defined for {}/{}/{}/{}/{}",
                sel.service, sel.instrument, sel.method, sel.customer_type, sel.unit_type
            ),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// LINE ITEM
// ============================================================================

/// One confirmed, priced quote line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Session-unique id from the ledger's monotonic counter.
    pub id: u64,
    pub service: String,
    pub instrument: String,
    pub method: String,
    pub customer_type: String,
    pub unit_type: String,
    pub quantity: f64,
    pub rate: f64,
    pub price: f64,
}

// ============================================================================
// LEDGER
// ============================================================================

/// Insertion-ordered collection of line items.
#[derive(Debug)]
pub struct Ledger {
    items: Vec<LineItem>,
    next_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Validate, resolve, price, and append a new line item.
    ///
    /// Validation first (complete selection, finite quantity > 0), then rate
    /// resolution. Either failure returns before any mutation.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        selection: Selection,
        quantity: f64,
    ) -> Result<LineItem, LedgerError> {
        if !selection.is_complete() {
            return Err(LedgerError::Validation(
                "all five selection fields are required".to_string(),
            ));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(LedgerError::Validation(
                "quantity must be a number greater than zero".to_string(),
            ));
        }

        let rate = resolver::resolve(catalog, &selection)
            .ok_or_else(|| LedgerError::RateNotFound(selection.clone()))?;

        let item = LineItem {
            id: self.next_id,
            service: selection.service,
            instrument: selection.instrument,
            method: selection.method,
            customer_type: selection.customer_type,
            unit_type: selection.unit_type,
            quantity,
            rate,
            price: rate * quantity,
        };
        self.next_id += 1;
        self.items.push(item.clone());

        Ok(item)
    }

    /// Remove by id. `false` for an unknown id — not an error.
    pub fn remove_item(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Grand total, recomputed from the items every call.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize the quote: fixed header, one row per item in insertion
    /// order with display names resolved via the catalog, then a trailing
    /// total row whose only populated cells are the "Total" label and the
    /// two-decimal grand total.
    pub fn to_csv(&self, catalog: &Catalog) -> Result<String> {
        let mut rows: Vec<codec::Row> = Vec::with_capacity(self.items.len() + 1);

        for item in &self.items {
            let mut row = HashMap::new();
            row.insert("Laboratory".to_string(), catalog.service_name(&item.service));
            row.insert(
                "Instrument".to_string(),
                catalog.instrument_name(&item.instrument),
            );
            row.insert("Method".to_string(), catalog.method_name(&item.method));
            row.insert(
                "Customer Type".to_string(),
                catalog.customer_type_name(&item.customer_type),
            );
            row.insert(
                "Unit Type".to_string(),
                catalog.unit_type_name(&item.unit_type),
            );
            row.insert("Quantity".to_string(), format_quantity(item.quantity));
            row.insert("Rate".to_string(), format!("{:.2}", item.rate));
            row.insert("Price".to_string(), format!("{:.2}", item.price));
            rows.push(row);
        }

        let mut total_row = HashMap::new();
        total_row.insert("Quantity".to_string(), "Total".to_string());
        total_row.insert("Price".to_string(), format!("{:.2}", self.total()));
        rows.push(total_row);

        codec::serialize(&rows, &EXPORT_HEADERS)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Suggested export filename, dated with the local calendar day.
pub fn export_filename() -> String {
    format!("quote_{}.csv", Local::now().format("%Y-%m-%d"))
}

/// Integral quantities print without a decimal point ("3", not "3.0").
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        quantity.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, RateEntry};

    fn entry(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn test_catalog() -> Catalog {
        Catalog {
            services: vec![entry("S1", "Spectroscopy Lab")],
            instruments: vec![entry("I1", "FTIR")],
            methods: vec![entry("M1", "Transmission")],
            customer_types: vec![entry("C1", "Academic")],
            unit_types: vec![entry("U1", "Per Sample")],
            rates: vec![RateEntry {
                service: "S1".to_string(),
                instrument: "I1".to_string(),
                method: "M1".to_string(),
                customer_type: "C1".to_string(),
                unit_type: "U1".to_string(),
                rate: 10.0,
            }],
        }
    }

    fn full_selection() -> Selection {
        Selection::new("S1", "I1", "M1", "C1", "U1")
    }

    #[test]
    fn test_add_item_prices_and_appends() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();

        let item = ledger.add_item(&catalog, full_selection(), 3.0).unwrap();

        assert_eq!(item.rate, 10.0);
        assert_eq!(item.price, 30.0);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.items()[0], item);
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();

        let a = ledger.add_item(&catalog, full_selection(), 1.0).unwrap();
        let b = ledger.add_item(&catalog, full_selection(), 1.0).unwrap();
        ledger.remove_item(a.id);
        let c = ledger.add_item(&catalog, full_selection(), 1.0).unwrap();

        // Ids never repeat, even after removals.
        assert!(b.id > a.id);
        assert!(c.id > b.id);
    }

    #[test]
    fn test_validation_failure_leaves_ledger_unchanged() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();
        ledger.add_item(&catalog, full_selection(), 2.0).unwrap();

        let incomplete = Selection::new("S1", "", "M1", "C1", "U1");
        let err = ledger.add_item(&catalog, incomplete, 2.0).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        for bad_quantity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ledger
                .add_item(&catalog, full_selection(), bad_quantity)
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)));
        }

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total(), 20.0);
    }

    #[test]
    fn test_rate_not_found_leaves_ledger_unchanged() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();

        let unpriced = Selection::new("S1", "I1", "M1", "C1", "U9");
        let err = ledger.add_item(&catalog, unpriced, 1.0).unwrap_err();

        assert!(matches!(err, LedgerError::RateNotFound(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();
        let item = ledger.add_item(&catalog, full_selection(), 1.0).unwrap();

        assert!(ledger.remove_item(item.id));
        assert!(ledger.is_empty());

        // Unknown id: false, no change.
        assert!(!ledger.remove_item(999));
        assert_eq!(ledger.total(), 0.0);
    }

    #[test]
    fn test_total_matches_independent_sum() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();
        let mut expected = 0.0;
        let mut ids = Vec::new();

        for quantity in [1.0, 2.5, 4.0, 0.5] {
            let item = ledger.add_item(&catalog, full_selection(), quantity).unwrap();
            expected += item.price;
            ids.push(item.id);
        }

        ledger.remove_item(ids[1]);
        expected -= 10.0 * 2.5;

        assert!((ledger.total() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_to_csv_rows_and_total() {
        let catalog = test_catalog();
        let mut ledger = Ledger::new();
        ledger.add_item(&catalog, full_selection(), 3.0).unwrap();

        let text = ledger.to_csv(&catalog).unwrap();
        let lines: Vec<&str> = text.trim_end().split('\n').collect();

        assert_eq!(
            lines[0],
            "Laboratory,Instrument,Method,Customer Type,Unit Type,Quantity,Rate,Price"
        );
        // Display names, not ids; two-decimal money cells.
        assert_eq!(
            lines[1],
            "Spectroscopy Lab,FTIR,Transmission,Academic,Per Sample,3,10.00,30.00"
        );
        assert_eq!(lines[2], ",,,,,Total,,30.00");
    }

    #[test]
    fn test_to_csv_quotes_display_names_with_commas() {
        let mut catalog = test_catalog();
        catalog.services[0].name = "Spectroscopy, Imaging & Analysis".to_string();

        let mut ledger = Ledger::new();
        ledger.add_item(&catalog, full_selection(), 1.0).unwrap();

        let text = ledger.to_csv(&catalog).unwrap();
        assert!(text.contains("\"Spectroscopy, Imaging & Analysis\""));
    }

    #[test]
    fn test_to_csv_empty_ledger_is_just_header_and_total() {
        let catalog = test_catalog();
        let ledger = Ledger::new();

        let text = ledger.to_csv(&catalog).unwrap();
        let lines: Vec<&str> = text.trim_end().split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], ",,,,,Total,,0.00");
    }

    #[test]
    fn test_export_filename_shape() {
        let name = export_filename();
        assert!(name.starts_with("quote_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "quote_YYYY-MM-DD.csv".len());
    }
}
