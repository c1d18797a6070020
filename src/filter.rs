// 🔀 Selection Filter - Cascading choice derivation
//
// Given partial selections, derive which downstream choices can still lead
// to a priced combination. Pure functions over the catalog: the UI adapter
// calls these on every selection change and is responsible for resetting
// downstream selections itself.
//
// Ordering contract: results follow the catalog's own list order, never the
// rate-table order.

use std::collections::HashSet;

use crate::catalog::{Catalog, CatalogEntry};

/// Instruments that have at least one rate entry under `service_id`.
/// Empty/unset service → empty result.
pub fn instruments_for(catalog: &Catalog, service_id: &str) -> Vec<CatalogEntry> {
    if service_id.is_empty() {
        return Vec::new();
    }

    let valid: HashSet<&str> = catalog
        .rates
        .iter()
        .filter(|r| r.service == service_id)
        .map(|r| r.instrument.as_str())
        .collect();

    catalog
        .instruments
        .iter()
        .filter(|e| valid.contains(e.id.as_str()))
        .cloned()
        .collect()
}

/// Methods that have at least one rate entry under `service_id` +
/// `instrument_id`. Either key empty → empty result.
pub fn methods_for(catalog: &Catalog, service_id: &str, instrument_id: &str) -> Vec<CatalogEntry> {
    if service_id.is_empty() || instrument_id.is_empty() {
        return Vec::new();
    }

    let valid: HashSet<&str> = catalog
        .rates
        .iter()
        .filter(|r| r.service == service_id && r.instrument == instrument_id)
        .map(|r| r.method.as_str())
        .collect();

    catalog
        .methods
        .iter()
        .filter(|e| valid.contains(e.id.as_str()))
        .cloned()
        .collect()
}
