// 🎯 Rate Resolver - Exact-match unit-rate lookup
//
// A complete 5-tuple of selection keys resolves to the rate of the FIRST
// matching entry in rate-table load order. Duplicate 5-tuples later in the
// table are unreachable — that tie-break is part of the contract, not an
// accident to clean up.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// The 5-tuple that keys a rate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub service: String,
    pub instrument: String,
    pub method: String,
    pub customer_type: String,
    pub unit_type: String,
}

impl Selection {
    pub fn new(
        service: impl Into<String>,
        instrument: impl Into<String>,
        method: impl Into<String>,
        customer_type: impl Into<String>,
        unit_type: impl Into<String>,
    ) -> Self {
        Selection {
            service: service.into(),
            instrument: instrument.into(),
            method: method.into(),
            customer_type: customer_type.into(),
            unit_type: unit_type.into(),
        }
    }

    /// All five keys set (non-empty). An incomplete selection never resolves.
    pub fn is_complete(&self) -> bool {
        !self.service.is_empty()
            && !self.instrument.is_empty()
            && !self.method.is_empty()
            && !self.customer_type.is_empty()
            && !self.unit_type.is_empty()
    }
}

/// Resolve a unit rate for a complete selection.
///
/// Linear first-match scan, exact case-sensitive string equality on all five
/// keys, no normalization. Pure function of the catalog and the selection:
/// `None` means no rate exists or the selection is incomplete.
pub fn resolve(catalog: &Catalog, selection: &Selection) -> Option<f64> {
    if !selection.is_complete() {
        return None;
    }

    catalog
        .rates
        .iter()
        .find(|r| {
            r.service == selection.service
                && r.instrument == selection.instrument
                && r.method == selection.method
                && r.customer_type == selection.customer_type
                && r.unit_type == selection.unit_type
        })
        .map(|r| r.rate)
}
