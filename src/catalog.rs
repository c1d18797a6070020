// 📚 Catalog Store - Reference data merged from two sources
//
// The catalog is read-only after load. It comes from:
// 1. A required JSON document (services, instruments, methods, customer
//    types, unit types, embedded rates) — missing or malformed is FATAL.
// 2. An optional CSV rate table — any failure here (unreachable, empty,
//    malformed) degrades to the JSON-embedded rates with a console warning.
//    When the CSV yields one or more rows, they replace the embedded rate
//    list wholesale (no field-by-field merge).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;

// ============================================================================
// DATA MODEL
// ============================================================================

/// One reference-list entry. `id` is the stable key used in rate entries and
/// ledger items; `name` is the display label.
///
/// Ids are expected to be unique within each list. If that's violated,
/// display-name lookup silently returns the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

/// One priced combination. The 5-tuple of key fields is the logical key;
/// duplicates can exist in the data, and only the first match in load order
/// is ever resolved (later duplicates are unreachable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub service: String,
    pub instrument: String,
    pub method: String,
    pub customer_type: String,
    pub unit_type: String,
    pub rate: f64,
}

/// The full reference dataset. Read-only after `load_catalog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub services: Vec<CatalogEntry>,
    pub instruments: Vec<CatalogEntry>,
    pub methods: Vec<CatalogEntry>,
    pub customer_types: Vec<CatalogEntry>,
    pub unit_types: Vec<CatalogEntry>,
    pub rates: Vec<RateEntry>,
}

impl Catalog {
    /// Display name for a service id (first match, falls back to the id).
    pub fn service_name(&self, id: &str) -> String {
        display_name(&self.services, id)
    }

    pub fn instrument_name(&self, id: &str) -> String {
        display_name(&self.instruments, id)
    }

    pub fn method_name(&self, id: &str) -> String {
        display_name(&self.methods, id)
    }

    pub fn customer_type_name(&self, id: &str) -> String {
        display_name(&self.customer_types, id)
    }

    pub fn unit_type_name(&self, id: &str) -> String {
        display_name(&self.unit_types, id)
    }
}

fn display_name(entries: &[CatalogEntry], id: &str) -> String {
    entries
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| id.to_string())
}

// ============================================================================
// SOURCES
// ============================================================================

/// Where catalog documents come from. The engine only needs the text; the
/// CLI feeds it files, tests feed it in-memory strings.
pub trait CatalogSource {
    /// Fetch the full document text. Attempted exactly once per load.
    fn fetch(&self) -> Result<String>;

    /// Human-readable location for warnings and error context.
    fn location(&self) -> String;
}

/// File-backed source.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for FileSource {
    fn fetch(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// LOAD & MERGE
// ============================================================================

/// Load the catalog: CSV rate override first (non-fatal), then the JSON
/// document (fatal on failure). The CSV source is fully resolved — success
/// or failure — before the JSON source is touched, and each is attempted
/// exactly once. On any error, no partial catalog is exposed.
pub fn load_catalog(
    json_source: &dyn CatalogSource,
    csv_source: Option<&dyn CatalogSource>,
) -> Result<Catalog> {
    let override_rates = match csv_source {
        Some(source) => match source.fetch() {
            Ok(text) => {
                let rows = parse_rate_rows(&text);
                if rows.is_empty() {
                    eprintln!(
                        "⚠️  Rate table {} has no usable rows, using embedded rates",
                        source.location()
                    );
                }
                rows
            }
            Err(err) => {
                eprintln!(
                    "⚠️  Rate table {} unavailable ({}), using embedded rates",
                    source.location(),
                    err
                );
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let json_text = json_source
        .fetch()
        .with_context(|| format!("Failed to load catalog from {}", json_source.location()))?;

    if json_text.trim().is_empty() {
        return Err(anyhow!("Catalog document {} is empty", json_source.location()));
    }

    let mut catalog: Catalog = serde_json::from_str(&json_text)
        .with_context(|| format!("Malformed catalog JSON in {}", json_source.location()))?;

    // Wholesale replacement: one or more CSV rows wins, zero rows keeps the
    // JSON-embedded rate list untouched.
    if !override_rates.is_empty() {
        catalog.rates = override_rates;
    }

    Ok(catalog)
}

/// Convert parsed CSV rows into rate entries. Expected columns:
/// service,instrument,method,customerType,unitType,rate (any column order).
/// An unparsable rate cell becomes 0.0 rather than an error.
fn parse_rate_rows(text: &str) -> Vec<RateEntry> {
    codec::parse(text)
        .into_iter()
        .map(|row| {
            let cell = |key: &str| row.get(key).cloned().unwrap_or_default();
            RateEntry {
                service: cell("service"),
                instrument: cell("instrument"),
                method: cell("method"),
                customer_type: cell("customerType"),
                unit_type: cell("unitType"),
                rate: row
                    .get("rate")
                    .and_then(|r| r.parse::<f64>().ok())
                    .unwrap_or(0.0),
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
