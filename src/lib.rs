// Lab Pricing - Quote calculation engine
// Exposes the core modules for use in the CLI and tests

pub mod catalog;
pub mod codec;
pub mod filter;
pub mod ledger;
pub mod resolver;

// Re-export commonly used types
pub use catalog::{load_catalog, Catalog, CatalogEntry, CatalogSource, FileSource, RateEntry};
pub use filter::{instruments_for, methods_for};
pub use ledger::{export_filename, Ledger, LedgerError, LineItem, EXPORT_HEADERS};
pub use resolver::{resolve, Selection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
