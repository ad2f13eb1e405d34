//! ScholarMap Common Library
//!
//! Shared code for the ScholarMap crates including:
//! - The normalized Country → University → Author → Paper record model
//! - Year filters applied by every read path
//! - The versioned dataset store (atomic snapshot publication)
//! - Error types and HTTP mapping
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod filter;
pub mod metrics;
pub mod model;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use filter::YearFilter;
pub use model::{Author, Country, Paper, RecordModel, University};
pub use store::{DatasetStore, IngestionPermit, Snapshot};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Earliest publication year accepted at ingestion
pub const MIN_PUBLICATION_YEAR: i32 = 1900;
