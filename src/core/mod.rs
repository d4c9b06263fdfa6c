//! Data model, ingestion and aggregation behind the dashboard

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod log;
pub mod schema;
pub mod session;
pub mod value;

// Re-export main types for cleaner imports
pub use dashboard::{DashboardView, Filters, build_dashboard};
pub use dataset::Dataset;
pub use error::DashboardError;
pub use session::{Category, Session};
pub use value::Value;
