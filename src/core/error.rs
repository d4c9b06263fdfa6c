use crate::core::session::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions callers branch on. Everything else travels as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("missing input files: {}", .0.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "))]
    MissingInputs(Vec<Category>),

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("sheet {sheet} not found in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },
}
