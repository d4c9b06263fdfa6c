//! Terminal front end: rendering of dashboard views and the setup command

pub mod dashboard;
pub mod options;
pub mod setup;
pub mod ui;

/// How command output is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Styled tables and bar charts
    #[default]
    Table,
    /// The computed view as pretty-printed JSON
    Json,
}
