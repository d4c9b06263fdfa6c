use crate::core::dashboard::Kpi;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Banner,
    Title,
    Section,
    KpiValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Banner => style(text).white().on_blue().bold(),
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Section => style(text).cyan().bold(),
        StyleType::KpiValue => style(text).blue().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Right-aligned cell for an optional value, dimmed `N/A` when absent.
pub fn optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    match value {
        Some(v) => number_cell(format_fn(v)),
        None => number_cell("N/A".to_string()).fg(Color::DarkGrey),
    }
}

/// Number cell colored by sign.
pub fn signed_cell(value: f64, text: String) -> Cell {
    let color = if value < 0.0 { Color::Red } else { Color::Green };
    number_cell(text).fg(color)
}

/// Horizontal bar scaled so that `max` fills `width` characters.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max).min(1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

/// Lays KPI cards out as a grid, `per_row` cards wide: the value on top in
/// bold, the label underneath in upper case.
pub fn kpi_cards(kpis: &[Kpi], per_row: usize) -> Table {
    let mut table = new_styled_table();
    for chunk in kpis.chunks(per_row.max(1)) {
        table.add_row(chunk.iter().map(|kpi| {
            Cell::new(format!(
                "{}\n{}",
                style_text(&kpi.display, StyleType::KpiValue),
                style_text(&kpi.label.to_uppercase(), StyleType::Subtle)
            ))
            .set_alignment(CellAlignment::Center)
        }));
    }
    table
}

/// Spinner shown while input files are read.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Returns a separator line matching the terminal width.
pub fn separator() -> String {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    "─".repeat(term_width)
}
