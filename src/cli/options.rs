use super::ui;
use crate::core::session::FilterOptions;
use comfy_table::Cell;

pub fn render_options(options: &FilterOptions) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Filter"),
        ui::header_cell("Flag"),
        ui::header_cell("Values"),
    ]);
    for (name, flag, values) in [
        ("Year", "--year", &options.years),
        ("Trainer Name", "--trainer", &options.trainers),
        ("Month", "--month", &options.months),
    ] {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(flag),
            Cell::new(values.join(", ")),
        ]);
    }
    format!(
        "{}\n\n{}",
        ui::style_text("Available filters", ui::StyleType::Title),
        table
    )
}
