use super::ui;
use crate::core::aggregate::RatingBucket;
use crate::core::dashboard::{
    DashboardView, FinancialPanel, Filters, GroupedSeries, MonthlyTrend, SalesPanel,
    TrainingPanel,
};
use crate::core::session::Category;
use comfy_table::Cell;

const BAR_WIDTH: usize = 20;

pub fn render_header(filters: &Filters) -> String {
    format!(
        "{}\n\nYear: {}  |  Trainer: {}  |  Month: {}\n",
        ui::style_text("  Management KPIs Dashboard  ", ui::StyleType::Banner),
        filters.year,
        filters.trainer,
        filters.month,
    )
}

fn section(title: &str) -> String {
    format!(
        "\n{}\n",
        ui::style_text(&title.to_uppercase(), ui::StyleType::Section)
    )
}

/// Grouped-bar chart as a table: one row per group, each series shown as
/// `value bar`.
fn grouped_table(
    group_label: &str,
    data: &GroupedSeries,
    max: f64,
    format_value: impl Fn(f64) -> String,
) -> String {
    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell(group_label)];
    header.extend(data.series.iter().map(|s| ui::header_cell(s)));
    table.set_header(header);

    for row in &data.rows {
        let mut cells = vec![Cell::new(&row.key)];
        cells.extend(row.values.iter().map(|v| {
            Cell::new(format!(
                "{:>8} {}",
                format_value(*v),
                ui::bar(*v, max, BAR_WIDTH / 2)
            ))
        }));
        table.add_row(cells);
    }
    table.to_string()
}

pub fn render_sales(panel: &SalesPanel) -> String {
    let mut output = format!("\n{}\n", ui::style_text("Sales KPIs", ui::StyleType::Title));
    output.push_str(&ui::kpi_cards(&panel.kpis, 3).to_string());

    output.push_str(&section("Summary Chart"));
    let max = panel.funnel.first().map_or(0.0, |s| s.value);
    let mut funnel = ui::new_styled_table();
    funnel.set_header(vec![
        ui::header_cell("Stage"),
        ui::header_cell("Value"),
        ui::header_cell(""),
        ui::header_cell("% of previous"),
    ]);
    for stage in &panel.funnel {
        funnel.add_row(vec![
            Cell::new(stage.label),
            ui::number_cell(format!("{}", stage.value as i64)),
            Cell::new(ui::bar(stage.value, max, BAR_WIDTH)),
            ui::number_cell(
                stage
                    .pct_of_previous
                    .map_or("-".to_string(), |p| format!("{p:.1}%")),
            ),
        ]);
    }
    output.push_str(&funnel.to_string());

    output.push_str(&section("Monthly Sales Conversion Trends"));
    match &panel.conversion_trends {
        Some(trends) if !trends.rows.is_empty() => {
            output.push_str(&grouped_table("Month", trends, 100.0, |v| format!("{v:.1}%")));
        }
        Some(_) => output.push_str(&ui::style_text("No data", ui::StyleType::Subtle)),
        None => output.push_str(&ui::style_text(
            "Conversion columns not found",
            ui::StyleType::Subtle,
        )),
    }
    output.push('\n');
    output
}

pub fn render_training(panel: &TrainingPanel) -> String {
    let mut output = format!(
        "\n{}\nTrainer: {}\n",
        ui::style_text("Training Evaluation", ui::StyleType::Title),
        ui::style_text(&panel.trainer, ui::StyleType::Section)
    );

    output.push_str(&section("Low Expectation over Sessions"));
    match &panel.expectation {
        Some(split) => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Rating"),
                ui::header_cell("Sessions"),
                ui::header_cell("Share"),
                ui::header_cell(""),
            ]);
            let low_max = panel.low_expectation_max;
            for (label, bucket, count) in [
                (format!("Low (≤{low_max})"), RatingBucket::Low, split.low),
                (format!("Good (>{low_max})"), RatingBucket::Good, split.good),
            ] {
                let share = split.share(bucket);
                table.add_row(vec![
                    Cell::new(label),
                    ui::number_cell(count.to_string()),
                    ui::number_cell(share.map_or("N/A".to_string(), |s| format!("{s:.1}%"))),
                    Cell::new(ui::bar(share.unwrap_or(0.0), 100.0, BAR_WIDTH)),
                ]);
            }
            output.push_str(&table.to_string());
        }
        None => output.push_str(&ui::style_text(
            "Expectation column not found",
            ui::StyleType::Subtle,
        )),
    }

    output.push_str(&section("Trainer Performance Comparison"));
    match &panel.trainer_performance {
        Some(perf) => output.push_str(&grouped_table("Trainer", perf, 5.0, |v| format!("{v:.2}"))),
        None => output.push_str(&ui::style_text(
            "Rating columns not found",
            ui::StyleType::Subtle,
        )),
    }

    output.push_str(&section("Month-by-Month Trend Analysis"));
    match &panel.monthly_trend {
        MonthlyTrend::Available { series, rows } => {
            let mut table = ui::new_styled_table();
            let mut header = vec![ui::header_cell("Month")];
            header.extend(series.iter().map(|s| ui::header_cell(s)));
            table.set_header(header);
            for row in rows {
                let mut cells = vec![Cell::new(row.name)];
                cells.extend(
                    row.values
                        .iter()
                        .map(|v| ui::optional_cell(*v, |v| format!("{v:.2}"))),
                );
                table.add_row(cells);
            }
            output.push_str(&table.to_string());
        }
        MonthlyTrend::Unavailable => {
            output.push_str(&ui::style_text("Trend unavailable", ui::StyleType::Error))
        }
        MonthlyTrend::Omitted => output.push_str(&ui::style_text(
            "Training date column not found",
            ui::StyleType::Subtle,
        )),
    }
    output.push('\n');
    output
}

pub fn render_financial(panel: &FinancialPanel) -> String {
    let mut output = format!(
        "\n{}\n",
        ui::style_text("Financial KPIs", ui::StyleType::Title)
    );
    output.push_str(&ui::kpi_cards(&panel.kpis, 3).to_string());

    output.push_str(&section("Net Profit/Loss Over Month"));
    match &panel.monthly {
        Some(monthly) => {
            let max = monthly.max_value();
            output.push_str(&grouped_table("Month", monthly, max, |v| format!("{v:.0}")));
        }
        None => output.push_str(&ui::style_text("Month column not found", ui::StyleType::Subtle)),
    }

    output.push_str(&section("Monthly Trends"));
    if let Some(summary) = &panel.monthly_summary {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell("Cost"),
            ui::header_cell("Profit"),
            ui::header_cell("Sales"),
            ui::header_cell("Overdue"),
        ]);
        for row in summary {
            table.add_row(vec![
                Cell::new(&row.month),
                ui::number_cell(row.cost.to_string()),
                ui::signed_cell(row.profit as f64, row.profit.to_string()),
                ui::number_cell(row.sales.to_string()),
                ui::number_cell(row.overdue.to_string()),
            ]);
        }
        output.push_str(&table.to_string());
    }
    output.push('\n');
    output
}

pub fn render_footer(generated_at: &str) -> String {
    format!(
        "\n{}\n{}",
        ui::separator(),
        ui::style_text(generated_at, ui::StyleType::Subtle)
    )
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut output = render_header(&view.filters);
    output.push_str(&render_sales(&view.sales));
    output.push_str(&ui::separator());
    output.push_str(&render_training(&view.training));
    output.push_str(&ui::separator());
    output.push_str(&render_financial(&view.financial));
    output.push_str(&render_footer(&view.generated_at));
    output
}

/// Shown instead of the dashboard until every input file is available.
pub fn render_upload_prompt(missing: &[Category]) -> String {
    let mut output = format!(
        "{}\n\n📁 Upload all 3 Excel files to start\n",
        ui::style_text("  Management KPIs Dashboard  ", ui::StyleType::Banner)
    );
    for category in missing {
        let flag = match category {
            Category::Sales => "--sales",
            Category::Financial => "--financial",
            Category::Evaluation => "--evaluation",
        };
        output.push_str(&format!(
            "  {} {}\n",
            ui::style_text(&format!("missing {category}:"), ui::StyleType::Error),
            ui::style_text(
                &format!("pass {flag} <PATH> or set it in the config file"),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}
