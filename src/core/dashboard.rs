//! Builds everything the dashboard shows from a loaded session and a filter
//! selection. Rendering lives in `cli`; this module only computes.

use crate::core::aggregate::{
    self, ALL, Aggregator, ExpectationSplit, FunnelStage, GroupRow, MonthRow,
};
use crate::core::config::AppConfig;
use crate::core::dataset::Dataset;
use crate::core::session::{FilterOptions, LoadedData};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filters {
    pub year: String,
    pub month: String,
    pub trainer: String,
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            year: ALL.to_string(),
            month: ALL.to_string(),
            trainer: ALL.to_string(),
        }
    }
}

/// A single headline number with its card label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
}

impl Kpi {
    fn integer(label: &'static str, value: f64) -> Self {
        Kpi {
            label,
            value,
            display: format!("{}", value as i64),
        }
    }

    fn compact(label: &'static str, value: f64) -> Self {
        Kpi {
            label,
            value,
            display: compact_thousands(value),
        }
    }
}

/// Whole thousands with a `K` suffix from 1000 up, a plain integer below.
pub fn compact_thousands(value: f64) -> String {
    if value >= 1000.0 {
        format!("{}K", (value / 1000.0) as i64)
    } else {
        format!("{}", value as i64)
    }
}

/// Grouped bar data: one row per group, one value per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSeries {
    pub series: Vec<&'static str>,
    pub rows: Vec<GroupRow>,
}

impl GroupedSeries {
    /// Largest value across all rows, for scaling bars.
    pub fn max_value(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| r.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MonthlyTrend {
    Available {
        series: Vec<&'static str>,
        rows: Vec<MonthRow>,
    },
    /// Columns exist but no date could be read.
    Unavailable,
    /// Date or rating columns are missing.
    Omitted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPanel {
    pub kpis: Vec<Kpi>,
    pub funnel: Vec<FunnelStage>,
    pub conversion_trends: Option<GroupedSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingPanel {
    pub trainer: String,
    /// Ratings at or below this are counted as Low.
    pub low_expectation_max: f64,
    pub expectation: Option<ExpectationSplit>,
    pub trainer_performance: Option<GroupedSeries>,
    pub monthly_trend: MonthlyTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummaryRow {
    pub month: String,
    pub cost: i64,
    pub profit: i64,
    pub sales: i64,
    pub overdue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialPanel {
    pub kpis: Vec<Kpi>,
    pub monthly: Option<GroupedSeries>,
    pub monthly_summary: Option<Vec<MonthlySummaryRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filters: Filters,
    pub options: FilterOptions,
    pub sales: SalesPanel,
    pub training: TrainingPanel,
    pub financial: FinancialPanel,
    pub generated_at: String,
}

/// The three datasets after the month/year/trainer selection is applied.
pub struct FilteredData {
    pub sales: Dataset,
    pub financial: Dataset,
    pub evaluation: Dataset,
}

pub fn apply_filters(data: &LoadedData<'_>, filters: &Filters, config: &AppConfig) -> FilteredData {
    let schema = &config.schema;

    let sales = aggregate::filter_by_value(data.sales, &schema.sales.month, &filters.month);
    let sales = aggregate::filter_by_value(&sales, &schema.sales.year, &filters.year);

    let financial =
        aggregate::filter_by_value(data.financial, &schema.financial.month, &filters.month);
    let financial = aggregate::filter_by_value(&financial, &schema.financial.year, &filters.year);

    let evaluation =
        aggregate::filter_by_value(data.evaluation, &schema.evaluation.trainer, &filters.trainer);

    debug!(
        "Filtered rows: sales={} financial={} evaluation={}",
        sales.len(),
        financial.len(),
        evaluation.len()
    );

    FilteredData {
        sales,
        financial,
        evaluation,
    }
}

pub fn sales_panel(sales: &Dataset, config: &AppConfig) -> SalesPanel {
    let cols = &config.schema.sales;
    let sum = |field: &str| aggregate::safe_sum(sales, field);

    let dials = sum(&cols.dials);
    let calls = sum(&cols.calls);
    let dm = sum(&cols.dm_conducted);
    let dw = sum(&cols.dw_conducted);
    let prop_sent = sum(&cols.proposals_sent);
    let prop_sold = sum(&cols.proposals_sold);

    let kpis = vec![
        Kpi::integer("Total Dials", dials),
        Kpi::integer("Total Calls", calls),
        Kpi::integer("Proposals Sent", prop_sent),
        Kpi::integer("DM Conducted", dm),
        Kpi::integer("DW Conducted", dw),
        Kpi::integer("Proposals Sold", prop_sold),
        Kpi::compact("Sales Value", sum(&cols.sales_value)),
    ];

    let present: Vec<(&str, &'static str)> = cols
        .conversions()
        .into_iter()
        .filter(|(column, _)| sales.has_column(column))
        .collect();
    let conversion_trends = (sales.has_column(&cols.month) && !present.is_empty()).then(|| {
        let specs: Vec<_> = present
            .iter()
            .map(|(column, _)| (*column, Aggregator::MeanPercent))
            .collect();
        GroupedSeries {
            series: present.iter().map(|(_, label)| *label).collect(),
            rows: aggregate::group_and_aggregate(sales, &cols.month, &specs),
        }
    });

    SalesPanel {
        kpis,
        funnel: aggregate::funnel([dials, calls, dm, dw, prop_sent, prop_sold]),
        conversion_trends,
    }
}

/// `filtered` drives the expectation split; the trainer comparison and the
/// month trend always cover every trainer.
pub fn training_panel(
    filtered: &Dataset,
    all: &Dataset,
    trainer: &str,
    config: &AppConfig,
) -> TrainingPanel {
    let cols = &config.schema.evaluation;

    let expectation = filtered.has_column(&cols.expectation).then(|| {
        aggregate::expectation_split(
            filtered,
            &cols.expectation,
            config.thresholds.low_expectation_max,
        )
    });

    let ratings: Vec<(&str, &'static str)> = cols
        .ratings()
        .into_iter()
        .filter(|(column, _)| all.has_column(column))
        .collect();
    let series: Vec<&'static str> = ratings.iter().map(|(_, label)| *label).collect();

    let trainer_performance = (all.has_column(&cols.trainer) && !ratings.is_empty()).then(|| {
        let specs: Vec<_> = ratings
            .iter()
            .map(|(column, _)| (*column, Aggregator::Mean))
            .collect();
        GroupedSeries {
            series: series.clone(),
            rows: aggregate::group_and_aggregate(all, &cols.trainer, &specs),
        }
    });

    let monthly_trend = if !all.has_column(&cols.training_date) || ratings.is_empty() {
        MonthlyTrend::Omitted
    } else {
        let fields: Vec<&str> = ratings.iter().map(|(column, _)| *column).collect();
        let rows = aggregate::month_trend(all, &cols.training_date, &fields);
        if rows.is_empty() {
            debug!("No training dates could be parsed");
            MonthlyTrend::Unavailable
        } else {
            MonthlyTrend::Available { series, rows }
        }
    };

    TrainingPanel {
        trainer: trainer.to_string(),
        low_expectation_max: config.thresholds.low_expectation_max,
        expectation,
        trainer_performance,
        monthly_trend,
    }
}

pub fn financial_panel(financial: &Dataset, config: &AppConfig) -> FinancialPanel {
    let cols = &config.schema.financial;
    let sum = |field: &str| aggregate::safe_sum(financial, field);

    let cashflow = aggregate::safe_avg(financial, &cols.cashflow_coverage);
    let kpis = vec![
        Kpi {
            label: "Cashflow",
            value: cashflow,
            display: format!("{cashflow:.1}"),
        },
        Kpi::compact("Total Sales", sum(&cols.total_sales)),
        Kpi::compact("Total COGS", sum(&cols.cost_of_goods_sold)),
        Kpi::compact("Net Profit", sum(&cols.net_profit_loss)),
        Kpi::integer("Overdue Count", sum(&cols.overdue_count)),
        Kpi::compact("Overdue Val", sum(&cols.overdue_value)),
    ];

    let monthly = financial.has_column(&cols.month).then(|| {
        let specs: Vec<_> = cols
            .monthly()
            .iter()
            .map(|(column, _)| (*column, Aggregator::Sum))
            .collect();
        GroupedSeries {
            series: cols.monthly().iter().map(|(_, label)| *label).collect(),
            rows: aggregate::group_and_aggregate(financial, &cols.month, &specs),
        }
    });

    let monthly_summary = monthly.as_ref().map(|m| {
        m.rows
            .iter()
            .map(|row| {
                let at = |i: usize| row.values.get(i).copied().unwrap_or(0.0).round() as i64;
                MonthlySummaryRow {
                    month: row.key.clone(),
                    cost: at(0),
                    profit: at(1),
                    sales: at(2),
                    overdue: at(3),
                }
            })
            .collect()
    });

    FinancialPanel {
        kpis,
        monthly,
        monthly_summary,
    }
}

pub fn build_dashboard(
    data: &LoadedData<'_>,
    filters: &Filters,
    config: &AppConfig,
    generated_at: NaiveDateTime,
) -> DashboardView {
    let filtered = apply_filters(data, filters, config);

    DashboardView {
        filters: filters.clone(),
        options: FilterOptions::from_data(data, &config.schema),
        sales: sales_panel(&filtered.sales, config),
        training: training_panel(&filtered.evaluation, data.evaluation, &filters.trainer, config),
        financial: financial_panel(&filtered.financial, config),
        generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
