//! Aggregations over loaded datasets.
//!
//! None of these functions fail. Missing columns and values that do not
//! coerce to a number or date are left out, and an aggregate with nothing to
//! work on is 0.

use super::dataset::Dataset;
use super::value::Value;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Filter value meaning "do not filter".
pub const ALL: &str = "All";

pub const FUNNEL_LABELS: [&str; 6] = ["Dials", "Calls", "DM", "DW", "Prop Sent", "Prop Sold"];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn numbers<'a>(records: &'a Dataset, field: &str) -> impl Iterator<Item = f64> + use<'a> {
    records
        .column(field)
        .into_iter()
        .flatten()
        .filter_map(Value::as_number)
}

/// Sum of the numeric values of `field`. 0 when the column is absent.
pub fn safe_sum(records: &Dataset, field: &str) -> f64 {
    numbers(records, field).sum()
}

/// Mean of the numeric values of `field`. 0 when there is nothing to average.
pub fn safe_avg(records: &Dataset, field: &str) -> f64 {
    let values: Vec<f64> = numbers(records, field).collect();
    Aggregator::Mean.apply(&values)
}

/// Rows whose `field`, read as text, equals `value`.
///
/// `"All"` returns every row, as does a `field` the table does not have.
pub fn filter_by_value(records: &Dataset, field: &str, value: &str) -> Dataset {
    if value == ALL {
        return records.clone();
    }
    let Some(idx) = records.column_index(field) else {
        return records.clone();
    };
    records.retain_rows(|row| row[idx].as_label().is_some_and(|label| label == value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Aggregator {
    Sum,
    Mean,
    /// Mean scaled by 100, for ratios stored as fractions.
    MeanPercent,
    Count,
}

impl Aggregator {
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Aggregator::Sum => values.iter().sum(),
            Aggregator::Count => values.len() as f64,
            Aggregator::Mean | Aggregator::MeanPercent if values.is_empty() => 0.0,
            Aggregator::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregator::MeanPercent => values.iter().sum::<f64>() / values.len() as f64 * 100.0,
        }
    }
}

/// One group of [`group_and_aggregate`]; `values` follow the order of the
/// requested fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    pub values: Vec<f64>,
}

/// Group label ordered as a number when both sides parse as one, so a
/// numeric Month column sorts 1, 2, ..., 12. Numbers sort before text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey(String);

impl GroupKey {
    fn numeric(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Collects the numeric values of each field per group key.
fn collect_by<K: Ord>(
    records: &Dataset,
    key_of: impl Fn(&[Value]) -> Option<K>,
    fields: &[&str],
) -> BTreeMap<K, Vec<Vec<f64>>> {
    let columns: Vec<Option<usize>> = fields
        .iter()
        .map(|name| records.column_index(name))
        .collect();

    let mut groups: BTreeMap<K, Vec<Vec<f64>>> = BTreeMap::new();
    for row in records.rows() {
        let Some(key) = key_of(row) else {
            continue;
        };
        let collected = groups
            .entry(key)
            .or_insert_with(|| vec![Vec::new(); fields.len()]);
        for (slot, column) in collected.iter_mut().zip(&columns) {
            if let Some(n) = column.and_then(|idx| row[idx].as_number()) {
                slot.push(n);
            }
        }
    }
    groups
}

/// Partitions rows by the text of `group_field` and aggregates each field
/// per group. Groups come out sorted by key, numerically when the keys are
/// numbers. Rows without a group value are dropped and an absent group
/// column yields no groups.
pub fn group_and_aggregate(
    records: &Dataset,
    group_field: &str,
    fields: &[(&str, Aggregator)],
) -> Vec<GroupRow> {
    let Some(group_idx) = records.column_index(group_field) else {
        return Vec::new();
    };
    let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    collect_by(records, |row| row[group_idx].as_label().map(GroupKey), &names)
        .into_iter()
        .map(|(GroupKey(key), collected)| GroupRow {
            key,
            values: collected
                .iter()
                .zip(fields)
                .map(|(values, (_, agg))| agg.apply(values))
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStage {
    pub label: &'static str,
    pub value: f64,
    /// Share of the previous stage, in percent.
    pub pct_of_previous: Option<f64>,
}

/// The six funnel quantities in stage order, values as given.
pub fn funnel(quantities: [f64; 6]) -> Vec<FunnelStage> {
    let mut previous: Option<f64> = None;
    FUNNEL_LABELS
        .into_iter()
        .zip(quantities)
        .map(|(label, value)| {
            let pct_of_previous = previous.filter(|p| *p != 0.0).map(|p| value / p * 100.0);
            previous = Some(value);
            FunnelStage {
                label,
                value,
                pct_of_previous,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatingBucket {
    Low,
    Good,
}

pub fn classify_rating(rating: f64, low_max: f64) -> RatingBucket {
    if rating <= low_max {
        RatingBucket::Low
    } else {
        RatingBucket::Good
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExpectationSplit {
    pub low: usize,
    pub good: usize,
}

impl ExpectationSplit {
    pub fn total(&self) -> usize {
        self.low + self.good
    }

    pub fn share(&self, bucket: RatingBucket) -> Option<f64> {
        let count = match bucket {
            RatingBucket::Low => self.low,
            RatingBucket::Good => self.good,
        };
        (self.total() > 0).then(|| count as f64 / self.total() as f64 * 100.0)
    }
}

/// Counts Low (rating <= `low_max`) and Good ratings; non-numeric ratings
/// are skipped.
pub fn expectation_split(records: &Dataset, field: &str, low_max: f64) -> ExpectationSplit {
    numbers(records, field).fold(ExpectationSplit::default(), |mut split, rating| {
        match classify_rating(rating, low_max) {
            RatingBucket::Low => split.low += 1,
            RatingBucket::Good => split.good += 1,
        }
        split
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRow {
    /// Calendar month, 1-12.
    pub month: u32,
    pub name: &'static str,
    /// Mean per field, `None` when the month has no numeric value for it.
    pub values: Vec<Option<f64>>,
}

/// Groups rows by the calendar month of `date_field` (year ignored) and
/// averages each field. Rows are ordered January to December; rows whose
/// date does not parse are dropped.
pub fn month_trend(records: &Dataset, date_field: &str, fields: &[&str]) -> Vec<MonthRow> {
    let Some(date_idx) = records.column_index(date_field) else {
        return Vec::new();
    };
    collect_by(
        records,
        |row| row[date_idx].as_date().map(|d: NaiveDate| d.month()),
        fields,
    )
    .into_iter()
    .map(|(month, collected)| MonthRow {
        month,
        name: MONTH_NAMES[(month - 1) as usize],
        values: collected
            .iter()
            .map(|values| (!values.is_empty()).then(|| Aggregator::Mean.apply(values)))
            .collect(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::from_text(s)
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn sales() -> Dataset {
        Dataset::new(
            &["Month", "Dials", "Dials to calls %"],
            vec![
                vec![text("February"), num(100.0), num(0.5)],
                vec![text("January"), text("oops"), num(0.25)],
                vec![text("February"), num(50.0), text("")],
                vec![Value::Empty, num(7.0), num(1.0)],
                vec![text("January"), text(" 20 "), num(0.75)],
            ],
        )
    }

    #[test]
    fn test_safe_sum_absent_field_is_zero() {
        assert_eq!(safe_sum(&sales(), "Calls"), 0.0);
        assert_eq!(safe_sum(&Dataset::default(), "Dials"), 0.0);
    }

    #[test]
    fn test_safe_sum_and_avg_skip_non_numeric() {
        let ds = sales();
        assert_eq!(safe_sum(&ds, "Dials"), 177.0);
        assert_eq!(safe_avg(&ds, "Dials"), 177.0 / 4.0);
        assert_eq!(safe_avg(&ds, "Missing"), 0.0);
    }

    #[test]
    fn test_safe_avg_all_non_numeric_is_zero() {
        let ds = Dataset::new(&["X"], vec![vec![text("a")], vec![Value::Empty]]);
        assert_eq!(safe_avg(&ds, "X"), 0.0);
    }

    #[test]
    fn test_filter_all_is_identity() {
        let ds = sales();
        assert_eq!(filter_by_value(&ds, "Month", ALL), ds);
    }

    #[test]
    fn test_filter_by_value_matches_text() {
        let ds = sales();
        let jan = filter_by_value(&ds, "Month", "January");
        assert_eq!(jan.len(), 2);
        assert_eq!(safe_sum(&jan, "Dials"), 20.0);
        assert!(filter_by_value(&ds, "Month", "March").is_empty());
    }

    #[test]
    fn test_filter_numeric_month_by_label() {
        let ds = Dataset::new(
            &["Month"],
            vec![vec![num(3.0)], vec![text("3")], vec![num(4.0)]],
        );
        assert_eq!(filter_by_value(&ds, "Month", "3").len(), 2);
    }

    #[test]
    fn test_filter_absent_field_returns_all() {
        let ds = sales();
        assert_eq!(filter_by_value(&ds, "Trainer", "Sara").len(), ds.len());
    }

    #[test]
    fn test_group_and_aggregate_sorted_by_key() {
        let rows = group_and_aggregate(
            &sales(),
            "Month",
            &[
                ("Dials", Aggregator::Sum),
                ("Dials to calls %", Aggregator::MeanPercent),
                ("Calls", Aggregator::Sum),
            ],
        );
        assert_eq!(
            rows,
            vec![
                GroupRow {
                    key: "February".to_string(),
                    values: vec![150.0, 50.0, 0.0],
                },
                GroupRow {
                    key: "January".to_string(),
                    values: vec![20.0, 50.0, 0.0],
                },
            ]
        );
    }

    #[test]
    fn test_group_and_aggregate_numeric_months_in_calendar_order() {
        let ds = Dataset::new(
            &["Month", "Dials"],
            [1.0, 2.0, 10.0, 11.0, 12.0, 3.0]
                .into_iter()
                .map(|m| vec![num(m), num(m * 10.0)])
                .collect(),
        );
        let rows = group_and_aggregate(&ds, "Month", &[("Dials", Aggregator::Sum)]);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["1", "2", "3", "10", "11", "12"]);
        assert_eq!(rows[3].values, [100.0]);
    }

    #[test]
    fn test_group_keys_numbers_before_text() {
        let ds = Dataset::new(
            &["Month"],
            vec![vec![text("March")], vec![text("10")], vec![text("9")]],
        );
        let rows = group_and_aggregate(&ds, "Month", &[]);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["9", "10", "March"]);
    }

    #[test]
    fn test_group_and_aggregate_absent_group_field() {
        assert!(group_and_aggregate(&sales(), "Trainer", &[("Dials", Aggregator::Sum)]).is_empty());
    }

    #[test]
    fn test_aggregator_count() {
        assert_eq!(Aggregator::Count.apply(&[1.0, 5.0]), 2.0);
        assert_eq!(Aggregator::MeanPercent.apply(&[]), 0.0);
    }

    #[test]
    fn test_funnel_keeps_stage_order_and_values() {
        let stages = funnel([100.0, 60.0, 30.0, 10.0, 8.0, 3.0]);
        let labels: Vec<_> = stages.iter().map(|s| s.label).collect();
        let values: Vec<_> = stages.iter().map(|s| s.value).collect();
        assert_eq!(labels, ["Dials", "Calls", "DM", "DW", "Prop Sent", "Prop Sold"]);
        assert_eq!(values, [100.0, 60.0, 30.0, 10.0, 8.0, 3.0]);
        assert_eq!(stages[0].pct_of_previous, None);
        assert_eq!(stages[1].pct_of_previous, Some(60.0));
    }

    #[test]
    fn test_funnel_zero_stage_has_no_ratio() {
        let stages = funnel([0.0, 5.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(stages[1].pct_of_previous, None);
        assert_eq!(stages[2].pct_of_previous, Some(0.0));
    }

    #[test]
    fn test_expectation_split() {
        let ds = Dataset::new(
            &["Expectation"],
            [1.0, 2.0, 3.0, 4.0, 5.0]
                .into_iter()
                .map(|r| vec![num(r)])
                .chain([vec![text("n/a")], vec![Value::Empty]])
                .collect(),
        );
        let split = expectation_split(&ds, "Expectation", 3.0);
        assert_eq!(split, ExpectationSplit { low: 3, good: 2 });
        assert_eq!(split.share(RatingBucket::Low), Some(60.0));
        assert_eq!(ExpectationSplit::default().share(RatingBucket::Good), None);
    }

    #[test]
    fn test_decimal_comma_ratings_are_excluded() {
        let ds = Dataset::new(&["Expectation"], vec![vec![text("4,5")], vec![text("2")]]);
        assert_eq!(safe_sum(&ds, "Expectation"), 2.0);
        assert_eq!(safe_avg(&ds, "Expectation"), 2.0);
        assert_eq!(
            expectation_split(&ds, "Expectation", 3.0),
            ExpectationSplit { low: 1, good: 0 }
        );
    }

    #[test]
    fn test_classify_rating_boundary() {
        assert_eq!(classify_rating(3.0, 3.0), RatingBucket::Low);
        assert_eq!(classify_rating(3.5, 3.0), RatingBucket::Good);
    }

    #[test]
    fn test_month_trend_orders_by_calendar_month() {
        let ds = Dataset::new(
            &["Date", "Content"],
            vec![
                vec![text("2024-03-10"), num(4.0)],
                vec![text("2024-01-05"), num(2.0)],
                vec![text("garbage"), num(1.0)],
                vec![text("2023-02-20"), num(5.0)],
                vec![text("2024-01-25"), num(4.0)],
            ],
        );
        let trend = month_trend(&ds, "Date", &["Content", "Missing"]);
        let names: Vec<_> = trend.iter().map(|r| r.name).collect();
        assert_eq!(names, ["Jan", "Feb", "Mar"]);
        assert_eq!(trend[0].month, 1);
        assert_eq!(trend[0].values, vec![Some(3.0), None]);
        assert_eq!(trend[2].values, vec![Some(4.0), None]);
    }

    #[test]
    fn test_month_trend_gap_for_month_without_ratings() {
        let ds = Dataset::new(
            &["Date", "Content"],
            vec![
                vec![text("2024-01-05"), num(4.0)],
                vec![text("2024-02-05"), text("n/a")],
                vec![text("2024-02-20"), Value::Empty],
            ],
        );
        let trend = month_trend(&ds, "Date", &["Content"]);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].values, vec![Some(4.0)]);
        assert_eq!(trend[1].name, "Feb");
        assert_eq!(trend[1].values, vec![None]);
    }

    #[test]
    fn test_month_trend_no_parseable_dates() {
        let ds = Dataset::new(&["Date"], vec![vec![text("soon")]]);
        assert!(month_trend(&ds, "Date", &[]).is_empty());
    }
}
