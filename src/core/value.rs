//! Cell values as they arrive from spreadsheet exports, plus the coercion
//! rules used everywhere numbers, labels or dates are read out of a table.

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

// Order matters: ISO first, then month-first, then day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y",
    "%d %B %Y", "%b %d, %Y", "%B %d, %Y",
];

impl Value {
    /// Builds a value from raw text, keeping it as text. Blank strings become `Empty`.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Value::Empty
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Numeric coercion. Anything that is not a finite number is `None`.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Text(s) => parse_number(s.trim())?,
            Value::Empty | Value::Date(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// String coercion used for filtering and grouping. `Empty` has no label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Value::Empty => None,
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Date(d) => Some(d.date().format("%Y-%m-%d").to_string()),
        }
    }

    /// Date coercion. Text is tried against a fixed list of layouts.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(d.date()),
            Value::Text(s) => parse_date(s.trim()),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parses plain numbers, and numbers grouped with `,` thousands separators
/// such as `12,500.75`. Any other comma makes the text non-numeric.
fn parse_number(s: &str) -> Option<f64> {
    if !s.contains(',') {
        return s.parse().ok();
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (s, None),
    };
    let digits = int_part.strip_prefix('-').unwrap_or(int_part);
    let mut groups = digits.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    let rest_ok = groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));
    let frac_ok = frac_part.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
    if !(lead_ok && rest_ok && frac_ok) {
        return None;
    }
    s.replace(',', "").parse().ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}
