//! Scalar values produced by data sources and compared by filters.
//!
//! Raw rows arrive from a [`crate::source::RowSource`] as positional lists of
//! [`Scalar`]. Filters later re-infer a [`Scalar`] from formatted cell text so
//! that `>` and `<` compare numbers numerically and dates chronologically.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const DAY_FIRST_DATE_FORMAT: &str = "%d/%m/%Y";
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scalar {
    #[default]
    Null,
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Boolean(bool),
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Scalar::Text(value.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "text",
            Scalar::Date(_) => "date",
            Scalar::DateTime(_) => "datetime",
            Scalar::Boolean(_) => "boolean",
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
            Scalar::Date(d) => d.format(ISO_DATE_FORMAT).to_string(),
            Scalar::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Scalar::Boolean(b) => b.to_string(),
        }
    }

    /// Interprets a field read from a file-backed source.
    ///
    /// Only unambiguous shapes are typed: numbers and ISO dates. Day-first
    /// dates stay textual, the way a database would hand back a `VARCHAR`.
    /// A field is typed only when the typed value displays as the same text,
    /// so `00123` or `1E5` stay text.
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Scalar::Null;
        }
        let typed = parse_number(trimmed)
            .map(Scalar::Number)
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
                    .ok()
                    .map(Scalar::Date)
            })
            .or_else(|| parse_datetime(trimmed).map(Scalar::DateTime));
        match typed {
            Some(value) if value.as_display() == trimmed => value,
            _ => Scalar::Text(raw.to_string()),
        }
    }

    /// Interprets formatted cell text (or a filter operand) for ordering.
    pub fn infer_comparable(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Scalar::Null;
        }
        if let Some(number) = parse_number(trimmed) {
            return Scalar::Number(number);
        }
        for fmt in [ISO_DATE_FORMAT, DAY_FIRST_DATE_FORMAT] {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Scalar::Date(date);
            }
        }
        if let Some(datetime) = parse_datetime(trimmed) {
            return Scalar::DateTime(datetime);
        }
        Scalar::Text(raw.to_string())
    }

    /// Orders two scalars when their variants are comparable.
    ///
    /// Null sorts before everything, dates are promoted to midnight when
    /// compared with datetimes, and any other mixed pair yields `None`.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Some(Ordering::Equal),
            (Scalar::Null, _) => Some(Ordering::Less),
            (_, Scalar::Null) => Some(Ordering::Greater),
            (Scalar::Number(a), Scalar::Number(b)) => Some(a.cmp(b)),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            (Scalar::Date(a), Scalar::Date(b)) => Some(a.cmp(b)),
            (Scalar::DateTime(a), Scalar::DateTime(b)) => Some(a.cmp(b)),
            (Scalar::Date(a), Scalar::DateTime(b)) => Some(a.and_time(NaiveTime::MIN).cmp(b)),
            (Scalar::DateTime(a), Scalar::Date(b)) => Some(a.cmp(&b.and_time(NaiveTime::MIN))),
            (Scalar::Boolean(a), Scalar::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(Decimal::from(value))
    }
}

impl From<Decimal> for Scalar {
    fn from(value: Decimal) -> Self {
        Scalar::Number(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(value: NaiveDateTime) -> Self {
        Scalar::DateTime(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// An unnamed, positionally ordered record returned by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRow {
    values: Vec<Scalar>,
}

impl RawRow {
    pub fn new(values: Vec<Scalar>) -> Self {
        Self { values }
    }

    /// Returns the value at `index`, or [`Scalar::Null`] when out of range.
    pub fn value(&self, index: usize) -> &Scalar {
        const NULL: &Scalar = &Scalar::Null;
        self.values.get(index).unwrap_or(NULL)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }
}

impl<T: Into<Scalar>> FromIterator<T> for RawRow {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

pub fn parse_number(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
