//! Per-column format specs and the rendering of raw values to cell text.
//!
//! A format spec string is classified once, when the report configuration is
//! parsed, into a [`FormatSpec`]:
//!
//! - strings containing both `dd` and `MM` are date patterns written with the
//!   classic `SimpleDateFormat` letters and are translated to a rendering plan
//!   (mostly chrono strftime) up front;
//! - `uppercase`, `lowercase` and `sentencecase` (any letter case) are text
//!   transforms;
//! - anything else is a verbatim spec, which only accepts textual values.

use std::{fmt, fmt::Write as _};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Scalar;

/// Fixed input pattern for textual dates (`dd/MM/yyyy`).
pub const INPUT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("format '{spec}' requires a text value but found {found}")]
    TypeMismatch { spec: String, found: &'static str },
    #[error("failed to render value with date pattern '{pattern}'")]
    Render { pattern: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("unsupported pattern letter '{letter}' in date format '{pattern}'")]
    UnsupportedLetter { pattern: String, letter: char },
    #[error("unterminated quoted literal in date format '{pattern}'")]
    UnterminatedQuote { pattern: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Upper,
    Lower,
    Sentence,
}

impl TextCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextCase::Upper => "uppercase",
            TextCase::Lower => "lowercase",
            TextCase::Sentence => "sentencecase",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Sentence => sentence_case(input),
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn sentence_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(input.len());
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// A date pattern with its precomputed rendering plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    pattern: String,
    items: Vec<PatternItem>,
}

/// One step of a translated pattern.
///
/// Most letters become strftime directives; the few `SimpleDateFormat`
/// fields chrono has no directive for are computed at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternItem {
    Strftime(String),
    Era,
    /// `k`: hour of day, 1-24.
    HourOfDay { padded: bool },
    /// `K`: hour of am/pm, 0-11.
    HourOfHalfDay { padded: bool },
    /// `W`: week of month, weeks starting on Sunday.
    WeekOfMonth,
    /// `F`: occurrence of the weekday within the month.
    DayOfWeekInMonth,
}

impl DatePattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let items = translate_pattern(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            items,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn render_datetime(&self, value: &NaiveDateTime) -> Result<String, FormatError> {
        let mut out = String::new();
        for item in &self.items {
            let written = match item {
                PatternItem::Strftime(directives) => write!(out, "{}", value.format(directives)),
                PatternItem::Era => out.write_str(if value.year() > 0 { "AD" } else { "BC" }),
                PatternItem::HourOfDay { padded } => {
                    let hour = if value.hour() == 0 { 24 } else { value.hour() };
                    write_number(&mut out, hour, *padded)
                }
                PatternItem::HourOfHalfDay { padded } => {
                    write_number(&mut out, value.hour() % 12, *padded)
                }
                PatternItem::WeekOfMonth => {
                    let offset = value
                        .date()
                        .with_day(1)
                        .map(|first| first.weekday().num_days_from_sunday())
                        .unwrap_or_default();
                    write_number(&mut out, (value.day() + offset - 1) / 7 + 1, false)
                }
                PatternItem::DayOfWeekInMonth => {
                    write_number(&mut out, (value.day() - 1) / 7 + 1, false)
                }
            };
            written.map_err(|_| FormatError::Render {
                pattern: self.pattern.clone(),
            })?;
        }
        Ok(out)
    }

    pub fn render_date(&self, value: &NaiveDate) -> Result<String, FormatError> {
        self.render_datetime(&value.and_time(NaiveTime::MIN))
    }
}

fn write_number(out: &mut String, value: u32, padded: bool) -> fmt::Result {
    if padded {
        write!(out, "{value:02}")
    } else {
        write!(out, "{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormatSpec {
    DateReformat(DatePattern),
    TextCase(TextCase),
    Verbatim(String),
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self, PatternError> {
        if spec.contains("dd") && spec.contains("MM") {
            return DatePattern::parse(spec).map(FormatSpec::DateReformat);
        }
        let case = match spec.to_ascii_lowercase().as_str() {
            "uppercase" => Some(TextCase::Upper),
            "lowercase" => Some(TextCase::Lower),
            "sentencecase" => Some(TextCase::Sentence),
            _ => None,
        };
        Ok(case
            .map(FormatSpec::TextCase)
            .unwrap_or_else(|| FormatSpec::Verbatim(spec.to_string())))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FormatSpec::DateReformat(_) => "date",
            FormatSpec::TextCase(_) => "case",
            FormatSpec::Verbatim(_) => "verbatim",
        }
    }

    pub fn as_spec_str(&self) -> &str {
        match self {
            FormatSpec::DateReformat(pattern) => pattern.pattern(),
            FormatSpec::TextCase(case) => case.as_str(),
            FormatSpec::Verbatim(spec) => spec,
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_spec_str())
    }
}

impl TryFrom<String> for FormatSpec {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FormatSpec::parse(&value)
    }
}

impl From<FormatSpec> for String {
    fn from(value: FormatSpec) -> Self {
        value.as_spec_str().to_string()
    }
}

/// Renders `value` as cell text according to `spec`.
///
/// A textual date that does not match `dd/MM/yyyy` passes through unchanged;
/// a verbatim spec applied to a non-textual value is a [`FormatError::TypeMismatch`].
pub fn format_value(value: &Scalar, spec: Option<&FormatSpec>) -> Result<String, FormatError> {
    let Some(spec) = spec else {
        return Ok(value.as_display());
    };
    match spec {
        FormatSpec::DateReformat(pattern) => match value {
            Scalar::Text(text) => match parse_input_date(text) {
                Some(date) => pattern.render_date(&date),
                None => Ok(text.clone()),
            },
            Scalar::Date(date) => pattern.render_date(date),
            Scalar::DateTime(datetime) => pattern.render_datetime(datetime),
            other => Ok(other.as_display()),
        },
        FormatSpec::TextCase(case) => Ok(match value {
            Scalar::Text(text) => case.apply(text),
            other => other.as_display(),
        }),
        FormatSpec::Verbatim(raw) => match value {
            Scalar::Text(text) => Ok(text.clone()),
            Scalar::Null => Ok(String::new()),
            other => Err(FormatError::TypeMismatch {
                spec: raw.clone(),
                found: other.type_name(),
            }),
        },
    }
}

/// Parses the leading `dd/MM/yyyy` date of `text`, ignoring trailing content.
fn parse_input_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_and_remainder(text.trim(), INPUT_DATE_FORMAT)
        .ok()
        .map(|(date, _)| date)
}

/// Collects strftime text, merging adjacent directives and literals.
#[derive(Default)]
struct PlanBuilder {
    items: Vec<PatternItem>,
}

impl PlanBuilder {
    fn directive(&mut self, directive: &str) {
        match self.items.last_mut() {
            Some(PatternItem::Strftime(text)) => text.push_str(directive),
            _ => self.items.push(PatternItem::Strftime(directive.to_string())),
        }
    }

    fn literal(&mut self, ch: char) {
        if ch == '%' {
            self.directive("%%");
        } else {
            let mut buf = [0u8; 4];
            self.directive(ch.encode_utf8(&mut buf));
        }
    }

    fn literal_str(&mut self, text: &str) {
        text.chars().for_each(|ch| self.literal(ch));
    }

    fn item(&mut self, item: PatternItem) {
        self.items.push(item);
    }
}

fn translate_pattern(pattern: &str) -> Result<Vec<PatternItem>, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut plan = PlanBuilder::default();
    let mut idx = 0usize;
    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\'' {
            // '' is a literal quote, otherwise read until the closing quote
            if chars.get(idx + 1) == Some(&'\'') {
                plan.literal('\'');
                idx += 2;
                continue;
            }
            idx += 1;
            let mut closed = false;
            while idx < chars.len() {
                if chars[idx] == '\'' {
                    if chars.get(idx + 1) == Some(&'\'') {
                        plan.literal('\'');
                        idx += 2;
                        continue;
                    }
                    closed = true;
                    idx += 1;
                    break;
                }
                plan.literal(chars[idx]);
                idx += 1;
            }
            if !closed {
                return Err(PatternError::UnterminatedQuote {
                    pattern: pattern.to_string(),
                });
            }
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let run = chars[idx..].iter().take_while(|c| **c == ch).count();
            match (ch, run) {
                ('G', _) => plan.item(PatternItem::Era),
                ('y', 2) => plan.directive("%y"),
                ('y', _) => plan.directive("%Y"),
                ('Y', 2) => plan.directive("%g"),
                ('Y', _) => plan.directive("%G"),
                ('M' | 'L', 1) => plan.directive("%-m"),
                ('M' | 'L', 2) => plan.directive("%m"),
                ('M' | 'L', 3) => plan.directive("%b"),
                ('M' | 'L', _) => plan.directive("%B"),
                ('w', 1) => plan.directive("%-V"),
                ('w', _) => plan.directive("%V"),
                ('W', _) => plan.item(PatternItem::WeekOfMonth),
                ('D', 1 | 2) => plan.directive("%-j"),
                ('D', _) => plan.directive("%j"),
                ('d', 1) => plan.directive("%-d"),
                ('d', _) => plan.directive("%d"),
                ('F', _) => plan.item(PatternItem::DayOfWeekInMonth),
                ('E', 1..=3) => plan.directive("%a"),
                ('E', _) => plan.directive("%A"),
                ('u', _) => plan.directive("%u"),
                ('a', _) => plan.directive("%p"),
                ('H', 1) => plan.directive("%-H"),
                ('H', _) => plan.directive("%H"),
                ('k', run) => plan.item(PatternItem::HourOfDay { padded: run > 1 }),
                ('K', run) => plan.item(PatternItem::HourOfHalfDay { padded: run > 1 }),
                ('h', 1) => plan.directive("%-I"),
                ('h', _) => plan.directive("%I"),
                ('m', 1) => plan.directive("%-M"),
                ('m', _) => plan.directive("%M"),
                ('s', 1) => plan.directive("%-S"),
                ('s', _) => plan.directive("%S"),
                ('S', _) => plan.directive("%3f"),
                // values carry no zone, so they render as UTC
                ('z', 1..=3) => plan.literal_str("UTC"),
                ('z', _) => plan.literal_str("Coordinated Universal Time"),
                ('Z', _) => plan.literal_str("+0000"),
                ('X', _) => plan.literal_str("Z"),
                (letter, _) => {
                    return Err(PatternError::UnsupportedLetter {
                        pattern: pattern.to_string(),
                        letter,
                    });
                }
            }
            idx += run;
            continue;
        }
        plan.literal(ch);
        idx += 1;
    }
    Ok(plan.items)
}
