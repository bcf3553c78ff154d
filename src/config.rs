//! Report configuration document.
//!
//! A [`ReportConfig`] arrives wholesale (JSON from a request body, or a JSON /
//! YAML file for the command line) and is never mutated afterwards. Field
//! names follow the wire document (`spName`, `spParams`, `mappedIndex`).
//!
//! `meta.fixed` is kept in document order: the order of its entries decides
//! the column order of the generated sheet.

use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::ReportError, format::FormatSpec};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub datasource: Option<Datasource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datasource {
    #[serde(default)]
    pub sp_name: String,
    #[serde(default, deserialize_with = "deserialize_scalar_texts")]
    pub sp_params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub fixed: Option<FixedColumns>,
    #[serde(default)]
    pub custom: Option<IndexMap<String, CustomColumn>>,
    #[serde(default)]
    pub filters: Option<Vec<Filter>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub name: String,
    pub mapped_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatSpec>,
}

impl ColumnConfig {
    pub fn new(name: impl Into<String>, mapped_index: i64, format: Option<FormatSpec>) -> Self {
        Self {
            name: name.into(),
            mapped_index,
            format,
        }
    }

    /// Zero-based raw position, or `None` when the column is disabled.
    pub fn position(&self) -> Option<usize> {
        usize::try_from(self.mapped_index).ok()
    }
}

/// Reserved derived-column definition; accepted but not evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomColumn {
    #[serde(default)]
    pub mapped_to: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub condition: FilterCondition,
    #[serde(deserialize_with = "deserialize_scalar_text")]
    pub value: String,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        condition: impl Into<FilterCondition>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            condition: condition.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterCondition {
    GreaterThan,
    LessThan,
    Contains,
    Unsupported(String),
}

impl FilterCondition {
    pub fn as_str(&self) -> &str {
        match self {
            FilterCondition::GreaterThan => ">",
            FilterCondition::LessThan => "<",
            FilterCondition::Contains => "contains",
            FilterCondition::Unsupported(raw) => raw,
        }
    }
}

impl From<&str> for FilterCondition {
    fn from(value: &str) -> Self {
        match value {
            ">" => FilterCondition::GreaterThan,
            "<" => FilterCondition::LessThan,
            "contains" => FilterCondition::Contains,
            other => FilterCondition::Unsupported(other.to_string()),
        }
    }
}

impl From<String> for FilterCondition {
    fn from(value: String) -> Self {
        FilterCondition::from(value.as_str())
    }
}

impl From<FilterCondition> for String {
    fn from(value: FilterCondition) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `meta.fixed` in document order; re-inserting a key keeps its position.
pub type FixedColumns = IndexMap<String, ColumnConfig>;

/// Accepts a string or any JSON/YAML scalar and keeps its text.
///
/// Configurations written by hand often carry `"value": 100` instead of
/// `"value": "100"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
}

impl From<ScalarText> for String {
    fn from(value: ScalarText) -> Self {
        match value {
            ScalarText::Text(text) => text,
            ScalarText::Integer(n) => n.to_string(),
            ScalarText::Unsigned(n) => n.to_string(),
            ScalarText::Float(n) => n.to_string(),
            ScalarText::Boolean(b) => b.to_string(),
        }
    }
}

fn deserialize_scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    ScalarText::deserialize(deserializer).map(String::from)
}

fn deserialize_scalar_texts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<ScalarText>::deserialize(deserializer)?;
    Ok(values.into_iter().map(String::from).collect())
}

impl ReportConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ReportError> {
        serde_json::from_str(input).map_err(|err| {
            ReportError::ConfigValidation(format!("Malformed JSON report configuration: {err}"))
        })
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ReportError> {
        serde_yaml::from_str(input).map_err(|err| {
            ReportError::ConfigValidation(format!("Malformed YAML report configuration: {err}"))
        })
    }

    /// Loads a configuration file; `.yaml`/`.yml` is read as YAML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading report configuration {path:?}"))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let config = if is_yaml {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        };
        config.with_context(|| format!("Parsing report configuration {path:?}"))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("report")
    }

    /// Checks the parts the pipeline cannot run without.
    pub fn validate(&self) -> Result<(&Datasource, &Meta), ReportError> {
        let (Some(datasource), Some(meta)) = (self.datasource.as_ref(), self.meta.as_ref()) else {
            return Err(ReportError::ConfigValidation(
                "Missing required fields in the report configuration".to_string(),
            ));
        };
        if datasource.sp_name.trim().is_empty() {
            return Err(ReportError::ConfigValidation(
                "No stored procedure name provided for the datasource".to_string(),
            ));
        }
        if datasource.sp_params.is_empty() {
            return Err(ReportError::ConfigValidation(
                "No parameters provided for the stored procedure".to_string(),
            ));
        }
        Ok((datasource, meta))
    }
}

impl Meta {
    pub fn fixed_or_empty(&self) -> FixedColumns {
        self.fixed.clone().unwrap_or_default()
    }

    pub fn filters_or_empty(&self) -> &[Filter] {
        self.filters.as_deref().unwrap_or(&[])
    }
}
