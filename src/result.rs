use crate::error::{ReportError, ReportResult};
use crate::metric::{MetricKind, PUSH_STARTING_CAUSE};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::warn;

pub const COUNT_MESSAGES_COLUMN: &str = "count_messages";
pub const STARTING_CAUSE_COLUMN: &str = "starting_cause";
pub const SESSION_COUNT_COLUMN: &str = "Cant_sesiones";

/// Column type as far as this crate cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    /// Map an engine type name (`bigint`, `varchar`, ...) to a column type.
    pub fn from_engine_type(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bigint" | "integer" | "int" | "smallint" | "tinyint" => ColumnType::Integer,
            _ => ColumnType::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Integer,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Text,
        }
    }
}

/// Tabular result of one query, in the order the engine returned it.
#[derive(Debug, Clone)]
pub struct QueryResult {
    df: DataFrame,
}

impl QueryResult {
    /// Build a result from raw string cells, converting integer columns.
    pub fn from_rows(columns: &[ColumnSpec], rows: &[Vec<Option<String>>]) -> ReportResult<Self> {
        let mut built = Vec::with_capacity(columns.len());
        for (col_idx, spec) in columns.iter().enumerate() {
            let cells = rows
                .iter()
                .map(|row| row.get(col_idx).cloned().flatten());
            let name = PlSmallStr::from(spec.name.as_str());
            let series = match spec.column_type {
                ColumnType::Integer => {
                    let values = cells
                        .map(|cell| match cell {
                            None => Ok(None),
                            Some(raw) if raw.trim().is_empty() => Ok(None),
                            Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
                                ReportError::InvalidMetricValue {
                                    column: spec.name.clone(),
                                    value: raw,
                                }
                            }),
                        })
                        .collect::<ReportResult<Vec<Option<i64>>>>()?;
                    Series::new(name, values)
                }
                ColumnType::Text => Series::new(name, cells.collect::<Vec<Option<String>>>()),
            };
            built.push(Column::from(series));
        }
        Ok(Self {
            df: DataFrame::new(built)?,
        })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Case-insensitive column lookup; engines lower-case unquoted aliases.
    pub fn find_column(&self, wanted: &str) -> Option<String> {
        self.df
            .get_column_names()
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(wanted))
            .map(|name| name.to_string())
    }

    fn require_column(&self, wanted: &str) -> ReportResult<String> {
        self.find_column(wanted)
            .ok_or_else(|| ReportError::MissingColumn {
                column: wanted.to_string(),
                available: self.column_names(),
            })
    }

    /// Cell rendered as text; nulls become empty strings.
    pub fn cell_text(&self, row_idx: usize, col_idx: usize) -> String {
        self.df
            .get_columns()
            .get(col_idx)
            .and_then(|col| col.get(row_idx).ok())
            .map(|av| any_value_text(&av))
            .unwrap_or_default()
    }

    /// All rows rendered as text, header excluded.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        let width = self.df.width();
        (0..self.df.height())
            .map(|row_idx| (0..width).map(|col_idx| self.cell_text(row_idx, col_idx)).collect())
            .collect()
    }
}

fn any_value_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        other => other
            .get_str()
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

fn any_value_count(av: &AnyValue) -> Option<u64> {
    match av {
        AnyValue::Int64(v) => u64::try_from(*v).ok(),
        AnyValue::Int32(v) => u64::try_from(*v).ok(),
        AnyValue::UInt64(v) => Some(*v),
        AnyValue::UInt32(v) => Some(u64::from(*v)),
        other => other.get_str().and_then(|s| s.trim().parse().ok()),
    }
}

/// Non-negative count written into the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct MetricValue(pub u64);

impl MetricValue {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub value: MetricValue,
    /// Distinct `starting_cause` values seen, in first-seen order.
    pub categories: Vec<String>,
    /// `false` when the metric defaulted to zero.
    pub matched: bool,
}

pub fn extract_metric(kind: MetricKind, result: &QueryResult) -> ReportResult<Extraction> {
    match kind {
        MetricKind::MessagesSent => extract_message_count(result),
        MetricKind::SessionsOpenedByPush => extract_push_sessions(result),
    }
}

fn extract_message_count(result: &QueryResult) -> ReportResult<Extraction> {
    let column = result.require_column(COUNT_MESSAGES_COLUMN)?;
    if result.is_empty() {
        return Err(ReportError::MissingColumn {
            column: COUNT_MESSAGES_COLUMN.to_string(),
            available: result.column_names(),
        });
    }
    let av = result.dataframe().column(&column)?.get(0)?;
    let value = any_value_count(&av).ok_or_else(|| ReportError::InvalidMetricValue {
        column: column.clone(),
        value: any_value_text(&av),
    })?;
    Ok(Extraction {
        value: MetricValue(value),
        categories: Vec::new(),
        matched: true,
    })
}

fn extract_push_sessions(result: &QueryResult) -> ReportResult<Extraction> {
    let cause_col = result.require_column(STARTING_CAUSE_COLUMN)?;
    let count_col = result.require_column(SESSION_COUNT_COLUMN)?;
    let df = result.dataframe();

    let mut categories: Vec<String> = Vec::new();
    for row_idx in 0..df.height() {
        let cause = any_value_text(&df.column(&cause_col)?.get(row_idx)?);
        if !categories.contains(&cause) {
            categories.push(cause);
        }
    }

    let matches = df
        .clone()
        .lazy()
        .filter(col(cause_col.as_str()).eq(lit(PUSH_STARTING_CAUSE)))
        .collect()?;

    if matches.height() == 0 {
        warn!(
            expected = PUSH_STARTING_CAUSE,
            found = ?categories,
            "starting_cause category missing, using 0"
        );
        return Ok(Extraction {
            value: MetricValue(0),
            categories,
            matched: false,
        });
    }

    let av = matches.column(&count_col)?.get(0)?;
    let value = any_value_count(&av).ok_or_else(|| ReportError::InvalidMetricValue {
        column: count_col.clone(),
        value: any_value_text(&av),
    })?;
    Ok(Extraction {
        value: MetricValue(value),
        categories,
        matched: true,
    })
}
