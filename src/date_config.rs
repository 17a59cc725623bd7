//! Resolution of the `KEY=VALUE` date configuration file.
//!
//! Two modes are supported: a whole month (`MES` + `AÑO`) or an explicit
//! inclusive range (`FECHA_INICIO` + `FECHA_FIN`). When both are present the
//! range wins.

use crate::calendar;
use crate::error::{ReportError, ReportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";
const USUAL_YEARS: std::ops::RangeInclusive<i32> = 2020..=2030;

pub const DEFAULT_MONTH: u32 = 10;
pub const DEFAULT_YEAR: i32 = 2025;

pub const DEFAULT_CONFIG_TEXT: &str = "\
# ========================================
# Configuracion de fechas para el reporte
# ========================================

# MODO 1: Mes completo
# Formato: MES=numero del mes (1-12), AÑO=año completo (ej: 2025)
MES=10
AÑO=2025

# MODO 2: Rango de fechas personalizado (formato YYYY-MM-DD)
# Descomentar estas lineas para usar rango personalizado:
# FECHA_INICIO=2025-10-01
# FECHA_FIN=2025-10-15

# NOTA: Si ambos modos estan configurados, se usa el MODO 2 (rango personalizado)
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateMode {
    Month { month: u32, year: i32 },
    Range,
}

/// Resolved reporting period. `start <= end` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateConfig {
    mode: DateMode,
    start: NaiveDate,
    end: NaiveDate,
    label: String,
}

impl DateConfig {
    pub fn month(month: u32, year: i32) -> ReportResult<Self> {
        let name = calendar::month_name(month).ok_or_else(|| ReportError::InvalidMonth {
            value: month.to_string(),
        })?;
        let out_of_range = || ReportError::InvalidDateFormat {
            value: year.to_string(),
            reason: "AÑO is outside the supported calendar range".to_string(),
        };
        let start = calendar::first_day_of_month(year, month).ok_or_else(out_of_range)?;
        let end = calendar::last_day_of_month(year, month).ok_or_else(out_of_range)?;
        Ok(Self {
            mode: DateMode::Month { month, year },
            start,
            end,
            label: format!("{name} {year}"),
        })
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> ReportResult<Self> {
        if start > end {
            return Err(ReportError::InvalidRange {
                start: calendar::format_iso(start),
                end: calendar::format_iso(end),
            });
        }
        Ok(Self {
            mode: DateMode::Range,
            start,
            end,
            label: format!(
                "{} al {}",
                calendar::format_day_month_year(start),
                calendar::format_day_month_year(end)
            ),
        })
    }

    pub fn mode(&self) -> DateMode {
        self.mode
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_iso(&self) -> String {
        calendar::format_iso(self.start)
    }

    pub fn end_iso(&self) -> String {
        calendar::format_iso(self.end)
    }

    /// Column header of the dashboard value column.
    pub fn period_header(&self) -> String {
        match self.mode {
            DateMode::Month { month, year } => calendar::month_header(year, month)
                .unwrap_or_else(|| calendar::range_header(self.start, self.end)),
            DateMode::Range => calendar::range_header(self.start, self.end),
        }
    }

    /// Period part of the output file names.
    pub fn file_stamp(&self) -> String {
        match self.mode {
            DateMode::Month { month, year } => {
                let name = calendar::month_name(month).unwrap_or("mes");
                format!("{name}_{year}")
            }
            DateMode::Range => format!(
                "{}_a_{}",
                self.start.format("%Y%m%d"),
                self.end.format("%Y%m%d")
            ),
        }
    }
}

/// Outcome of reading the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub config: DateConfig,
    /// Non-fatal findings, such as an unusual year.
    pub warnings: Vec<String>,
    /// The file was missing and a default one was written.
    pub synthesized: bool,
}

#[derive(Debug, Default)]
struct RawEntries {
    month: Option<String>,
    year: Option<String>,
    range_start: Option<String>,
    range_end: Option<String>,
}

fn parse_entries(contents: &str) -> RawEntries {
    let mut entries = RawEntries::default();
    for line in contents.lines() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_uppercase().as_str() {
            "MES" => entries.month = Some(value),
            "AÑO" | "ANO" => entries.year = Some(value),
            "FECHA_INICIO" => entries.range_start = Some(value),
            "FECHA_FIN" => entries.range_end = Some(value),
            _ => {}
        }
    }
    entries
}

fn parse_date(value: &str) -> ReportResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| ReportError::InvalidDateFormat {
        value: value.to_string(),
        reason: format!("expected YYYY-MM-DD ({err})"),
    })
}

/// Resolve a config from the text of a config file.
pub fn parse_date_config(contents: &str, source: &str) -> ReportResult<ResolvedConfig> {
    let entries = parse_entries(contents);
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };

    if let (Some(start), Some(end)) = (
        non_empty(&entries.range_start),
        non_empty(&entries.range_end),
    ) {
        let config = DateConfig::range(parse_date(&start)?, parse_date(&end)?)?;
        info!(period = %config.label(), "using custom date range");
        return Ok(ResolvedConfig {
            config,
            warnings: Vec::new(),
            synthesized: false,
        });
    }

    let (Some(month), Some(year)) = (entries.month, entries.year) else {
        return Err(ReportError::MissingConfig {
            path: source.to_string(),
        });
    };

    let month: u32 = month
        .parse()
        .map_err(|_| ReportError::InvalidMonth { value: month.clone() })?;
    let year: i32 = year.parse().map_err(|_| ReportError::InvalidDateFormat {
        value: year.clone(),
        reason: "AÑO must be an integer".to_string(),
    })?;
    if !(1..=12).contains(&month) {
        return Err(ReportError::InvalidMonth {
            value: month.to_string(),
        });
    }

    let mut warnings = Vec::new();
    if !USUAL_YEARS.contains(&year) {
        warn!(year, "unusual year in date config");
        warnings.push(format!("unusual year: {year}"));
    }

    let config = DateConfig::month(month, year)?;
    info!(period = %config.label(), "using whole month");
    Ok(ResolvedConfig {
        config,
        warnings,
        synthesized: false,
    })
}

/// Write the documented default config file.
pub fn write_default_config(path: &Path) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEXT)?;
    Ok(())
}

/// Read and resolve the config file, creating it with defaults when absent.
pub fn resolve_date_config(path: &Path) -> ReportResult<ResolvedConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "date config not found, writing default");
        write_default_config(path)?;
        return Ok(ResolvedConfig {
            config: DateConfig::month(DEFAULT_MONTH, DEFAULT_YEAR)?,
            warnings: Vec::new(),
            synthesized: true,
        });
    }
    let contents = fs::read_to_string(path)?;
    parse_date_config(&contents, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn keys_are_case_insensitive_and_accept_unaccented_year() {
        let resolved = parse_date_config("mes=3\nano=2024\n", "inline").unwrap();
        assert_eq!(resolved.config.label(), "marzo 2024");
        let resolved = parse_date_config("MES=3\naño=2024\n", "inline").unwrap();
        assert_eq!(resolved.config.label(), "marzo 2024");
    }

    #[test]
    fn value_keeps_everything_after_first_equals() {
        let entries = parse_entries("FECHA_INICIO = 2025-01-01 \n# MES=4\n");
        assert_eq!(entries.range_start.as_deref(), Some("2025-01-01"));
        assert!(entries.month.is_none());
    }

    #[test]
    fn year_beyond_calendar_is_a_date_format_error() {
        let err = parse_date_config("MES=5\nAÑO=300000\n", "inline").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDateFormat);
        assert!(err.to_string().contains("300000"));
        assert!(!err.to_string().contains("between 1 and 12"));
    }

    #[test]
    fn default_text_resolves_to_default_config() {
        let resolved = parse_date_config(DEFAULT_CONFIG_TEXT, "default").unwrap();
        assert_eq!(
            resolved.config,
            DateConfig::month(DEFAULT_MONTH, DEFAULT_YEAR).unwrap()
        );
    }
}
