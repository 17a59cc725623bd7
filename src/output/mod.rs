use crate::date_config::DateConfig;
use crate::error::ReportResult;
use crate::metric::MetricKind;
use crate::result::{MetricValue, QueryResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod csv_export;
pub mod dashboard;

pub use csv_export::write_result_csv;
pub use dashboard::{DashboardDocument, INDICATORS, SHEET_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFiles {
    pub csv: WrittenFile,
    pub xlsx: WrittenFile,
}

fn written(path: PathBuf) -> ReportResult<WrittenFile> {
    let bytes = fs::metadata(&path)?.len();
    Ok(WrittenFile { path, bytes })
}

/// Write the CSV export and the dashboard workbook for one run.
pub fn write_outputs(
    output_folder: &Path,
    metric: MetricKind,
    period: &DateConfig,
    result: &QueryResult,
    value: MetricValue,
) -> ReportResult<OutputFiles> {
    fs::create_dir_all(output_folder)?;

    let csv_path = output_folder.join(metric.csv_file_name(period));
    write_result_csv(result, &csv_path)?;
    info!(path = %csv_path.display(), "csv written");

    let xlsx_path = output_folder.join(metric.xlsx_file_name(period));
    DashboardDocument::new(metric, period.period_header(), value).save(&xlsx_path)?;
    info!(
        path = %xlsx_path.display(),
        cell = %metric.dashboard_cell(),
        value = value.get(),
        "dashboard written"
    );

    Ok(OutputFiles {
        csv: written(csv_path)?,
        xlsx: written(xlsx_path)?,
    })
}
