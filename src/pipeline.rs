use crate::date_config::{DateConfig, resolve_date_config};
use crate::engine::{QueryEngine, QueryRequest, execute_with_fallback};
use crate::error::ReportResult;
use crate::identity::{CallerIdentity, IdentityProvider, check_identity};
use crate::metric::MetricKind;
use crate::output::{OutputFiles, write_outputs};
use crate::result::{Extraction, QueryResult, extract_metric};
use crate::settings::ReportSettings;
use serde::Serialize;
use tracing::{debug, info};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub metric: MetricKind,
    pub period: DateConfig,
    pub config_warnings: Vec<String>,
    pub config_synthesized: bool,
    pub identity: CallerIdentity,
    pub sql: String,
    pub result: QueryResult,
    pub extraction: Extraction,
    pub files: OutputFiles,
}

/// Machine-readable view of a [`ReportOutcome`].
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary<'a> {
    pub metric: MetricKind,
    pub period: &'a DateConfig,
    pub period_header: String,
    pub start: String,
    pub end: String,
    pub value: u64,
    pub cell: String,
    pub categories: &'a [String],
    pub matched: bool,
    pub rows: usize,
    pub identity: &'a CallerIdentity,
    pub files: &'a OutputFiles,
    pub warnings: &'a [String],
}

impl ReportOutcome {
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            metric: self.metric,
            period: &self.period,
            period_header: self.period.period_header(),
            start: self.period.start_iso(),
            end: self.period.end_iso(),
            value: self.extraction.value.get(),
            cell: self.metric.dashboard_cell(),
            categories: &self.extraction.categories,
            matched: self.extraction.matched,
            rows: self.result.height(),
            identity: &self.identity,
            files: &self.files,
            warnings: &self.config_warnings,
        }
    }

    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}

/// Resolve the period, verify the caller, run the query and write outputs.
///
/// Config and identity failures return before any query is submitted, and
/// extraction failures return before any file is written.
pub async fn run<E, P>(
    metric: MetricKind,
    settings: &ReportSettings,
    engine: &E,
    identity: &P,
) -> ReportResult<ReportOutcome>
where
    E: QueryEngine,
    P: IdentityProvider,
{
    info!(metric = metric.title(), config = %settings.config_file.display(), "reading date config");
    let resolved = resolve_date_config(&settings.config_file)?;
    let period = resolved.config;
    info!(
        period = %period.label(),
        start = %period.start_iso(),
        end = %period.end_iso(),
        "period resolved"
    );

    let caller = check_identity(identity, settings).await?;

    let sql = metric.build_sql(&period);
    debug!(sql = %sql, "rendered query");
    let request = QueryRequest::new(sql.clone(), settings);
    let result = execute_with_fallback(engine, &request).await?;
    info!(rows = result.height(), "query finished");

    let extraction = extract_metric(metric, &result)?;
    info!(metric = metric.title(), value = extraction.value.get(), "metric extracted");

    let files = write_outputs(
        &settings.output_folder,
        metric,
        &period,
        &result,
        extraction.value,
    )?;

    Ok(ReportOutcome {
        metric,
        period,
        config_warnings: resolved.warnings,
        config_synthesized: resolved.synthesized,
        identity: caller,
        sql,
        result,
        extraction,
        files,
    })
}
