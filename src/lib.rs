pub mod calendar;
pub mod date_config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod login;
pub mod metric;
pub mod output;
pub mod pipeline;
pub mod result;
pub mod settings;

pub use date_config::{
    DateConfig, DateMode, ResolvedConfig, parse_date_config, resolve_date_config,
    write_default_config,
};
#[cfg(feature = "aws")]
pub use engine::AthenaEngine;
pub use engine::{QueryEngine, QueryRequest, execute_with_fallback};
pub use error::{ErrorKind, QueryError, ReportError, ReportResult};
#[cfg(feature = "aws")]
pub use identity::StsIdentityProvider;
pub use identity::{CallerIdentity, IdentityError, IdentityProvider, check_identity};
pub use metric::MetricKind;
pub use output::{DashboardDocument, OutputFiles, write_outputs};
pub use pipeline::{ReportOutcome, ReportSummary, run};
pub use result::{ColumnSpec, ColumnType, Extraction, MetricValue, QueryResult, extract_metric};
pub use settings::ReportSettings;
