use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use serde::Serialize;
use std::fmt;
use std::io;

/// Operator-facing classification of every failure the report can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingConfig,
    InvalidDateFormat,
    InvalidRange,
    InvalidMonth,
    IdentityCheckFailed,
    WorkgroupResolutionFailed,
    MissingColumn,
    PermissionDenied,
    TableNotFound,
    Timeout,
    LibraryMissing,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingConfig => "MISSING_CONFIG",
            ErrorKind::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ErrorKind::InvalidRange => "INVALID_RANGE",
            ErrorKind::InvalidMonth => "INVALID_MONTH",
            ErrorKind::IdentityCheckFailed => "IDENTITY_CHECK_FAILED",
            ErrorKind::WorkgroupResolutionFailed => "WORKGROUP_RESOLUTION_FAILED",
            ErrorKind::MissingColumn => "MISSING_COLUMN",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::TableNotFound => "TABLE_NOT_FOUND",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::LibraryMissing => "LIBRARY_MISSING",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }

    /// Last-resort classification of an opaque error message.
    ///
    /// Only used when the failing service gave no structured error code.
    pub fn classify_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("table") && lower.contains("not") {
            ErrorKind::TableNotFound
        } else if lower.contains("workgroup") {
            ErrorKind::WorkgroupResolutionFailed
        } else if lower.contains("permission") || lower.contains("denied") {
            ErrorKind::PermissionDenied
        } else if lower.contains("timeout") || lower.contains("timed out") {
            ErrorKind::Timeout
        } else if CLI_MISSING_PATTERNS
            .iter()
            .any(|pattern| lower.contains(pattern))
        {
            ErrorKind::LibraryMissing
        } else {
            ErrorKind::Unknown
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static CLI_MISSING_PATTERNS: &[&str] = &[
    "not installed",
    "command not found",
    "is not recognized as an internal or external command",
];

/// Failure of the remote query boundary, already classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct QueryError {
    pub kind: ErrorKind,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the failure text points at the workgroup, whatever kind it was
    /// classified as.
    pub fn mentions_workgroup(&self) -> bool {
        self.message.to_ascii_lowercase().contains("workgroup")
    }

    /// Build an error whose kind is guessed from the message text.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::classify_message(&message),
            message,
        }
    }
}

/// Which credential problem the identity service reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialProblem {
    Expired,
    Unconfigured,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("config file {path} has neither MES+AÑO nor FECHA_INICIO+FECHA_FIN")]
    MissingConfig { path: String },

    #[error("invalid date value '{value}': {reason}")]
    InvalidDateFormat { value: String, reason: String },

    #[error("FECHA_INICIO {start} is after FECHA_FIN {end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid month '{value}': must be an integer between 1 and 12")]
    InvalidMonth { value: String },

    #[error("credential check failed: {message}")]
    Credentials {
        problem: CredentialProblem,
        profile: String,
        message: String,
    },

    #[error("caller {arn} is not using role {required} (current role: {current})")]
    WrongRole {
        arn: String,
        required: String,
        current: String,
        profile: String,
    },

    #[error("query result has no column '{column}' (columns: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("unexpected metric value in column '{column}': {value}")]
    InvalidMetricValue { column: String, value: String },

    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    #[error("external tool '{tool}' is not installed or not on PATH")]
    ToolMissing { tool: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataframe error: {0}")]
    DataFrame(#[from] PolarsError),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] XlsxError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::MissingConfig { .. } => ErrorKind::MissingConfig,
            ReportError::InvalidDateFormat { .. } => ErrorKind::InvalidDateFormat,
            ReportError::InvalidRange { .. } => ErrorKind::InvalidRange,
            ReportError::InvalidMonth { .. } => ErrorKind::InvalidMonth,
            ReportError::Credentials { .. } | ReportError::WrongRole { .. } => {
                ErrorKind::IdentityCheckFailed
            }
            ReportError::MissingColumn { .. } => ErrorKind::MissingColumn,
            ReportError::Query(err) => err.kind,
            ReportError::ToolMissing { .. } => ErrorKind::LibraryMissing,
            ReportError::InvalidMetricValue { .. }
            | ReportError::Io(_)
            | ReportError::Csv(_)
            | ReportError::DataFrame(_)
            | ReportError::Spreadsheet(_)
            | ReportError::Serialization(_) => ErrorKind::Unknown,
        }
    }

    /// Steps the operator can take to fix the failure.
    pub fn remediation(&self) -> Vec<String> {
        match self {
            ReportError::MissingConfig { path } => vec![
                format!("Edit {path} and set MES and AÑO, or FECHA_INICIO and FECHA_FIN"),
                "Run `push-report init-config --force` to regenerate a documented example".into(),
            ],
            ReportError::InvalidDateFormat { .. } => {
                vec!["Use YYYY-MM-DD dates (e.g. 2025-10-01) and an integer year".into()]
            }
            ReportError::InvalidRange { .. } => {
                vec!["FECHA_INICIO must be on or before FECHA_FIN".into()]
            }
            ReportError::InvalidMonth { .. } => vec!["MES must be between 1 and 12".into()],
            ReportError::Credentials {
                problem: CredentialProblem::Expired,
                profile,
                ..
            } => vec![
                "Your AWS session expired. Run:".into(),
                format!("aws-azure-login --profile {profile} --mode=gui"),
            ],
            ReportError::Credentials {
                problem: CredentialProblem::Unconfigured,
                profile,
                ..
            } => vec![
                format!("1. Run: aws-azure-login --configure --profile {profile}"),
                format!("2. Then: aws-azure-login --profile {profile} --mode=gui"),
            ],
            ReportError::WrongRole {
                required, profile, ..
            } => vec![
                format!("1. Run: aws-azure-login --profile {profile} --mode=gui"),
                format!("2. When authenticating, SELECT the role: {required}"),
                "3. Run this report again".into(),
            ],
            ReportError::MissingColumn { available, .. } => vec![format!(
                "The query returned columns {available:?}; check that the query template matches the table schema"
            )],
            ReportError::Query(err) => query_remediation(err.kind),
            ReportError::ToolMissing { tool } => vec![format!(
                "Install {tool} (npm install -g aws-azure-login) and make sure it is on PATH"
            )],
            ReportError::InvalidMetricValue { .. } => {
                vec!["The metric column must hold a non-negative integer".into()]
            }
            ReportError::Io(_)
            | ReportError::Csv(_)
            | ReportError::DataFrame(_)
            | ReportError::Spreadsheet(_)
            | ReportError::Serialization(_) => {
                vec!["Check that the output folder is writable and the file is not open in another program".into()]
            }
        }
    }
}

fn query_remediation(kind: ErrorKind) -> Vec<String> {
    match kind {
        ErrorKind::TableNotFound => vec![
            "The table does not exist or you lack permission to read it".into(),
            "Verify access to the boti_*_metrics_2 tables".into(),
        ],
        ErrorKind::WorkgroupResolutionFailed => vec!["Problem with the Athena workgroup".into()],
        ErrorKind::PermissionDenied => vec!["Permission problem: check the assumed role".into()],
        ErrorKind::Timeout => vec!["The query took too long; try a shorter date range".into()],
        ErrorKind::LibraryMissing => vec!["A required local tool is missing".into()],
        _ => vec!["Unexpected error".into()],
    }
}
