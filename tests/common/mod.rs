#![allow(dead_code)]

use push_report::{
    ColumnSpec, ErrorKind, IdentityError, IdentityProvider, QueryEngine, QueryError,
    QueryRequest, QueryResult, ReportSettings,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

pub const GOOD_ARN: &str =
    "arn:aws:sts::123456789012:assumed-role/PIBAConsumeBoti/analyst@example.com";

/// Engine that replays canned responses and records every request.
pub struct ScriptedEngine {
    responses: RefCell<VecDeque<Result<QueryResult, QueryError>>>,
    pub requests: RefCell<Vec<QueryRequest>>,
}

impl ScriptedEngine {
    pub fn new(responses: Vec<Result<QueryResult, QueryError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn returning(result: QueryResult) -> Self {
        Self::new(vec![Ok(result)])
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl QueryEngine for ScriptedEngine {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryResult, QueryError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(QueryError::new(ErrorKind::Unknown, "no scripted response")))
    }
}

pub struct FixedIdentity(pub Result<String, IdentityError>);

impl FixedIdentity {
    pub fn arn(arn: &str) -> Self {
        Self(Ok(arn.to_string()))
    }
}

impl IdentityProvider for FixedIdentity {
    async fn caller_arn(&self) -> Result<String, IdentityError> {
        self.0.clone()
    }
}

pub fn settings_in(dir: &Path) -> ReportSettings {
    ReportSettings {
        config_file: dir.join("config_fechas.txt"),
        output_folder: dir.join("output"),
        ..ReportSettings::default()
    }
}

pub fn message_count(count: &str) -> QueryResult {
    QueryResult::from_rows(
        &[ColumnSpec::integer("count_messages")],
        &[vec![Some(count.to_string())]],
    )
    .unwrap()
}

pub fn sessions(rows: &[(&str, i64)]) -> QueryResult {
    let rows: Vec<Vec<Option<String>>> = rows
        .iter()
        .map(|(cause, count)| vec![Some(cause.to_string()), Some(count.to_string())])
        .collect();
    QueryResult::from_rows(
        &[
            ColumnSpec::text("starting_cause"),
            ColumnSpec::integer("Cant_sesiones"),
        ],
        &rows,
    )
    .unwrap()
}
