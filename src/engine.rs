use crate::error::QueryError;
use crate::result::QueryResult;
use crate::settings::ReportSettings;
use tracing::{info, warn};

/// One query submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub sql: String,
    pub database: String,
    pub catalog: String,
    /// `None` targets the database without a workgroup.
    pub workgroup: Option<String>,
    pub output_location: Option<String>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>, settings: &ReportSettings) -> Self {
        Self {
            sql: sql.into(),
            database: settings.database.clone(),
            catalog: settings.catalog.clone(),
            workgroup: Some(settings.workgroup.clone()),
            output_location: settings.output_location.clone(),
        }
    }

    pub fn without_workgroup(&self) -> Self {
        Self {
            workgroup: None,
            ..self.clone()
        }
    }
}

/// Remote engine that runs SQL and blocks until the result is available.
#[allow(async_fn_in_trait)]
pub trait QueryEngine {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryResult, QueryError>;
}

/// Run the request, retrying once without the workgroup when the failure
/// message mentions the workgroup.
pub async fn execute_with_fallback<E: QueryEngine>(
    engine: &E,
    request: &QueryRequest,
) -> Result<QueryResult, QueryError> {
    info!(
        database = %request.database,
        workgroup = request.workgroup.as_deref().unwrap_or("-"),
        "submitting query"
    );
    match engine.execute(request).await {
        Ok(result) => Ok(result),
        Err(err) if err.mentions_workgroup() && request.workgroup.is_some() => {
            warn!(
                workgroup = request.workgroup.as_deref().unwrap_or_default(),
                error = %err,
                "workgroup failed, retrying without workgroup"
            );
            engine.execute(&request.without_workgroup()).await
        }
        Err(err) => Err(err),
    }
}

#[cfg(feature = "aws")]
pub use athena::AthenaEngine;

#[cfg(feature = "aws")]
mod athena {
    use super::{QueryEngine, QueryRequest};
    use crate::error::{ErrorKind, QueryError};
    use crate::result::{ColumnSpec, ColumnType, QueryResult};
    use aws_sdk_athena::Client as AthenaClient;
    use aws_sdk_athena::error::{DisplayErrorContext, ProvideErrorMetadata};
    use aws_sdk_athena::types::{
        QueryExecutionContext, QueryExecutionState, ResultConfiguration,
    };
    use std::time::Duration;
    use tracing::debug;

    /// Athena-backed engine: start, poll, then page through the results.
    pub struct AthenaEngine {
        client: AthenaClient,
        poll_interval: Duration,
    }

    impl AthenaEngine {
        pub fn new(config: &aws_config::SdkConfig, poll_interval: Duration) -> Self {
            Self {
                client: AthenaClient::new(config),
                poll_interval,
            }
        }

        async fn start(&self, request: &QueryRequest) -> Result<String, QueryError> {
            let context = QueryExecutionContext::builder()
                .database(&request.database)
                .catalog(&request.catalog)
                .build();
            let result_config = request
                .output_location
                .as_ref()
                .map(|location| ResultConfiguration::builder().output_location(location).build());
            let out = self
                .client
                .start_query_execution()
                .query_string(&request.sql)
                .query_execution_context(context)
                .set_work_group(request.workgroup.clone())
                .set_result_configuration(result_config)
                .send()
                .await
                .map_err(|e| map_sdk_error("StartQueryExecution", e))?;
            out.query_execution_id()
                .map(str::to_string)
                .ok_or_else(|| {
                    QueryError::new(
                        ErrorKind::Unknown,
                        "StartQueryExecution returned no execution id",
                    )
                })
        }

        async fn wait(&self, execution_id: &str) -> Result<(), QueryError> {
            loop {
                let out = self
                    .client
                    .get_query_execution()
                    .query_execution_id(execution_id)
                    .send()
                    .await
                    .map_err(|e| map_sdk_error("GetQueryExecution", e))?;
                let status = out.query_execution().and_then(|q| q.status());
                let state = status.and_then(|s| s.state()).cloned();
                debug!(execution_id, state = ?state, "query state");
                match state {
                    Some(QueryExecutionState::Succeeded) => return Ok(()),
                    Some(QueryExecutionState::Failed) | Some(QueryExecutionState::Cancelled) => {
                        let reason = status
                            .and_then(|s| s.state_change_reason())
                            .unwrap_or("query did not succeed")
                            .to_string();
                        return Err(QueryError::from_message(format!(
                            "query {execution_id} failed: {reason}"
                        )));
                    }
                    _ => tokio::time::sleep(self.poll_interval).await,
                }
            }
        }

        async fn fetch(&self, execution_id: &str) -> Result<QueryResult, QueryError> {
            let mut columns: Vec<ColumnSpec> = Vec::new();
            let mut rows: Vec<Vec<Option<String>>> = Vec::new();
            let mut next_token: Option<String> = None;
            let mut first_page = true;

            loop {
                let out = self
                    .client
                    .get_query_results()
                    .query_execution_id(execution_id)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|e| map_sdk_error("GetQueryResults", e))?;
                let Some(result_set) = out.result_set() else {
                    break;
                };
                if first_page {
                    columns = result_set
                        .result_set_metadata()
                        .map(|meta| {
                            meta.column_info()
                                .iter()
                                .map(|info| ColumnSpec {
                                    name: info.name().to_string(),
                                    column_type: ColumnType::from_engine_type(info.r#type()),
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                }
                // The first row of the first page repeats the column names.
                let skip = usize::from(first_page);
                for row in result_set.rows().iter().skip(skip) {
                    rows.push(
                        row.data()
                            .iter()
                            .map(|datum| datum.var_char_value().map(str::to_string))
                            .collect(),
                    );
                }
                first_page = false;
                match out.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }

            QueryResult::from_rows(&columns, &rows)
                .map_err(|err| QueryError::new(ErrorKind::Unknown, err.to_string()))
        }
    }

    impl QueryEngine for AthenaEngine {
        async fn execute(&self, request: &QueryRequest) -> Result<QueryResult, QueryError> {
            let execution_id = self.start(request).await?;
            self.wait(&execution_id).await?;
            self.fetch(&execution_id).await
        }
    }

    fn map_sdk_error<E, R>(operation: &str, err: aws_sdk_athena::error::SdkError<E, R>) -> QueryError
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let message = format!("{operation} failed: {}", DisplayErrorContext(&err));
        let kind = match err.code() {
            Some("AccessDeniedException") | Some("UnauthorizedOperation") => {
                ErrorKind::PermissionDenied
            }
            Some("ThrottlingException") | Some("TooManyRequestsException") => ErrorKind::Unknown,
            Some("ExpiredTokenException") | Some("ExpiredToken") => ErrorKind::PermissionDenied,
            _ => ErrorKind::classify_message(&message),
        };
        QueryError::new(kind, message)
    }
}
