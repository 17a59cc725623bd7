mod common;

use common::{FixedIdentity, GOOD_ARN, ScriptedEngine, message_count};
use push_report::error::CredentialProblem;
use push_report::{
    ErrorKind, IdentityError, QueryError, QueryRequest, ReportError, ReportSettings,
    check_identity, execute_with_fallback,
};

fn request() -> QueryRequest {
    QueryRequest::new("SELECT 1", &ReportSettings::default())
}

#[tokio::test]
async fn workgroup_failure_retries_once_without_workgroup() {
    let engine = ScriptedEngine::new(vec![
        Err(QueryError::from_message(
            "StartQueryExecution failed: WorkGroup Production-caba-piba-athena-boti-group is not found",
        )),
        Ok(message_count("7")),
    ]);
    let result = execute_with_fallback(&engine, &request()).await.unwrap();
    assert_eq!(result.height(), 1);

    let requests = engine.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].workgroup.is_some());
    assert!(requests[1].workgroup.is_none());
    assert_eq!(requests[1].database, requests[0].database);
}

#[tokio::test]
async fn access_denied_on_workgroup_resource_still_retries() {
    let engine = ScriptedEngine::new(vec![
        Err(QueryError::new(
            ErrorKind::PermissionDenied,
            "AccessDeniedException: not authorized to perform athena:StartQueryExecution \
             on resource arn:aws:athena:us-east-1:123456789012:workgroup/Production-caba-piba-athena-boti-group",
        )),
        Ok(message_count("7")),
    ]);
    let result = execute_with_fallback(&engine, &request()).await.unwrap();
    assert_eq!(result.height(), 1);
    assert_eq!(engine.calls(), 2);
    assert!(engine.requests.borrow()[1].workgroup.is_none());
}

#[tokio::test]
async fn table_message_naming_the_workgroup_still_retries() {
    let err = QueryError::from_message(
        "Table metadata not available in workgroup Production-caba-piba-athena-boti-group",
    );
    assert_eq!(err.kind, ErrorKind::TableNotFound);
    let engine = ScriptedEngine::new(vec![Err(err), Ok(message_count("7"))]);
    execute_with_fallback(&engine, &request()).await.unwrap();
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn fallback_failure_is_not_retried_again() {
    let engine = ScriptedEngine::new(vec![
        Err(QueryError::new(ErrorKind::WorkgroupResolutionFailed, "GetWorkGroup denied")),
        Err(QueryError::new(ErrorKind::PermissionDenied, "no output location")),
        Ok(message_count("7")),
    ]);
    let err = execute_with_fallback(&engine, &request()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn other_errors_propagate_without_retry() {
    let engine = ScriptedEngine::new(vec![
        Err(QueryError::from_message(
            "TABLE_NOT_FOUND: Table boti_session_metrics_2 does not exist",
        )),
        Ok(message_count("7")),
    ]);
    let err = execute_with_fallback(&engine, &request()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TableNotFound);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn identity_with_required_role_passes() {
    let identity = check_identity(&FixedIdentity::arn(GOOD_ARN), &ReportSettings::default())
        .await
        .unwrap();
    assert!(identity.role_matches);
    assert_eq!(identity.role, "PIBAConsumeBoti");
}

#[tokio::test]
async fn wrong_role_fails_when_enforced() {
    let provider =
        FixedIdentity::arn("arn:aws:sts::123456789012:assumed-role/ReadOnly/analyst@example.com");
    let err = check_identity(&provider, &ReportSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdentityCheckFailed);
    match &err {
        ReportError::WrongRole { current, .. } => assert_eq!(current, "ReadOnly"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.remediation().join("\n").contains("PIBAConsumeBoti"));
}

#[tokio::test]
async fn wrong_role_is_a_warning_when_not_enforced() {
    let provider =
        FixedIdentity::arn("arn:aws:sts::123456789012:assumed-role/ReadOnly/analyst@example.com");
    let settings = ReportSettings {
        enforce_role: false,
        ..ReportSettings::default()
    };
    let identity = check_identity(&provider, &settings).await.unwrap();
    assert!(!identity.role_matches);
}

#[tokio::test]
async fn credential_errors_choose_remediation() {
    let expired = FixedIdentity(Err(IdentityError::new(
        Some("ExpiredToken".into()),
        "The security token included in the request is expired",
    )));
    let err = check_identity(&expired, &ReportSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReportError::Credentials {
            problem: CredentialProblem::Expired,
            ..
        }
    ));

    let missing = FixedIdentity(Err(IdentityError::new(None, "no credentials found")));
    let err = check_identity(&missing, &ReportSettings::default())
        .await
        .unwrap_err();
    assert!(err.remediation().join("\n").contains("--configure"));
}
