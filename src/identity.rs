//! Caller identity gate.
//!
//! The check only string-matches the ARN returned by the identity service;
//! it is a guard against running under the wrong federated role, not an
//! authorization mechanism.

use crate::error::{CredentialProblem, ReportError, ReportResult};
use crate::settings::ReportSettings;
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub code: Option<String>,
    pub message: String,
}

impl IdentityError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn problem(&self) -> CredentialProblem {
        let expired = self.code.as_deref() == Some("ExpiredToken")
            || self.message.contains("ExpiredToken");
        if expired {
            CredentialProblem::Expired
        } else {
            CredentialProblem::Unconfigured
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for IdentityError {}

/// Source of the caller's identity ARN.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    async fn caller_arn(&self) -> Result<String, IdentityError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    pub arn: String,
    pub role: String,
    pub role_matches: bool,
}

/// Role segment of an assumed-role ARN (`.../<role>/<session>`).
pub fn current_role(arn: &str) -> String {
    if !arn.contains('/') {
        return "desconocido".to_string();
    }
    arn.rsplit('/')
        .nth(1)
        .unwrap_or("desconocido")
        .to_string()
}

pub async fn check_identity<P: IdentityProvider>(
    provider: &P,
    settings: &ReportSettings,
) -> ReportResult<CallerIdentity> {
    let arn = provider.caller_arn().await.map_err(|err| {
        error!(error = %err, "could not verify AWS credentials");
        ReportError::Credentials {
            problem: err.problem(),
            profile: settings.profile.clone(),
            message: err.to_string(),
        }
    })?;
    info!(arn = %arn, "AWS credentials found");

    let role = current_role(&arn);
    let role_matches = arn.contains(&settings.required_role);
    if role_matches {
        info!(role = %settings.required_role, "role verified");
    } else if settings.enforce_role {
        error!(required = %settings.required_role, current = %role, "wrong role");
        return Err(ReportError::WrongRole {
            arn,
            required: settings.required_role.clone(),
            current: role,
            profile: settings.profile.clone(),
        });
    } else {
        warn!(
            required = %settings.required_role,
            current = %role,
            "role mismatch ignored, continuing"
        );
    }

    Ok(CallerIdentity {
        arn,
        role,
        role_matches,
    })
}

#[cfg(feature = "aws")]
pub use sts::StsIdentityProvider;

#[cfg(feature = "aws")]
mod sts {
    use super::{IdentityError, IdentityProvider};
    use aws_sdk_sts::Client as StsClient;
    use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata};

    /// Identity provider backed by STS `GetCallerIdentity`.
    pub struct StsIdentityProvider {
        client: StsClient,
    }

    impl StsIdentityProvider {
        pub fn new(config: &aws_config::SdkConfig) -> Self {
            Self {
                client: StsClient::new(config),
            }
        }
    }

    impl IdentityProvider for StsIdentityProvider {
        async fn caller_arn(&self) -> Result<String, IdentityError> {
            let out = self
                .client
                .get_caller_identity()
                .send()
                .await
                .map_err(|e| {
                    IdentityError::new(
                        e.code().map(str::to_string),
                        format!("STS GetCallerIdentity failed: {}", DisplayErrorContext(&e)),
                    )
                })?;
            out.arn()
                .map(str::to_string)
                .ok_or_else(|| IdentityError::new(None, "STS GetCallerIdentity missing Arn"))
        }
    }
}
