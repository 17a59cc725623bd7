use crate::error::{ReportError, ReportResult};
use std::io;
use std::process::{Command, ExitStatus};
use tracing::info;

pub const LOGIN_TOOL: &str = "aws-azure-login";

/// Arguments passed to the federation tool.
pub fn login_args(profile: &str, configure: bool) -> Vec<String> {
    if configure {
        vec![
            "--configure".to_string(),
            "--profile".to_string(),
            profile.to_string(),
        ]
    } else {
        vec![
            "--profile".to_string(),
            profile.to_string(),
            "--mode=gui".to_string(),
        ]
    }
}

/// Run the federation tool in the foreground and wait for it.
pub fn run_login(profile: &str, configure: bool) -> ReportResult<ExitStatus> {
    run_login_with(LOGIN_TOOL, profile, configure)
}

pub fn run_login_with(tool: &str, profile: &str, configure: bool) -> ReportResult<ExitStatus> {
    let args = login_args(profile, configure);
    info!(tool, args = ?args, "starting federated login");
    Command::new(tool)
        .args(&args)
        .status()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ReportError::ToolMissing {
                tool: tool.to_string(),
            },
            _ => ReportError::Io(err),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn configure_and_login_use_different_flags() {
        assert_eq!(login_args("default", true), ["--configure", "--profile", "default"]);
        assert_eq!(login_args("prod", false), ["--profile", "prod", "--mode=gui"]);
    }

    #[test]
    fn missing_tool_is_library_missing() {
        let err = run_login_with("push-report-no-such-login-tool", "default", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LibraryMissing);
    }
}
