use crate::error::{AnsibleError, ErrorCode};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Process timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

/// Convert ProcessError to AnsibleError
impl From<ProcessError> for AnsibleError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Timeout { command, timeout } => {
                AnsibleError::Timeout { command, timeout }
            }
            ProcessError::CommandNotFound(cmd) => AnsibleError::execution_with_code(
                ErrorCode::EXEC_COMMAND_NOT_FOUND,
                format!("Command '{}' not found", cmd),
                Some(cmd.clone()),
            )
            .with_source(ProcessError::CommandNotFound(cmd)),
            ProcessError::SpawnFailed { command, source } => AnsibleError::execution_with_code(
                ErrorCode::EXEC_SPAWN_FAILED,
                "Failed to spawn process",
                Some(command),
            )
            .with_source(source),
            other => {
                let code = match &other {
                    ProcessError::Io(_) => ErrorCode::EXEC_OUTPUT_ERROR,
                    _ => ErrorCode::EXEC_GENERIC,
                };
                AnsibleError::execution_with_code(code, other.to_string(), None).with_source(other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_timeout_condition() {
        let err: AnsibleError = ProcessError::Timeout {
            command: "ansible-playbook site.yml".to_string(),
            timeout: Duration::from_secs(3),
        }
        .into();

        assert!(err.is_timeout());
        assert_eq!(err.code(), ErrorCode::EXEC_TIMEOUT);
    }

    #[test]
    fn test_command_not_found_keeps_command() {
        let err: AnsibleError = ProcessError::CommandNotFound("ansible-galaxy".to_string()).into();

        assert_eq!(err.code(), ErrorCode::EXEC_COMMAND_NOT_FOUND);
        assert!(err.to_string().contains("ansible-galaxy"));
    }
}
