use thiserror::Error;

/// Message the stack backend returns when an update carries no changes.
pub const NO_UPDATES_MESSAGE: &str = "No updates are to be performed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("{code}: {message}")]
    Service { code: String, message: String },
}

impl BackendError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }

    /// An update that did not need to change anything.
    pub fn is_no_op_update(&self) -> bool {
        match self {
            BackendError::Service { message, .. } => message.contains(NO_UPDATES_MESSAGE),
            BackendError::NotFound(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Stack {stack} failed with status {status}: {reason}")]
    StackFailed {
        stack: String,
        status: String,
        reason: String,
    },

    #[error("Stack {stack} did not reach a terminal state after {attempts} polls (last status {status})")]
    StackTimeout {
        stack: String,
        attempts: u32,
        status: String,
    },

    #[error("command: {command} exited with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("command: {command} was terminated by a signal")]
    CommandTerminated { command: String },

    #[error("command: {command} could not be started: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Working directory {0} does not exist")]
    MissingWorkingDirectory(String),

    #[error("Invalid frontend configuration: {0}")]
    InvalidConfig(String),

    #[error("No handler registered for hook {0}")]
    UnknownHook(String),

    #[error("Failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to delete objects from bucket {bucket}: {source}")]
    Delete {
        bucket: String,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Other error occurred: {0}")]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_op_update_matches_message_substring() {
        let err = BackendError::service(
            "ValidationError",
            "No updates are to be performed.",
        );
        assert!(err.is_no_op_update());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_other_service_errors_are_not_no_op() {
        let err = BackendError::service("ValidationError", "Template format error");
        assert!(!err.is_no_op_update());
        assert!(!BackendError::NotFound("stack".to_string()).is_no_op_update());
    }

    #[test]
    fn test_stack_failed_message_names_stack_and_reason() {
        let err = FrontendError::StackFailed {
            stack: "site-dev-frontend".to_string(),
            status: "ROLLBACK_COMPLETE".to_string(),
            reason: "Bucket already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Stack site-dev-frontend failed with status ROLLBACK_COMPLETE: Bucket already exists"
        );
    }

    #[test]
    fn test_command_failed_message() {
        let err = FrontendError::CommandFailed {
            command: "npm".to_string(),
            code: 2,
        };
        assert_eq!(err.to_string(), "command: npm exited with exit code 2");
    }
}
