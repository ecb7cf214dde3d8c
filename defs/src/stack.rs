use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FAILURE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(FAILED|ROLLBACK)").unwrap());
static COMPLETE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_COMPLETE$").unwrap());
static IN_PROGRESS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_IN_PROGRESS$").unwrap());

/// Everything the backend needs to create or update one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescriptor {
    pub name: String,
    pub template_body: String,
    /// Parameter key to value, in the order they are sent to the backend.
    pub parameters: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
}

/// One entry of a describe call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRecord {
    pub name: String,
    pub status: Option<String>,
    pub status_reason: Option<String>,
    pub outputs: Vec<StackOutput>,
}

impl StackRecord {
    pub fn stack_status(&self) -> StackStatus {
        StackStatus::from_raw(self.status.as_deref())
    }

    pub fn reason(&self) -> &str {
        self.status_reason.as_deref().unwrap_or("no reason reported")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    Complete(String),
    InProgress(String),
    Failed(String),
    Rollback(String),
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    Success,
    Failure,
    Transient,
}

impl StackStatus {
    /// Classifies a raw backend status. Missing or empty values are `Unknown`.
    pub fn from_raw(raw: Option<&str>) -> StackStatus {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return StackStatus::Unknown(String::new()),
        };

        if is_failure_status(raw) {
            if raw.contains("ROLLBACK") {
                StackStatus::Rollback(raw.to_string())
            } else {
                StackStatus::Failed(raw.to_string())
            }
        } else if COMPLETE_PATTERN.is_match(raw) {
            StackStatus::Complete(raw.to_string())
        } else if IN_PROGRESS_PATTERN.is_match(raw) {
            StackStatus::InProgress(raw.to_string())
        } else {
            StackStatus::Unknown(raw.to_string())
        }
    }

    pub fn phase(&self) -> StackPhase {
        match self {
            StackStatus::Complete(_) => StackPhase::Success,
            StackStatus::Failed(_) | StackStatus::Rollback(_) => StackPhase::Failure,
            StackStatus::InProgress(_) | StackStatus::Unknown(_) => StackPhase::Transient,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::Complete(s)
            | StackStatus::InProgress(s)
            | StackStatus::Failed(s)
            | StackStatus::Rollback(s)
            | StackStatus::Unknown(s) => s,
        }
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackStatus::Unknown(s) if s.is_empty() => write!(f, "<missing status>"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// True when the raw status string matches the failure/rollback pattern.
pub fn is_failure_status(raw: &str) -> bool {
    FAILURE_PATTERN.is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_complete_statuses_are_success() {
        for raw in ["CREATE_COMPLETE", "UPDATE_COMPLETE", "IMPORT_COMPLETE", "DELETE_COMPLETE"] {
            let status = StackStatus::from_raw(Some(raw));
            assert_eq!(status, StackStatus::Complete(raw.to_string()));
            assert_eq!(status.phase(), StackPhase::Success);
        }
    }

    #[test]
    fn test_rollback_and_failed_statuses_are_failures() {
        for raw in [
            "CREATE_FAILED",
            "DELETE_FAILED",
            "ROLLBACK_IN_PROGRESS",
            "ROLLBACK_COMPLETE",
            "UPDATE_ROLLBACK_COMPLETE",
            "UPDATE_ROLLBACK_FAILED",
        ] {
            assert_eq!(StackStatus::from_raw(Some(raw)).phase(), StackPhase::Failure);
            assert!(is_failure_status(raw));
        }
    }

    #[test]
    fn test_cleanup_in_progress_is_transient() {
        let status = StackStatus::from_raw(Some("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS"));
        assert_eq!(status.phase(), StackPhase::Transient);
    }

    #[test]
    fn test_missing_status_is_transient() {
        assert_eq!(StackStatus::from_raw(None).phase(), StackPhase::Transient);
        assert_eq!(StackStatus::from_raw(Some("  ")).phase(), StackPhase::Transient);
        assert_eq!(StackStatus::from_raw(None).to_string(), "<missing status>");
    }

    #[test]
    fn test_unrecognized_status_is_transient() {
        let status = StackStatus::from_raw(Some("REVIEW_PENDING"));
        assert_eq!(status, StackStatus::Unknown("REVIEW_PENDING".to_string()));
        assert_eq!(status.phase(), StackPhase::Transient);
    }

    #[test]
    fn test_record_reason_fallback() {
        let record = StackRecord {
            name: "site-dev-frontend".to_string(),
            ..Default::default()
        };
        assert_eq!(record.reason(), "no reason reported");
    }
}
