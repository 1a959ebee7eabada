use crate::timeline::TimelineIssue;

/// Result alias that carries the custom [`SecondScreenError`] type.
pub type Result<T> = std::result::Result<T, SecondScreenError>;

/// Common error type for the core crate.
///
/// Scheduling itself never fails; these variants only surface at the edges
/// where configuration and timeline assets are read or where the session is
/// shared across threads.
#[derive(Debug, thiserror::Error)]
pub enum SecondScreenError {
    /// Free-form message, used for poisoned locks and driver failures.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A configuration or timeline document could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Strict loading rejected a timeline that failed validation.
    #[error("timeline has {} issue(s): {}", .issues.len(), join_issues(.issues))]
    InvalidTimeline { issues: Vec<TimelineIssue> },
}

impl SecondScreenError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SecondScreenError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SecondScreenError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

fn join_issues(issues: &[TimelineIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_timeline_lists_every_issue() {
        let err = SecondScreenError::InvalidTimeline {
            issues: vec![
                TimelineIssue::DuplicateEventId {
                    id: "ev-a".to_string(),
                },
                TimelineIssue::NonPositiveDuration {
                    id: "ev-b".to_string(),
                    duration_sec: 0.0,
                },
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("timeline has 2 issue(s)"));
        assert!(text.contains("ev-a"));
        assert!(text.contains("ev-b"));
    }

    #[test]
    fn string_conversions_produce_messages() {
        let err: SecondScreenError = "lock poisoned".into();
        assert!(matches!(err, SecondScreenError::Message(ref m) if m == "lock poisoned"));
    }
}
