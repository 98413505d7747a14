#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,
    #[error("Path `{0}` contains an empty segment")]
    EmptySegment(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TripError {
    #[error("Arrival precedes departure by {minutes} minute(s)")]
    NegativeDuration { minutes: i64 },
    #[error("Stay must span at least one day, got {days}")]
    EmptyStay { days: i64 },
    #[error("Invalid timestamp `{0}`")]
    InvalidTimestamp(String),
}

/// Failure reported by a [`crate::backend::Backend`].
///
/// Both variants carry the message that is shown to the user verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            Self::Transport(message) => message,
        }
    }
}

impl From<anyhow::Error> for BackendError {
    fn from(value: anyhow::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No user is signed in")]
    NotSignedIn,
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Trip(#[from] TripError),
}
