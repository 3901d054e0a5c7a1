//! Error types shared by the API gateway and the view-models.
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer token in the session; raised before any request is sent.
    #[error("Authentication token not found. Please log in.")]
    NotAuthenticated,
    /// Session has no agency id; agency-scoped lists cannot be requested.
    #[error("No agencyId found")]
    MissingAgency,
    /// Backend answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Status { status: StatusCode, message: String },
    #[error("failed to reach backend: {0}")]
    Network(#[source] reqwest::Error),
    #[error("invalid backend response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid request URL: {0}")]
    Url(String),
    #[error("failed to read upload: {0}")]
    Upload(#[from] std::io::Error),
}

impl ApiError {
    /// Build a status error from a response body, preferring the backend's own
    /// `message` over the operation's generic fallback.
    pub fn from_status(status: StatusCode, body: &str, fallback: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| fallback.to_string());
        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human readable message out of a JSON error body. Accepts both a
/// plain string and the list form emitted by validation pipes.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

/// Local form validation failure. Nothing is sent when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Please fill out all required fields.")]
    IncompleteForm,
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
    #[error("select at least one nurse type")]
    NoNurseType,
    #[error("select a facility")]
    NoFacility,
    #[error("end time must be after start time")]
    EndNotAfterStart,
    #[error("{value} does not exist as a local time")]
    NonexistentLocalTime { value: String },
    #[error("cannot move shift from {from} to {to}")]
    IllegalTransition { from: String, to: String },
    #[error("document is already {0}")]
    AlreadyReviewed(String),
    #[error("no document selected")]
    NoDocumentSelected,
    #[error("Please select a logo image to upload")]
    MissingLogo,
}

/// Failure reading or writing the local key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("corrupt registration draft: {0}")]
    Draft(#[from] serde_json::Error),
}

/// Error surfaced by a view-model action: the form was rejected locally,
/// the backend call failed, or the session could not be persisted.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
