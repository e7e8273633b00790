use serde::Serialize;
use thiserror::Error;

/// Error returned by the REST client before any UI-facing classification.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (DNS, refused connection, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// A 2xx body that does not match the expected envelope.
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("not signed in")]
    NotAuthenticated,
    /// Rejected locally, no request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Status { status, .. } => ErrorKind::from_status(*status),
            ApiError::Decode(_) => ErrorKind::Unknown,
            ApiError::NotAuthenticated => ErrorKind::Unauthorized,
            ApiError::InvalidRequest(_) => ErrorKind::BadRequest,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Origin-based taxonomy used to pick a human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Server,
    Unknown,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    /// Conflicts mean the record moved on; the operator should reload it
    /// rather than repeat the same request.
    pub fn needs_refresh(&self) -> bool {
        matches!(self, ErrorKind::Conflict)
    }

    pub fn needs_login(&self) -> bool {
        matches!(self, ErrorKind::Unauthorized | ErrorKind::Forbidden)
    }
}

/// What an error message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Order,
    Bean,
    Form,
    Product,
    Profile,
}

impl Resource {
    fn noun(&self) -> &'static str {
        match self {
            Resource::Order => "order",
            Resource::Bean => "bean",
            Resource::Form => "form",
            Resource::Product => "product",
            Resource::Profile => "profile",
        }
    }
}

/// An [`ApiError`] converted into something an operator can act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

pub fn classify(error: &ApiError, resource: Resource) -> ClassifiedError {
    let kind = error.kind();
    ClassifiedError {
        kind,
        message: message_for(kind, resource),
    }
}

pub fn message_for(kind: ErrorKind, resource: Resource) -> String {
    let noun = resource.noun();
    match kind {
        ErrorKind::Network => {
            "Unable to reach the server. Please check your internet connection and try again."
                .to_string()
        }
        ErrorKind::BadRequest => "Invalid request. Please try again.".to_string(),
        ErrorKind::Unauthorized => "Your session has expired. Please log in again.".to_string(),
        ErrorKind::Forbidden => format!(
            "You don't have permission to update this {noun}. Please log in again with an authorized account."
        ),
        ErrorKind::NotFound => format!("The requested {noun} was not found."),
        ErrorKind::Conflict => match resource {
            Resource::Bean | Resource::Form => format!("A {noun} with that name already exists."),
            _ => format!(
                "This {noun} was changed by someone else. Refresh to see its current status."
            ),
        },
        ErrorKind::Server => "Server error. Please try again later.".to_string(),
        ErrorKind::Unknown => "An unexpected error occurred. Please try again.".to_string(),
    }
}
