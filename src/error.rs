use miette::Diagnostic;
use thiserror::Error;

/// Message reported for a 401 response that carries no server detail
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired or invalid. Please log in again.";

/// Main error type for the client
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Cannot reach the server at {base_url}: {message}")]
    #[diagnostic(code(gocanvas::transport))]
    Transport { base_url: String, message: String },

    #[error("{detail}")]
    #[diagnostic(code(gocanvas::api))]
    Api { status: u16, detail: String },

    #[error("{0}")]
    #[diagnostic(code(gocanvas::validation))]
    Validation(String),

    #[error("A submission is already in progress")]
    #[diagnostic(code(gocanvas::submit_in_flight))]
    SubmitInFlight,

    #[error("Authentication error: {0}")]
    #[diagnostic(code(gocanvas::auth))]
    Auth(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(gocanvas::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(gocanvas::config))]
    Config(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(gocanvas::storage))]
    Storage(String),

    #[error(transparent)]
    #[diagnostic(code(gocanvas::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gocanvas::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(gocanvas::other))]
    Other(String),
}

impl Error {
    /// Whether this error came from the user's input rather than the server or network
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ClientResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
