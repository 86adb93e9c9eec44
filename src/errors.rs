use astra::Response;
// errors.rs
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, remote fetch).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database Error: {0}")]
    DbError(String),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch Error: {0}")]
    Fetch(String),

    #[error("Internal Server Error")]
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(e: reqwest::Error) -> Self {
        ServerError::Fetch(e.to_string())
    }
}

/// Startup configuration that cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive whole number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Failures while bringing up the map view. None of these are recoverable:
/// the view surfaces them as a blocking message.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Map credential is not configured")]
    MissingToken,

    #[error("Map engine failed to start: {0}")]
    Engine(String),
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) | ServerError::Json(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Fetch(_) => 502,
            ServerError::DbError(_) | ServerError::InternalError => 500,
        }
    }
}
