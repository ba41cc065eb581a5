use rocket::serde::json::Value;
use thiserror::Error;

/// Main error type for the community web backend
#[derive(Error, Debug)]
pub enum WebError {
    /// Input validation error (malformed numbers, dates, categories, ...)
    #[error("Input error: {message}")]
    Input { message: String, status: u16 },

    /// Lookup returned no row; the route layer maps this to a 404
    #[error("No data: {message}")]
    NoData { message: String, status: u16 },

    /// Credential check failed (routine outcome, not an exception path)
    #[error("Auth failed: {message}")]
    Auth { message: String, status: u16 },

    /// Account is under an active suspension
    #[error("Account suspended: {message}")]
    Ban { message: String, status: u16 },

    /// Database error
    #[error("Database error: {message}")]
    Database { message: String },

    /// JSON serialization error
    #[error("JSON error: {message}")]
    Json { message: String },

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },
}

impl WebError {
    /// Create a new input validation error
    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input {
            message: message.into(),
            status: 400,
        }
    }

    /// Create a new no data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoData {
            message: message.into(),
            status: 404,
        }
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
            status: 403,
        }
    }

    /// Create a new suspension error
    ///
    /// The message stays generic; suspension details are never sent to the
    /// client beyond the refusal itself.
    pub fn banned() -> Self {
        Self::Ban {
            message: "Account access is suspended.".to_string(),
            status: 403,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            Self::Input { status, .. }
            | Self::NoData { status, .. }
            | Self::Auth { status, .. }
            | Self::Ban { status, .. } => *status,
            Self::Database { .. } | Self::Json { .. } | Self::Io { .. } => 500,
        }
    }
}

impl From<sqlx::Error> for WebError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WebError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for WebError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Alias for Result with WebError
pub type WebResult<T> = Result<T, WebError>;

/// 404 Not Found handler
#[rocket::catch(404)]
pub fn not_found() -> Value {
    rocket::serde::json::json!({
        "success": false,
        "error_code": 404,
        "message": "Endpoint not found"
    })
}

/// 500 Internal Server Error handler
#[rocket::catch(500)]
pub fn internal_error() -> Value {
    rocket::serde::json::json!({
        "success": false,
        "error_code": 500,
        "message": "Internal server error"
    })
}

/// 400 Bad Request handler
#[rocket::catch(400)]
pub fn bad_request() -> Value {
    rocket::serde::json::json!({
        "success": false,
        "error_code": 400,
        "message": "Bad request"
    })
}

/// 401 Unauthorized handler
#[rocket::catch(401)]
pub fn unauthorized() -> Value {
    rocket::serde::json::json!({
        "success": false,
        "error_code": 401,
        "message": "Unauthorized"
    })
}

/// 403 Forbidden handler
#[rocket::catch(403)]
pub fn forbidden() -> Value {
    rocket::serde::json::json!({
        "success": false,
        "error_code": 403,
        "message": "Forbidden"
    })
}
