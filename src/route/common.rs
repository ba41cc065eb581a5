use crate::error::WebError;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use serde::{Deserialize, Serialize};
use serde_json;
use std::io::Cursor;

/// Standard API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            message: None,
        }
    }
}

/// API error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Implement Responder for ApiResponse
impl<'r, T> Responder<'r, 'static> for ApiResponse<T>
where
    T: Serialize,
{
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;

        Response::build()
            .status(Status::Ok)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

/// Implement Responder for WebError
impl<'r> Responder<'r, 'static> for WebError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = match self.status() {
            400 => Status::BadRequest,
            403 => Status::Forbidden,
            404 => Status::NotFound,
            500 => Status::InternalServerError,
            _ => Status::InternalServerError,
        };

        // Storage details never leak to the client.
        let message = match &self {
            WebError::Database { .. } | WebError::Json { .. } | WebError::Io { .. } => {
                log::error!("internal error: {self}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let error_response = ApiErrorResponse {
            success: false,
            message,
        };

        let json =
            serde_json::to_string(&error_response).map_err(|_| Status::InternalServerError)?;

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

/// Helper function to create success response
pub fn success_return<T>(value: T) -> ApiResponse<T>
where
    T: Serialize,
{
    ApiResponse::success(value)
}

/// CORS fairing for handling cross-origin requests
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(
        &self,
        _request: &'r rocket::Request<'_>,
        response: &mut rocket::Response<'r>,
    ) {
        let origins = crate::CONFIG.cors_origins.join(", ");
        response.set_header(Header::new("Access-Control-Allow-Origin", origins));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

/// Result type alias for route handlers
pub type RouteResult<T> = Result<ApiResponse<T>, WebError>;
