//! HTTP route handlers
//!
//! Routes stay thin: parse the request, call the matching service and
//! wrap the result in the uniform `ApiResponse` envelope.

pub mod account;
pub mod common;
pub mod exchange;
pub mod info;
pub mod scoreboard;
pub mod search;

pub use common::{success_return, ApiErrorResponse, ApiResponse, RouteResult, CORS};
