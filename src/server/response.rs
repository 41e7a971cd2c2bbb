use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result as StoreResult};
use crate::pagination::Page;

/// Pagination metadata for list endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub count: i64,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

/// Envelope for list endpoints: `{meta, results}`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub meta: ListMeta,
    pub results: Vec<T>,
}

impl<T: Serialize> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            meta: ListMeta {
                count: page.total,
                next_cursor: page.next_cursor,
                prev_cursor: page.prev_cursor,
            },
            results: page.rows,
        }
    }
}

/// API error that converts to a proper HTTP response
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message });
        let mut response = (self.status, Json(body)).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                "Bearer realm=\"docvault\"".parse().unwrap(),
            );
        }

        response
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidCursor
            | Error::InvalidCursorDirection(_)
            | Error::InvalidPageSize(_)
            | Error::BadRequest(_) => Self::bad_request(err.to_string()),
            Error::NotFound => Self::not_found("Not found"),
            Error::InvalidCredentials | Error::Unauthenticated => {
                Self::unauthorized(err.to_string())
            }
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::TokenSigning(_) => {
                tracing::error!("internal error: {err}");
                Self::internal("Internal server error")
            }
            Error::AlreadyExists => Self::bad_request(err.to_string()),
        }
    }
}

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|_| ApiError::internal(message))
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}
