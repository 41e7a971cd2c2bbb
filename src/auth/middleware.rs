use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;
use crate::types::User;

/// Extractor that resolves the bearer access token to its user.
pub struct RequireUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    Unauthenticated,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                "Bearer realm=\"docvault\"".parse().unwrap(),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.strip_prefix("Bearer ").unwrap()
            }
            Some(_) => return Err(AuthError::InvalidScheme),
            None => return Err(AuthError::MissingAuth),
        };

        // Expired and malformed tokens land here identically: both are a
        // normal unauthenticated result, never a fault.
        let user_id = state
            .tokens
            .resolve_access_token(raw_token)
            .ok_or(AuthError::Unauthenticated)?;

        // A token whose user has since been deleted fails the lookup.
        let user = state
            .store
            .get_user(&user_id)
            .map_err(|_| AuthError::InternalError)?
            .ok_or(AuthError::Unauthenticated)?;

        if user.disabled {
            return Err(AuthError::Unauthenticated);
        }

        Ok(RequireUser(user))
    }
}
