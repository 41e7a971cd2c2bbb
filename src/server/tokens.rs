use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::{LoginRequest, TokenResponse};
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::is_username;

/// Login endpoint: trades credentials or a still-active refresh token for a
/// fresh access token plus the user's refresh token. Repeated logins inside
/// the refresh validity window hand back the identical refresh token.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let user_id = match req {
        LoginRequest::Password { login_id, password } => {
            authenticate(&state, &login_id, &password)?
        }
        LoginRequest::Refresh { refresh_token } => state
            .tokens
            .resolve_refresh_token(store, &refresh_token)
            .api_err("Failed to resolve refresh token")?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?,
    };

    let access_token = state
        .tokens
        .issue_access_token(&user_id)
        .api_err("Failed to issue access token")?;
    let refresh_token = state
        .tokens
        .get_or_create_refresh_token(store, &user_id)
        .api_err("Failed to issue refresh token")?;

    Ok::<_, ApiError>(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
    }))
}

fn authenticate(state: &AppState, login_id: &str, password: &str) -> Result<String, ApiError> {
    let store = state.store.as_ref();

    let user = if is_username(login_id) {
        store.get_user_by_username(login_id)
    } else {
        store.get_user_by_email(login_id)
    }
    .api_err("Failed to look up user")?;

    // Unknown login id and wrong password are indistinguishable on the wire.
    let Some(user) = user else {
        return Err(ApiError::unauthorized("Incorrect loginId or password"));
    };
    if user.disabled {
        return Err(ApiError::unauthorized("Incorrect loginId or password"));
    }

    let verified = state
        .passwords
        .verify(password, &user.hashed_password)
        .api_err("Failed to verify password")?;
    if !verified {
        return Err(ApiError::unauthorized("Incorrect loginId or password"));
    }

    Ok(user.id)
}
