use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::server::AppState;
use crate::server::dto::CreateUserRequest;
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::{validate_email, validate_password, validate_username};
use crate::types::{User, new_id};

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let username_taken = store
        .get_user_by_username(&req.username)
        .api_err("Failed to check username")?
        .is_some();
    let email_taken = store
        .get_user_by_email(&req.email)
        .api_err("Failed to check email")?
        .is_some();
    if username_taken || email_taken {
        return Err(ApiError::bad_request("username and/or email already exists."));
    }

    let hashed_password = state
        .passwords
        .hash(&req.password)
        .api_err("Failed to hash password")?;

    let now = Utc::now();
    let user = User {
        id: new_id(),
        username: req.username,
        email: req.email,
        hashed_password,
        disabled: false,
        created_at: now,
        updated_at: now,
    };

    store.create_user(&user).api_err("Failed to create user")?;

    Ok::<_, ApiError>(Json(user))
}
