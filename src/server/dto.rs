use serde::{Deserialize, Serialize};

use crate::types::Item;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login accepts either credentials or a refresh token. The variants are
/// discriminated by their field sets during deserialization; handler code
/// only ever sees the matched variant.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginRequest {
    #[serde(rename_all = "camelCase")]
    Password { login_id: String, password: String },
    #[serde(rename_all = "camelCase")]
    Refresh { refresh_token: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCollectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub data_type: String,
    /// base64url-encoded body bytes.
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub data_type: String,
    pub body: String,
}

/// Item metadata plus its reassembled body; only single-item retrieval
/// carries the body, list results stay metadata-only.
#[derive(Debug, Serialize)]
pub struct ItemDetailResponse {
    #[serde(flatten)]
    pub item: Item,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub page_size: Option<i64>,
}
