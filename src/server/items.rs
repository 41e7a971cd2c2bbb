use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::Utc;

use crate::auth::RequireUser;
use crate::pagination::{ItemSet, paginate, sort_key};
use crate::server::AppState;
use crate::server::dto::{CreateItemRequest, ItemDetailResponse, ListParams, UpdateItemRequest};
use crate::server::response::{ApiError, ListResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_data_type;
use crate::store::Store;
use crate::types::{Item, new_id};

/// All item routes resolve the collection first; an absent collection and a
/// foreign-owned one both read as missing.
fn require_collection(
    store: &dyn Store,
    owner_id: &str,
    collection_id: &str,
) -> Result<(), ApiError> {
    store
        .get_collection(owner_id, collection_id)
        .api_err("Failed to get collection")?
        .or_not_found("Collection not found")?;
    Ok(())
}

fn decode_body(body: &str) -> Result<Vec<u8>, ApiError> {
    URL_SAFE
        .decode(body)
        .map_err(|_| ApiError::bad_request("Item body must be base64url-encoded"))
}

pub async fn list_items(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    require_collection(state.store.as_ref(), &auth.0.id, &collection_id)?;

    let view = ItemSet {
        store: state.store.as_ref(),
        owner_id: &auth.0.id,
        collection_id: &collection_id,
    };
    let page_size = params.page_size.unwrap_or(state.default_page_size);
    let page = paginate(&view, params.cursor.as_deref(), page_size)?;

    Ok::<_, ApiError>(Json(ListResponse::from(page)))
}

pub async fn create_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Json(req): Json<CreateItemRequest>,
) -> impl IntoResponse {
    validate_data_type(&req.data_type)?;
    require_collection(state.store.as_ref(), &auth.0.id, &collection_id)?;
    let body = decode_body(&req.body)?;

    let now = Utc::now();
    let id = new_id();
    let item = Item {
        cursor_value: sort_key(now, &id),
        id,
        owner_id: auth.0.id,
        collection_id,
        data_type: req.data_type,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_item(&item, &body)
        .api_err("Failed to create item")?;

    Ok::<_, ApiError>(Json(item))
}

pub async fn get_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((collection_id, id)): Path<(String, String)>,
) -> impl IntoResponse {
    let item = state
        .store
        .get_item(&auth.0.id, &collection_id, &id)
        .api_err("Failed to get item")?
        .or_not_found("Item not found")?;

    let body = state
        .store
        .get_item_body(&item.id)
        .api_err("Failed to read item body")?;

    Ok::<_, ApiError>(Json(ItemDetailResponse {
        body: URL_SAFE.encode(body),
        item,
    }))
}

pub async fn update_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((collection_id, id)): Path<(String, String)>,
    Json(req): Json<UpdateItemRequest>,
) -> impl IntoResponse {
    validate_data_type(&req.data_type)?;
    let body = decode_body(&req.body)?;

    let mut item = state
        .store
        .get_item(&auth.0.id, &collection_id, &id)
        .api_err("Failed to get item")?
        .or_not_found("Item not found")?;

    let now = Utc::now();
    item.data_type = req.data_type;
    item.cursor_value = sort_key(now, &item.id);
    item.updated_at = now;

    state
        .store
        .update_item(&item, &body)
        .api_err("Failed to update item")?;

    Ok::<_, ApiError>(Json(item))
}

pub async fn delete_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((collection_id, id)): Path<(String, String)>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_item(&auth.0.id, &collection_id, &id)
        .api_err("Failed to delete item")?;

    if !deleted {
        return Err(ApiError::not_found("Item not found"));
    }

    Ok::<_, ApiError>(StatusCode::OK)
}
