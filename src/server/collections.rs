use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::RequireUser;
use crate::pagination::{CollectionSet, paginate, sort_key};
use crate::server::AppState;
use crate::server::dto::{CreateCollectionRequest, ListParams, UpdateCollectionRequest};
use crate::server::response::{ApiError, ListResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_collection_name;
use crate::types::{Collection, new_id};

pub async fn list_collections(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let view = CollectionSet {
        store: state.store.as_ref(),
        owner_id: &auth.0.id,
    };
    let page_size = params.page_size.unwrap_or(state.default_page_size);
    let page = paginate(&view, params.cursor.as_deref(), page_size)?;

    Ok::<_, ApiError>(Json(ListResponse::from(page)))
}

pub async fn create_collection(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCollectionRequest>,
) -> impl IntoResponse {
    validate_collection_name(&req.name)?;

    let now = Utc::now();
    let id = new_id();
    let collection = Collection {
        cursor_value: sort_key(now, &id),
        id,
        owner_id: auth.0.id,
        name: req.name,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_collection(&collection)
        .api_err("Failed to create collection")?;

    Ok::<_, ApiError>(Json(collection))
}

pub async fn get_collection(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let collection = state
        .store
        .get_collection(&auth.0.id, &id)
        .api_err("Failed to get collection")?
        .or_not_found("Collection not found")?;

    Ok::<_, ApiError>(Json(collection))
}

pub async fn update_collection(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCollectionRequest>,
) -> impl IntoResponse {
    validate_collection_name(&req.name)?;

    let mut collection = state
        .store
        .get_collection(&auth.0.id, &id)
        .api_err("Failed to get collection")?
        .or_not_found("Collection not found")?;

    // Every write refreshes the sort key, moving the row to the head of the
    // descending order.
    let now = Utc::now();
    collection.name = req.name;
    collection.cursor_value = sort_key(now, &collection.id);
    collection.updated_at = now;

    state
        .store
        .update_collection(&collection)
        .api_err("Failed to update collection")?;

    Ok::<_, ApiError>(Json(collection))
}

pub async fn delete_collection(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_collection(&auth.0.id, &id)
        .api_err("Failed to delete collection")?;

    if !deleted {
        return Err(ApiError::not_found("Collection not found"));
    }

    Ok::<_, ApiError>(StatusCode::OK)
}
