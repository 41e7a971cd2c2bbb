use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post},
};

use super::{collections, items, tokens, users};
use crate::auth::{PasswordContext, TokenService};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub passwords: PasswordContext,
    pub default_page_size: i64,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenService,
        passwords: PasswordContext,
        default_page_size: i64,
    ) -> Self {
        Self {
            store,
            tokens,
            passwords,
            default_page_size,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/token", post(tokens::issue_token))
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/collections/{id}",
            get(collections::get_collection)
                .put(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route(
            "/collections/{collection_id}/items",
            get(items::list_items).post(items::create_item),
        )
        .route(
            "/collections/{collection_id}/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
}
