mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface. Each method is a single statement
/// against the underlying store; the pagination engine composes several of
/// them per request without a shared snapshot.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Refresh token operations (one row per user, enforced by the schema)
    fn get_refresh_token_for_user(&self, user_id: &str) -> Result<Option<RefreshToken>>;
    fn get_refresh_token_by_token(&self, token: &str) -> Result<Option<RefreshToken>>;
    fn upsert_refresh_token(&self, refresh: &RefreshToken) -> Result<()>;

    // Collection operations
    fn create_collection(&self, collection: &Collection) -> Result<()>;
    fn get_collection(&self, owner_id: &str, id: &str) -> Result<Option<Collection>>;
    fn update_collection(&self, collection: &Collection) -> Result<()>;
    fn delete_collection(&self, owner_id: &str, id: &str) -> Result<bool>;

    // Keyset range queries over one owner's collections
    fn list_collections_head(&self, owner_id: &str, limit: i64) -> Result<Vec<Collection>>;
    fn list_collections_at_or_before(
        &self,
        owner_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Collection>>;
    fn list_collections_at_or_after(
        &self,
        owner_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Collection>>;
    fn collection_key_below(&self, owner_id: &str, boundary: &str) -> Result<Option<String>>;
    fn collection_key_above(&self, owner_id: &str, boundary: &str) -> Result<Option<String>>;
    fn count_collections(&self, owner_id: &str) -> Result<i64>;

    // Item operations; bodies are chunked transparently
    fn create_item(&self, item: &Item, body: &[u8]) -> Result<()>;
    fn get_item(&self, owner_id: &str, collection_id: &str, id: &str) -> Result<Option<Item>>;
    fn get_item_body(&self, item_id: &str) -> Result<Vec<u8>>;
    fn update_item(&self, item: &Item, body: &[u8]) -> Result<()>;
    fn delete_item(&self, owner_id: &str, collection_id: &str, id: &str) -> Result<bool>;

    // Keyset range queries over one collection's items
    fn list_items_head(&self, owner_id: &str, collection_id: &str, limit: i64)
    -> Result<Vec<Item>>;
    fn list_items_at_or_before(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Item>>;
    fn list_items_at_or_after(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Item>>;
    fn item_key_below(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
    ) -> Result<Option<String>>;
    fn item_key_above(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
    ) -> Result<Option<String>>;
    fn count_items(&self, owner_id: &str, collection_id: &str) -> Result<i64>;

    fn close(&self) -> Result<()>;
}
