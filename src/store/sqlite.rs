use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

/// Item bodies are split into chunks of this size on write and
/// concatenated in seq order on read.
const CHUNK_SIZE: usize = 64 * 1024;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn split_chunks(body: &[u8]) -> impl Iterator<Item = (i64, &[u8])> {
    body.chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(seq, data)| (seq as i64, data))
}

const USER_COLUMNS: &str = "id, username, email, hashed_password, disabled, created_at, updated_at";

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        hashed_password: row.get(3)?,
        disabled: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn row_to_refresh_token(row: &Row) -> rusqlite::Result<RefreshToken> {
    Ok(RefreshToken {
        id: row.get(0)?,
        user_id: row.get(1)?,
        token: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        updated_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

const COLLECTION_COLUMNS: &str = "id, owner_id, name, cursor_value, created_at, updated_at";

fn row_to_collection(row: &Row) -> rusqlite::Result<Collection> {
    Ok(Collection {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        cursor_value: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const ITEM_COLUMNS: &str =
    "id, owner_id, collection_id, data_type, cursor_value, created_at, updated_at";

fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        collection_id: row.get(2)?,
        data_type: row.get(3)?,
        cursor_value: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, username, email, hashed_password, disabled, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.username,
                user.email,
                user.hashed_password,
                user.disabled,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    // Refresh token operations

    fn get_refresh_token_for_user(&self, user_id: &str) -> Result<Option<RefreshToken>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, token, created_at, updated_at
             FROM refresh_tokens WHERE user_id = ?1",
            params![user_id],
            row_to_refresh_token,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_refresh_token_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, token, created_at, updated_at
             FROM refresh_tokens WHERE token = ?1",
            params![token],
            row_to_refresh_token,
        )
        .optional()
        .map_err(Error::from)
    }

    fn upsert_refresh_token(&self, refresh: &RefreshToken) -> Result<()> {
        // Rotation path: the unique user_id constraint turns concurrent
        // upserts into last-writer-wins on the token value. created_at is
        // kept from the original row.
        self.conn().execute(
            "INSERT INTO refresh_tokens (id, user_id, token, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 token = excluded.token,
                 updated_at = excluded.updated_at",
            params![
                refresh.id,
                refresh.user_id,
                refresh.token,
                format_datetime(&refresh.created_at),
                format_datetime(&refresh.updated_at),
            ],
        )?;
        Ok(())
    }

    // Collection operations

    fn create_collection(&self, collection: &Collection) -> Result<()> {
        self.conn().execute(
            "INSERT INTO collections (id, owner_id, name, cursor_value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                collection.id,
                collection.owner_id,
                collection.name,
                collection.cursor_value,
                format_datetime(&collection.created_at),
                format_datetime(&collection.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_collection(&self, owner_id: &str, id: &str) -> Result<Option<Collection>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = ?1 AND owner_id = ?2"),
            params![id, owner_id],
            row_to_collection,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_collection(&self, collection: &Collection) -> Result<()> {
        self.conn().execute(
            "UPDATE collections SET name = ?1, cursor_value = ?2, updated_at = ?3
             WHERE id = ?4 AND owner_id = ?5",
            params![
                collection.name,
                collection.cursor_value,
                format_datetime(&collection.updated_at),
                collection.id,
                collection.owner_id,
            ],
        )?;
        Ok(())
    }

    fn delete_collection(&self, owner_id: &str, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM collections WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(rows > 0)
    }

    // Keyset range queries over collections

    fn list_collections_head(&self, owner_id: &str, limit: i64) -> Result<Vec<Collection>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections
             WHERE owner_id = ?1 ORDER BY cursor_value DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![owner_id, limit], row_to_collection)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_collections_at_or_before(
        &self,
        owner_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Collection>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections
             WHERE owner_id = ?1 AND cursor_value <= ?2
             ORDER BY cursor_value DESC LIMIT ?3"
        ))?;
        let rows = stmt.query_map(params![owner_id, boundary, limit], row_to_collection)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_collections_at_or_after(
        &self,
        owner_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Collection>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections
             WHERE owner_id = ?1 AND cursor_value >= ?2
             ORDER BY cursor_value ASC LIMIT ?3"
        ))?;
        let rows = stmt.query_map(params![owner_id, boundary, limit], row_to_collection)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn collection_key_below(&self, owner_id: &str, boundary: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT cursor_value FROM collections
             WHERE owner_id = ?1 AND cursor_value < ?2
             ORDER BY cursor_value DESC LIMIT 1",
            params![owner_id, boundary],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn collection_key_above(&self, owner_id: &str, boundary: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT cursor_value FROM collections
             WHERE owner_id = ?1 AND cursor_value > ?2
             ORDER BY cursor_value ASC LIMIT 1",
            params![owner_id, boundary],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn count_collections(&self, owner_id: &str) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM collections WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }

    // Item operations

    fn create_item(&self, item: &Item, body: &[u8]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO items (id, owner_id, collection_id, data_type, cursor_value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id,
                item.owner_id,
                item.collection_id,
                item.data_type,
                item.cursor_value,
                format_datetime(&item.created_at),
                format_datetime(&item.updated_at),
            ],
        )?;
        for (seq, data) in split_chunks(body) {
            tx.execute(
                "INSERT INTO item_chunks (item_id, seq, data) VALUES (?1, ?2, ?3)",
                params![item.id, seq, data],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_item(&self, owner_id: &str, collection_id: &str, id: &str) -> Result<Option<Item>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {ITEM_COLUMNS} FROM items
                 WHERE id = ?1 AND owner_id = ?2 AND collection_id = ?3"
            ),
            params![id, owner_id, collection_id],
            row_to_item,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_item_body(&self, item_id: &str) -> Result<Vec<u8>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT data FROM item_chunks WHERE item_id = ?1 ORDER BY seq")?;
        let chunks = stmt.query_map(params![item_id], |row| row.get::<_, Vec<u8>>(0))?;

        let mut body = Vec::new();
        for chunk in chunks {
            body.extend(chunk?);
        }
        Ok(body)
    }

    fn update_item(&self, item: &Item, body: &[u8]) -> Result<()> {
        // Chunk replacement is total: a shorter body must not leave stale
        // tail chunks behind.
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE items SET data_type = ?1, cursor_value = ?2, updated_at = ?3
             WHERE id = ?4 AND owner_id = ?5 AND collection_id = ?6",
            params![
                item.data_type,
                item.cursor_value,
                format_datetime(&item.updated_at),
                item.id,
                item.owner_id,
                item.collection_id,
            ],
        )?;
        tx.execute(
            "DELETE FROM item_chunks WHERE item_id = ?1",
            params![item.id],
        )?;
        for (seq, data) in split_chunks(body) {
            tx.execute(
                "INSERT INTO item_chunks (item_id, seq, data) VALUES (?1, ?2, ?3)",
                params![item.id, seq, data],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_item(&self, owner_id: &str, collection_id: &str, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM items WHERE id = ?1 AND owner_id = ?2 AND collection_id = ?3",
            params![id, owner_id, collection_id],
        )?;
        Ok(rows > 0)
    }

    // Keyset range queries over items

    fn list_items_head(
        &self,
        owner_id: &str,
        collection_id: &str,
        limit: i64,
    ) -> Result<Vec<Item>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE owner_id = ?1 AND collection_id = ?2
             ORDER BY cursor_value DESC LIMIT ?3"
        ))?;
        let rows = stmt.query_map(params![owner_id, collection_id, limit], row_to_item)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_items_at_or_before(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Item>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE owner_id = ?1 AND collection_id = ?2 AND cursor_value <= ?3
             ORDER BY cursor_value DESC LIMIT ?4"
        ))?;
        let rows = stmt.query_map(
            params![owner_id, collection_id, boundary, limit],
            row_to_item,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_items_at_or_after(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
        limit: i64,
    ) -> Result<Vec<Item>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE owner_id = ?1 AND collection_id = ?2 AND cursor_value >= ?3
             ORDER BY cursor_value ASC LIMIT ?4"
        ))?;
        let rows = stmt.query_map(
            params![owner_id, collection_id, boundary, limit],
            row_to_item,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn item_key_below(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
    ) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT cursor_value FROM items
             WHERE owner_id = ?1 AND collection_id = ?2 AND cursor_value < ?3
             ORDER BY cursor_value DESC LIMIT 1",
            params![owner_id, collection_id, boundary],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn item_key_above(
        &self,
        owner_id: &str,
        collection_id: &str,
        boundary: &str,
    ) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT cursor_value FROM items
             WHERE owner_id = ?1 AND collection_id = ?2 AND cursor_value > ?3
             ORDER BY cursor_value ASC LIMIT 1",
            params![owner_id, collection_id, boundary],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn count_items(&self, owner_id: &str, collection_id: &str) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM items WHERE owner_id = ?1 AND collection_id = ?2",
            params![owner_id, collection_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
