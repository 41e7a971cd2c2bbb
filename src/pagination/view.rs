use crate::error::Result;
use crate::store::Store;
use crate::types::{Collection, Item};

use super::engine::KeysetView;

/// The collection set of one owner.
pub struct CollectionSet<'a> {
    pub store: &'a dyn Store,
    pub owner_id: &'a str,
}

impl KeysetView for CollectionSet<'_> {
    type Row = Collection;

    fn sort_key(row: &Collection) -> &str {
        &row.cursor_value
    }

    fn head(&self, limit: i64) -> Result<Vec<Collection>> {
        self.store.list_collections_head(self.owner_id, limit)
    }

    fn at_or_before(&self, boundary: &str, limit: i64) -> Result<Vec<Collection>> {
        self.store
            .list_collections_at_or_before(self.owner_id, boundary, limit)
    }

    fn at_or_after(&self, boundary: &str, limit: i64) -> Result<Vec<Collection>> {
        self.store
            .list_collections_at_or_after(self.owner_id, boundary, limit)
    }

    fn key_below(&self, boundary: &str) -> Result<Option<String>> {
        self.store.collection_key_below(self.owner_id, boundary)
    }

    fn key_above(&self, boundary: &str) -> Result<Option<String>> {
        self.store.collection_key_above(self.owner_id, boundary)
    }

    fn count(&self) -> Result<i64> {
        self.store.count_collections(self.owner_id)
    }
}

/// The item set of one collection, scoped to its owner.
pub struct ItemSet<'a> {
    pub store: &'a dyn Store,
    pub owner_id: &'a str,
    pub collection_id: &'a str,
}

impl KeysetView for ItemSet<'_> {
    type Row = Item;

    fn sort_key(row: &Item) -> &str {
        &row.cursor_value
    }

    fn head(&self, limit: i64) -> Result<Vec<Item>> {
        self.store
            .list_items_head(self.owner_id, self.collection_id, limit)
    }

    fn at_or_before(&self, boundary: &str, limit: i64) -> Result<Vec<Item>> {
        self.store
            .list_items_at_or_before(self.owner_id, self.collection_id, boundary, limit)
    }

    fn at_or_after(&self, boundary: &str, limit: i64) -> Result<Vec<Item>> {
        self.store
            .list_items_at_or_after(self.owner_id, self.collection_id, boundary, limit)
    }

    fn key_below(&self, boundary: &str) -> Result<Option<String>> {
        self.store
            .item_key_below(self.owner_id, self.collection_id, boundary)
    }

    fn key_above(&self, boundary: &str) -> Result<Option<String>> {
        self.store
            .item_key_above(self.owner_id, self.collection_id, boundary)
    }

    fn count(&self) -> Result<i64> {
        self.store.count_items(self.owner_id, self.collection_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    use crate::pagination::{paginate, sort_key};
    use crate::store::SqliteStore;
    use crate::types::{Collection, Item, User, new_id};

    use super::*;

    fn test_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (dir, store)
    }

    fn create_user(store: &SqliteStore, username: &str) -> String {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            hashed_password: "$argon2id$fake".to_string(),
            disabled: false,
            created_at: now,
            updated_at: now,
        };
        store.create_user(&user).unwrap();
        user.id
    }

    fn create_collections(store: &SqliteStore, owner_id: &str, n: i64) -> Vec<String> {
        let base = Utc.with_ymd_and_hms(2022, 6, 7, 12, 34, 56).unwrap();
        (0..n)
            .map(|i| {
                let at = base + Duration::minutes(i);
                let id = new_id();
                let collection = Collection {
                    id: id.clone(),
                    owner_id: owner_id.to_string(),
                    name: format!("collection-{i:03}"),
                    cursor_value: sort_key(at, &id),
                    created_at: at,
                    updated_at: at,
                };
                store.create_collection(&collection).unwrap();
                id
            })
            .collect()
    }

    #[test]
    fn test_collection_walk_covers_123_rows_in_13_pages() {
        let (_dir, store) = test_store();
        let owner_id = create_user(&store, "testuser");
        // A second owner's rows must never appear in the walk.
        let other_id = create_user(&store, "testuser2");
        create_collections(&store, &other_id, 4);

        let mut expected = create_collections(&store, &owner_id, 123);
        expected.reverse();

        let view = CollectionSet {
            store: &store,
            owner_id: &owner_id,
        };

        let mut pages = Vec::new();
        let mut walked = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = paginate(&view, cursor.as_deref(), 10).unwrap();
            assert_eq!(page.total, 123);
            pages.push(page.rows.len());
            walked.extend(page.rows.into_iter().map(|c| c.id));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(pages.len(), 13);
        assert_eq!(pages.last(), Some(&3));
        assert_eq!(walked, expected);

        // Backward from the last page reconstructs the same ordering.
        let mut last = paginate(&view, None, 10).unwrap();
        while let Some(next) = last.next_cursor.take() {
            last = paginate(&view, Some(&next), 10).unwrap();
        }

        let mut walked_back: Vec<String> = last.rows.into_iter().map(|c| c.id).collect();
        let mut prev = last.prev_cursor;
        while let Some(cursor) = prev {
            let page = paginate(&view, Some(&cursor), 10).unwrap();
            let mut ids: Vec<String> = page.rows.into_iter().map(|c| c.id).collect();
            ids.extend(walked_back);
            walked_back = ids;
            prev = page.prev_cursor;
        }
        assert_eq!(walked_back, expected);
    }

    #[test]
    fn test_empty_owner_scope() {
        let (_dir, store) = test_store();
        let owner_id = create_user(&store, "testuser");

        let view = CollectionSet {
            store: &store,
            owner_id: &owner_id,
        };
        let page = paginate(&view, None, 10).unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.next_cursor, None);
        assert_eq!(page.prev_cursor, None);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_item_set_is_scoped_to_one_collection() {
        let (_dir, store) = test_store();
        let owner_id = create_user(&store, "testuser");
        let collections = create_collections(&store, &owner_id, 2);
        let base = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();

        for (c, count) in collections.iter().zip([7i64, 3]) {
            for i in 0..count {
                let at = base + Duration::minutes(i);
                let id = new_id();
                let item = Item {
                    id: id.clone(),
                    owner_id: owner_id.clone(),
                    collection_id: c.clone(),
                    data_type: "text/plain".to_string(),
                    cursor_value: sort_key(at, &id),
                    created_at: at,
                    updated_at: at,
                };
                store.create_item(&item, b"x").unwrap();
            }
        }

        let view = ItemSet {
            store: &store,
            owner_id: &owner_id,
            collection_id: &collections[0],
        };
        let page = paginate(&view, None, 5).unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.rows.len(), 5);
        assert!(page.rows.iter().all(|i| i.collection_id == collections[0]));
        assert!(page.next_cursor.is_some());

        let rest = paginate(&view, page.next_cursor.as_deref(), 5).unwrap();
        assert_eq!(rest.rows.len(), 2);
        assert_eq!(rest.next_cursor, None);
    }
}
