pub const SCHEMA: &str = r#"
-- Users own everything; identity is immutable after registration
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,
    disabled INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Exactly one refresh token per user; rotation overwrites the row in place
CREATE TABLE IF NOT EXISTS refresh_tokens (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    token TEXT NOT NULL UNIQUE,  -- resolved by exact string match
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Collections
CREATE TABLE IF NOT EXISTS collections (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,

    -- "<padded-micros>|<id>", refreshed on every write; ties broken by id
    cursor_value TEXT NOT NULL UNIQUE,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Items
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    collection_id TEXT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    data_type TEXT NOT NULL,
    cursor_value TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Item bodies, split into fixed-size chunks reassembled in seq order
CREATE TABLE IF NOT EXISTS item_chunks (
    item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    seq INTEGER NOT NULL,
    data BLOB NOT NULL,
    PRIMARY KEY (item_id, seq)
);

-- Create indexes for the keyset range queries
CREATE INDEX IF NOT EXISTS idx_collections_owner_cursor ON collections(owner_id, cursor_value);
CREATE INDEX IF NOT EXISTS idx_items_scope_cursor ON items(owner_id, collection_id, cursor_value);
"#;
