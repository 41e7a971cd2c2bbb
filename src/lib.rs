//! # Docvault
//!
//! A multi-tenant document store, usable both as a standalone binary and as
//! a library. Users own collections, collections hold binary items, and
//! everything is exposed over HTTP with bearer-token auth and keyset
//! pagination.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! docvault = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use chrono::Duration;
//! use docvault::auth::{PasswordContext, TokenService, TokenSigner};
//! use docvault::server::{AppState, create_router};
//! use docvault::store::SqliteStore;
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/docvault.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let signer = TokenSigner::new("secret", "HS256").unwrap();
//! let tokens = TokenService::new(signer, Duration::minutes(30), Duration::days(14));
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     tokens,
//!     PasswordContext::new(),
//!     50,
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the server binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod pagination;
pub mod server;
pub mod store;
pub mod types;
