//! Core library for passkeep.
//!
//! Everything the front ends share lives here:
//!
//! - `auth`: session store with token persistence, plus OS-keychain
//!   credential storage
//! - `api`: the single outbound HTTP client
//! - `items`: CRUD facade over the remote items resource
//! - `history`: local-only record of generated passwords
//! - `generator`: password generation
//! - `storage`: durable key/value entries on disk
//! - `config`: application configuration and base-address resolution
//!
//! The view layer (passkeep-tui) calls into these and renders state; no
//! business logic lives above this crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod generator;
pub mod history;
pub mod items;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthState, CredentialStore, Identity, SessionStore};
pub use config::Config;
pub use history::{HistoryCache, HistoryEntry};
pub use items::{ItemError, ItemService};
pub use models::SavedItem;
pub use storage::Store;
