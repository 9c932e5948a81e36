//! Wire models shared with the remote service.
//!
//! Field names on the wire are the server's (Portuguese); they are
//! mapped to domain names via serde renames. The optional `ts` feature
//! derives TypeScript bindings for front ends consuming the same shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-persisted password entry belonging to the current user.
///
/// The client only ever holds a read-through copy for the current view;
/// the server's copy is authoritative. The list payload may omit
/// `createdAt`, so it is tolerated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct SavedItem {
    pub id: u64,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "senha")]
    pub secret: String,

    #[serde(rename = "userId", default)]
    pub user_id: Option<u64>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
