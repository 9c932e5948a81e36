//! CRUD facade over the remote items resource.
//!
//! Transport failures never escape raw: every operation returns a closed
//! `ItemError` whose `Display` text is the user-facing message. Known
//! server rejection payloads map to specific variants; anything else
//! passes through with the server's own message.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::SavedItem;

/// Server message for a create against an existing item name.
const SERVER_DUPLICATE_NAME: &str = "já existe um item com este nome";

/// Server message for a create with an empty name.
const SERVER_MISSING_NAME: &str = "nome é obrigatório";

/// Server message for a create with an empty secret.
const SERVER_MISSING_SECRET: &str = "senha é obrigatória";

#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    #[error("An item with this name already exists.")]
    DuplicateName,

    #[error("The item needs a name.")]
    MissingName,

    #[error("The item needs a password.")]
    MissingSecret,

    #[error("You do not have access to this item.")]
    NotAuthorized,

    #[error("Could not reach the server. Check your connection.")]
    Network,

    #[error("{0}")]
    Server(String),
}

impl ItemError {
    fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Network(_) => ItemError::Network,
            ApiError::Unauthorized => ItemError::SessionExpired,
            ApiError::Forbidden(_) => ItemError::NotAuthorized,
            ApiError::Rejected(msg) => Self::from_server_message(msg),
            ApiError::NotFound(msg) | ApiError::Server(msg) | ApiError::Invalid(msg) => {
                ItemError::Server(msg)
            }
        }
    }

    fn from_server_message(msg: String) -> Self {
        match msg.as_str() {
            SERVER_DUPLICATE_NAME => ItemError::DuplicateName,
            SERVER_MISSING_NAME => ItemError::MissingName,
            SERVER_MISSING_SECRET => ItemError::MissingSecret,
            _ => ItemError::Server(msg),
        }
    }
}

#[derive(Serialize)]
struct CreateItemRequest<'a> {
    nome: &'a str,
    senha: &'a str,
}

/// Facade over `POST /item`, `GET /items`, `DELETE /item/{id}`.
#[derive(Clone)]
pub struct ItemService {
    client: ApiClient,
}

impl ItemService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Save a password under a name. Inputs are trimmed before sending.
    pub async fn create(&self, name: &str, secret: &str) -> Result<SavedItem, ItemError> {
        let request = CreateItemRequest {
            nome: name.trim(),
            senha: secret.trim(),
        };
        debug!(name = request.nome, "Creating item");
        self.client
            .post("/item", &request)
            .await
            .map_err(ItemError::from_api)
    }

    /// Fetch all items for the current identity. An HTTP 204 answer is an
    /// empty success, never a failure.
    pub async fn list(&self) -> Result<Vec<SavedItem>, ItemError> {
        let items = self
            .client
            .get_optional::<Vec<SavedItem>>("/items")
            .await
            .map_err(ItemError::from_api)?;
        Ok(items.unwrap_or_default())
    }

    /// Remove an item by id.
    pub async fn delete(&self, id: u64) -> Result<(), ItemError> {
        debug!(id, "Deleting item");
        self.client
            .delete(&format!("/item/{}", id))
            .await
            .map_err(ItemError::from_api)
    }
}
