//! REST API client module for the passkeep service.
//!
//! This module provides the `ApiClient`, the single point of outbound
//! HTTP communication. It attaches the persisted bearer token to every
//! request that has one, and clears the persisted session when the
//! server answers 401 outside the auth routes.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
