//! Authentication module: session lifecycle and credential storage.
//!
//! This module provides:
//! - `SessionStore`: restore/login/register/logout over two persisted
//!   entries (token, identity), with the {Restoring, Anonymous,
//!   Authenticated} state machine
//! - `CredentialStore`: OS-keychain password storage via keyring, used
//!   to pre-fill the login form after a session expires

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{AuthError, AuthState, Identity, SessionStore};
