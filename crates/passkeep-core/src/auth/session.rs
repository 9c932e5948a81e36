//! Session store: the authenticated identity and its persisted state.
//!
//! The session is two independent durable entries - the bearer token and
//! the identity JSON. Both must be present and parseable for a session
//! to be restorable; anything less is treated as "no session" and the
//! pair is discarded. Restore never touches the network.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::storage::Store;

/// Durable entry holding the bearer token (a JSON string).
pub const TOKEN_ENTRY: &str = "auth_token";

/// Durable entry holding the identity JSON.
pub const IDENTITY_ENTRY: &str = "identity";

/// Server message for a signup against an existing email.
const SERVER_DUPLICATE_ACCOUNT: &str = "email já cadastrado";

/// Server message for a signin with wrong email or password.
const SERVER_INVALID_CREDENTIALS: &str = "email ou senha inválidos";

/// The authenticated identity as the client knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Identity {
    pub email: String,
}

/// Session lifecycle states.
///
/// `Restoring` holds until `restore()` completes so the view layer can
/// defer any auth-dependent decision; afterwards the store is either
/// `Anonymous` or `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Restoring,
    Anonymous,
    Authenticated(Identity),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Could not reach the server. Check your connection.")]
    Network,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("An account with this email already exists.")]
    DuplicateAccount,

    #[error("{0}")]
    Rejected(String),

    #[error("Could not persist the session: {0}")]
    Storage(String),
}

impl AuthError {
    fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Network(_) => AuthError::Network,
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            ApiError::Rejected(msg) if msg == SERVER_INVALID_CREDENTIALS => {
                AuthError::InvalidCredentials
            }
            ApiError::Rejected(msg) if msg == SERVER_DUPLICATE_ACCOUNT => {
                AuthError::DuplicateAccount
            }
            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Rejected(msg)
            | ApiError::Server(msg)
            | ApiError::Invalid(msg) => AuthError::Rejected(msg),
        }
    }
}

#[derive(Serialize)]
struct SigninRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Deserialize)]
struct SigninResponse {
    token: String,
    #[serde(default)]
    user: Option<UserPayload>,
}

#[derive(Deserialize)]
struct UserPayload {
    email: String,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    nome: &'a str,
    email: &'a str,
    #[serde(rename = "dataNascimento")]
    data_nascimento: NaiveDate,
    senha: &'a str,
    #[serde(rename = "confirmacaoSenha")]
    confirmacao_senha: &'a str,
}

/// Owner of the in-memory session and its persisted entries.
///
/// Constructed once at process start and passed by reference to whatever
/// needs auth state; there are no ambient globals.
pub struct SessionStore {
    store: Arc<Store>,
    client: ApiClient,
    identity: Option<Identity>,
    restoring: bool,
}

impl SessionStore {
    pub fn new(store: Arc<Store>, client: ApiClient) -> Self {
        Self {
            store,
            client,
            identity: None,
            restoring: true,
        }
    }

    pub fn state(&self) -> AuthState {
        if self.restoring {
            AuthState::Restoring
        } else {
            match &self.identity {
                Some(identity) => AuthState::Authenticated(identity.clone()),
                None => AuthState::Anonymous,
            }
        }
    }

    /// True until `restore()` has run.
    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Pure predicate: an in-memory identity is present.
    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Load the persisted session, if any.
    ///
    /// Requires both entries to be present and parseable; a partial or
    /// corrupt pair is discarded and the session left empty. Storage
    /// only - the network is never consulted.
    pub fn restore(&mut self) -> AuthState {
        let token = self.store.get::<String>(TOKEN_ENTRY);
        let identity = self.store.get::<Identity>(IDENTITY_ENTRY);
        self.restoring = false;

        match (token, identity) {
            (Ok(Some(_)), Ok(Some(identity))) => {
                info!(email = %identity.email, "Restored persisted session");
                self.identity = Some(identity);
            }
            (Ok(None), Ok(None)) => {
                self.identity = None;
            }
            other => {
                warn!(?other, "Persisted session incomplete or unreadable, discarding");
                self.discard_persisted();
                self.identity = None;
            }
        }
        self.state()
    }

    /// Authenticate against the remote service and persist the session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = email.trim();
        let request = SigninRequest {
            email,
            senha: password,
        };
        let response: SigninResponse = self
            .client
            .post("/auth/signin", &request)
            .await
            .map_err(AuthError::from_api)?;

        let identity = match response.user {
            Some(user) => Identity { email: user.email },
            None => Identity {
                email: email.to_string(),
            },
        };

        // Two independent writes; restore() tolerates a crash between them.
        self.store
            .put(TOKEN_ENTRY, &response.token)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.store
            .put(IDENTITY_ENTRY, &identity)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        info!(email = %identity.email, "Login succeeded");
        self.identity = Some(identity);
        self.restoring = false;
        Ok(())
    }

    /// Create an account. Succeeding does NOT log the new account in.
    ///
    /// The confirmation check runs before anything else; a mismatch never
    /// reaches the network.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        birth_date: NaiveDate,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let request = SignupRequest {
            nome: name.trim(),
            email: email.trim(),
            data_nascimento: birth_date,
            senha: password,
            confirmacao_senha: confirm_password,
        };
        self.client
            .post_unit("/auth/signup", &request)
            .await
            .map_err(AuthError::from_api)?;

        info!(email = email.trim(), "Account registered");
        Ok(())
    }

    /// End the session. Sign-out resolves locally - no network call (see
    /// DESIGN.md) - and the persisted pair is cleared unconditionally.
    /// Returns whether the clear succeeded.
    pub fn logout(&mut self) -> bool {
        self.identity = None;
        self.restoring = false;
        self.discard_persisted()
    }

    /// Drop the in-memory identity after an externally observed session
    /// expiry. The persisted entries were already cleared by the API
    /// client when it saw the 401.
    pub fn invalidate(&mut self) {
        if self.identity.take().is_some() {
            info!("Session invalidated after authorization failure");
        }
    }

    fn discard_persisted(&self) -> bool {
        let mut cleared = true;
        for entry in [TOKEN_ENTRY, IDENTITY_ENTRY] {
            if let Err(e) = self.store.remove(entry) {
                warn!(entry, error = %e, "Failed to clear session entry");
                cleared = false;
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, Arc<Store>, SessionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(Store::open(dir.path().to_path_buf()).expect("open store"));
        // Discard port: unit tests never reach the network.
        let client = ApiClient::new("http://127.0.0.1:9/api", store.clone()).unwrap();
        let session = SessionStore::new(store.clone(), client);
        (dir, store, session)
    }

    #[test]
    fn test_starts_restoring() {
        let (_dir, _store, session) = fixture();
        assert_eq!(session.state(), AuthState::Restoring);
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_restore_with_no_entries_is_anonymous() {
        let (_dir, _store, mut session) = fixture();
        assert_eq!(session.restore(), AuthState::Anonymous);
    }

    #[test]
    fn test_restore_with_only_token_clears_both() {
        let (_dir, store, mut session) = fixture();
        store.put(TOKEN_ENTRY, &"tok-123".to_string()).unwrap();

        assert_eq!(session.restore(), AuthState::Anonymous);
        assert!(!store.contains(TOKEN_ENTRY));
        assert!(!store.contains(IDENTITY_ENTRY));
    }

    #[test]
    fn test_restore_with_only_identity_clears_both() {
        let (_dir, store, mut session) = fixture();
        store
            .put(
                IDENTITY_ENTRY,
                &Identity {
                    email: "a@b.com".into(),
                },
            )
            .unwrap();

        assert_eq!(session.restore(), AuthState::Anonymous);
        assert!(!store.contains(TOKEN_ENTRY));
        assert!(!store.contains(IDENTITY_ENTRY));
    }

    #[test]
    fn test_restore_with_complete_pair_is_authenticated() {
        let (_dir, store, mut session) = fixture();
        store.put(TOKEN_ENTRY, &"tok-123".to_string()).unwrap();
        store
            .put(
                IDENTITY_ENTRY,
                &Identity {
                    email: "a@b.com".into(),
                },
            )
            .unwrap();

        match session.restore() {
            AuthState::Authenticated(identity) => assert_eq!(identity.email, "a@b.com"),
            other => panic!("unexpected state: {:?}", other),
        }
        assert!(session.is_logged_in());
    }

    #[test]
    fn test_restore_with_corrupt_identity_clears_both() {
        let (dir, store, mut session) = fixture();
        store.put(TOKEN_ENTRY, &"tok-123".to_string()).unwrap();
        std::fs::write(dir.path().join("identity.json"), "{not json").unwrap();

        assert_eq!(session.restore(), AuthState::Anonymous);
        assert!(!store.contains(TOKEN_ENTRY));
        assert!(!store.contains(IDENTITY_ENTRY));
    }

    #[tokio::test]
    async fn test_register_mismatch_fails_before_network() {
        // Client points at a discard port; if register tried the network
        // this would be a Network error, not PasswordMismatch.
        let (_dir, store, session) = fixture();
        let birth = NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();

        let result = session
            .register("Ana", "ana@b.com", birth, "secret1", "secret2")
            .await;

        assert!(matches!(result, Err(AuthError::PasswordMismatch)));
        assert!(!store.contains(TOKEN_ENTRY));
        assert!(!store.contains(IDENTITY_ENTRY));
    }

    #[test]
    fn test_logout_clears_state_and_entries() {
        let (_dir, store, mut session) = fixture();
        store.put(TOKEN_ENTRY, &"tok".to_string()).unwrap();
        store
            .put(
                IDENTITY_ENTRY,
                &Identity {
                    email: "a@b.com".into(),
                },
            )
            .unwrap();
        session.restore();
        assert!(session.is_logged_in());

        assert!(session.logout());
        assert!(!session.is_logged_in());
        assert_eq!(session.state(), AuthState::Anonymous);
        assert!(!store.contains(TOKEN_ENTRY));
        assert!(!store.contains(IDENTITY_ENTRY));
    }

    #[test]
    fn test_invalidate_drops_identity_only() {
        let (_dir, store, mut session) = fixture();
        store.put(TOKEN_ENTRY, &"tok".to_string()).unwrap();
        store
            .put(
                IDENTITY_ENTRY,
                &Identity {
                    email: "a@b.com".into(),
                },
            )
            .unwrap();
        session.restore();

        session.invalidate();
        assert!(!session.is_logged_in());
        assert_eq!(session.state(), AuthState::Anonymous);
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            AuthError::from_api(ApiError::Unauthorized),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_api(ApiError::Rejected(SERVER_INVALID_CREDENTIALS.into())),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_api(ApiError::Rejected(SERVER_DUPLICATE_ACCOUNT.into())),
            AuthError::DuplicateAccount
        ));
        assert!(matches!(
            AuthError::from_api(ApiError::Rejected("dados inválidos".into())),
            AuthError::Rejected(msg) if msg == "dados inválidos"
        ));
    }
}
