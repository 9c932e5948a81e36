//! End-to-end flows against a mocked passkeep server.
//!
//! Session restore, login persistence, 401-driven invalidation, and the
//! item service's error mapping, exercised over real HTTP.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use passkeep_core::auth::session::{IDENTITY_ENTRY, TOKEN_ENTRY};
use passkeep_core::{
    ApiClient, AuthError, AuthState, Identity, ItemError, ItemService, SessionStore, Store,
};

struct TestEnv {
    _dir: tempfile::TempDir,
    store: Arc<Store>,
    server: MockServer,
    client: ApiClient,
}

async fn test_env() -> TestEnv {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(Store::open(dir.path().to_path_buf()).expect("open store"));
    let server = MockServer::start().await;
    let client = ApiClient::new(server.uri(), store.clone()).expect("client");
    TestEnv {
        _dir: dir,
        store,
        server,
        client,
    }
}

fn seed_session(store: &Store, token: &str, email: &str) {
    store.put(TOKEN_ENTRY, &token.to_string()).unwrap();
    store
        .put(
            IDENTITY_ENTRY,
            &Identity {
                email: email.to_string(),
            },
        )
        .unwrap();
}

/// Matches requests carrying no Authorization header at all.
struct NoAuthHeader;

impl Match for NoAuthHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[tokio::test]
async fn fresh_install_login_and_restart() {
    let env = test_env().await;

    // Fresh install: restore finds nothing.
    let mut session = SessionStore::new(env.store.clone(), env.client.clone());
    assert_eq!(session.state(), AuthState::Restoring);
    assert_eq!(session.restore(), AuthState::Anonymous);

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_json(json!({"email": "a@b.com", "senha": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "user": {"nome": "Ana", "email": "a@b.com"}
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    session.login("a@b.com", "secret1").await.unwrap();
    assert!(session.is_logged_in());
    assert!(env.store.contains(TOKEN_ENTRY));
    assert!(env.store.contains(IDENTITY_ENTRY));

    // Simulated process restart: a fresh store restores the same
    // identity without any further network traffic (the mock's
    // expect(1) is verified when the server drops).
    let mut restarted = SessionStore::new(env.store.clone(), env.client.clone());
    match restarted.restore() {
        AuthState::Authenticated(identity) => assert_eq!(identity.email, "a@b.com"),
        other => panic!("unexpected state: {:?}", other),
    }
}

#[tokio::test]
async fn login_failure_leaves_existing_session_alone() {
    let env = test_env().await;
    seed_session(&env.store, "tok-old", "a@b.com");

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "email ou senha inválidos"})),
        )
        .mount(&env.server)
        .await;

    let mut session = SessionStore::new(env.store.clone(), env.client.clone());
    session.restore();

    let result = session.login("a@b.com", "wrong").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    // A 401 from an auth endpoint is a login failure, not an expiry:
    // the persisted pair must survive.
    assert!(env.store.contains(TOKEN_ENTRY));
    assert!(env.store.contains(IDENTITY_ENTRY));
}

#[tokio::test]
async fn list_401_clears_session_and_restart_is_anonymous() {
    let env = test_env().await;
    seed_session(&env.store, "tok-1", "a@b.com");

    let mut session = SessionStore::new(env.store.clone(), env.client.clone());
    assert!(matches!(session.restore(), AuthState::Authenticated(_)));

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Usuário não autenticado"})),
        )
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    let result = items.list().await;
    match result {
        Err(ItemError::SessionExpired) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    // Both entries gone, regardless of which service issued the call.
    assert!(!env.store.contains(TOKEN_ENTRY));
    assert!(!env.store.contains(IDENTITY_ENTRY));

    session.invalidate();
    assert!(!session.is_logged_in());

    let mut restarted = SessionStore::new(env.store.clone(), env.client.clone());
    assert_eq!(restarted.restore(), AuthState::Anonymous);
}

#[tokio::test]
async fn list_204_is_empty_success() {
    let env = test_env().await;
    seed_session(&env.store, "tok-1", "a@b.com");

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    assert_eq!(items.list().await.unwrap(), Vec::new());
}

#[tokio::test]
async fn list_attaches_bearer_token() {
    let env = test_env().await;
    seed_session(&env.store, "tok-1", "a@b.com");

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "nome": "wifi", "senha": "s3cr3t", "userId": 3}
        ])))
        .expect(1)
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    let list = items.list().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "wifi");
    assert_eq!(list[0].secret, "s3cr3t");
}

#[tokio::test]
async fn no_token_means_no_authorization_header() {
    let env = test_env().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(NoAuthHeader)
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    items.list().await.unwrap();
}

#[tokio::test]
async fn create_trims_inputs_and_returns_item() {
    let env = test_env().await;
    seed_session(&env.store, "tok-1", "a@b.com");

    Mock::given(method("POST"))
        .and(path("/item"))
        .and(body_json(json!({"nome": "wifi", "senha": "s3cr3t"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9, "nome": "wifi", "senha": "s3cr3t", "userId": 3
        })))
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    let created = items.create("  wifi ", " s3cr3t  ").await.unwrap();
    assert_eq!(created.id, 9);
    assert_eq!(created.name, "wifi");
}

#[tokio::test]
async fn create_duplicate_maps_to_exact_user_message() {
    let env = test_env().await;
    seed_session(&env.store, "tok-1", "a@b.com");

    Mock::given(method("POST"))
        .and(path("/item"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "já existe um item com este nome"})),
        )
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    let err = items.create("wifi", "s3cr3t").await.unwrap_err();
    assert!(matches!(err, ItemError::DuplicateName));
    assert_eq!(err.to_string(), "An item with this name already exists.");
}

#[tokio::test]
async fn delete_403_maps_to_not_authorized() {
    let env = test_env().await;
    seed_session(&env.store, "tok-1", "a@b.com");

    Mock::given(method("DELETE"))
        .and(path("/item/7"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"error": "Você não tem acesso a este item"})),
        )
        .mount(&env.server)
        .await;

    let items = ItemService::new(env.client.clone());
    let err = items.delete(7).await.unwrap_err();
    assert!(matches!(err, ItemError::NotAuthorized));
    assert_eq!(err.to_string(), "You do not have access to this item.");
}

#[tokio::test]
async fn register_success_does_not_log_in() {
    let env = test_env().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "nome": "Ana",
            "email": "ana@b.com",
            "dataNascimento": "1990-04-02",
            "senha": "secret1",
            "confirmacaoSenha": "secret1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "nome": "Ana", "email": "ana@b.com"
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let mut session = SessionStore::new(env.store.clone(), env.client.clone());
    session.restore();

    let birth = chrono::NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();
    session
        .register("Ana", "ana@b.com", birth, "secret1", "secret1")
        .await
        .unwrap();

    assert!(!session.is_logged_in());
    assert!(!env.store.contains(TOKEN_ENTRY));
    assert!(!env.store.contains(IDENTITY_ENTRY));
}

#[tokio::test]
async fn register_duplicate_account_is_classified() {
    let env = test_env().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "email já cadastrado"})),
        )
        .mount(&env.server)
        .await;

    let session = SessionStore::new(env.store.clone(), env.client.clone());
    let birth = chrono::NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();
    let result = session
        .register("Ana", "ana@b.com", birth, "secret1", "secret1")
        .await;

    assert!(matches!(result, Err(AuthError::DuplicateAccount)));
}

#[tokio::test]
async fn unreachable_server_classifies_as_network() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path().to_path_buf()).unwrap());
    // Nothing listens here; connection is refused immediately.
    let client = ApiClient::new("http://127.0.0.1:9", store.clone()).unwrap();

    let mut session = SessionStore::new(store.clone(), client.clone());
    session.restore();
    let result = session.login("a@b.com", "secret1").await;
    assert!(matches!(result, Err(AuthError::Network)));

    let items = ItemService::new(client);
    let result = items.list().await;
    assert!(matches!(result, Err(ItemError::Network)));
}
