//! Application state for the passkeep TUI.
//!
//! `App` owns the core components (session store, item service, history
//! cache) and the per-screen input state. Every network operation is
//! awaited inline from the input handler, so within one key press the
//! issued operations run in written order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use passkeep_core::{
    generator, ApiClient, Config, CredentialStore, HistoryCache, HistoryEntry, ItemError,
    ItemService, SavedItem, SessionStore, Store,
};

/// How long a toast stays on screen.
const TOAST_SECS: u64 = 4;

/// Screens the TUI can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Generator,
    Vault,
    History,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Sign in",
            Screen::Register => "Create account",
            Screen::Generator => "Generator",
            Screen::Vault => "Vault",
            Screen::History => "History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

#[derive(Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: usize,
}

pub const LOGIN_FIELDS: usize = 2;

#[derive(Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub birth_date: String,
    pub password: String,
    pub confirm: String,
    pub focus: usize,
}

pub const REGISTER_FIELDS: usize = 5;

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub items: ItemService,
    pub history: HistoryCache,

    pub screen: Screen,
    pub login: LoginForm,
    pub register: RegisterForm,
    /// Item name being typed in the save dialog; `Some` means it is open.
    pub save_name: Option<String>,

    pub generated: Option<String>,
    pub vault: Vec<SavedItem>,
    pub vault_selected: usize,
    pub history_entries: Vec<HistoryEntry>,

    pub toast: Option<Toast>,
    pub should_quit: bool,
}

impl App {
    /// Build the app and restore any persisted session before the first
    /// frame, so the initial screen decision is made on settled state.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let store = Arc::new(Store::open_default()?);
        let client = ApiClient::new(config.base_url(), store.clone())?;
        info!(base_url = client.base_url(), "API client ready");

        let mut session = SessionStore::new(store.clone(), client.clone());
        let items = ItemService::new(client);
        let history = HistoryCache::new(store);

        session.restore();
        let screen = if session.is_logged_in() {
            Screen::Generator
        } else {
            Screen::Login
        };

        let mut login = LoginForm::default();
        if let Some(email) = config.last_email.clone() {
            if let Ok(password) = CredentialStore::get_password(&email) {
                login.password = password;
            }
            login.email = email;
        }

        let history_entries = history.load();

        Ok(Self {
            config,
            session,
            items,
            history,
            screen,
            login,
            register: RegisterForm::default(),
            save_name: None,
            generated: None,
            vault: Vec::new(),
            vault_selected: 0,
            history_entries,
            toast: None,
            should_quit: false,
        })
    }

    // ===== Toasts =====

    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Expire stale toasts. Called once per event-loop turn.
    pub fn tick(&mut self) {
        if let Some(toast) = &self.toast {
            if toast.shown_at.elapsed() > Duration::from_secs(TOAST_SECS) {
                self.toast = None;
            }
        }
    }

    // ===== Session operations =====

    pub async fn submit_login(&mut self) {
        let email = self.login.email.trim().to_string();
        if email.is_empty() {
            self.toast(ToastKind::Error, "Please enter your email.");
            return;
        }
        if self.login.password.trim().is_empty() {
            self.toast(ToastKind::Error, "Please enter your password.");
            return;
        }

        let password = self.login.password.clone();
        match self.session.login(&email, &password).await {
            Ok(()) => {
                self.remember_login(&email, &password);
                self.toast(ToastKind::Success, "Signed in.");
                self.screen = Screen::Generator;
            }
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    fn remember_login(&mut self, email: &str, password: &str) {
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        if let Err(e) = CredentialStore::store(email, password) {
            debug!(error = %e, "Keychain unavailable, not storing credentials");
        }
    }

    pub async fn submit_register(&mut self) {
        let Some(birth) = parse_birth_date(&self.register.birth_date) else {
            self.toast(ToastKind::Error, "Birth date must be DD/MM/YYYY.");
            return;
        };

        let result = self
            .session
            .register(
                &self.register.name,
                &self.register.email,
                birth,
                &self.register.password,
                &self.register.confirm,
            )
            .await;

        match result {
            Ok(()) => {
                self.login.email = self.register.email.trim().to_string();
                self.login.password.clear();
                self.register = RegisterForm::default();
                self.screen = Screen::Login;
                self.toast(ToastKind::Success, "Account created. Sign in to continue.");
            }
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    pub fn logout(&mut self) {
        if let Some(identity) = self.session.identity() {
            let _ = CredentialStore::delete(&identity.email);
        }
        if !self.session.logout() {
            warn!("Persisted session only partially cleared");
        }
        self.login.password.clear();
        self.vault.clear();
        self.generated = None;
        self.screen = Screen::Login;
        self.toast(ToastKind::Info, "Signed out.");
    }

    /// Route a session-expired failure: complete the in-memory
    /// Authenticated -> Anonymous transition (storage was already cleared
    /// by the API client) and bounce to the login screen, pre-filled from
    /// the keychain so re-authentication is one key press away.
    fn handle_session_expired(&mut self, message: String) {
        self.session.invalidate();
        self.vault.clear();
        if let Some(email) = self.config.last_email.clone() {
            if let Ok(password) = CredentialStore::get_password(&email) {
                self.login.password = password;
            }
            self.login.email = email;
        }
        self.screen = Screen::Login;
        self.toast(ToastKind::Error, message);
    }

    // ===== Generator =====

    pub fn generate(&mut self) {
        let value = generator::generate();
        match self.history.record(&value) {
            Ok(entries) => self.history_entries = entries,
            Err(e) => {
                warn!(error = %e, "Failed to record generated password");
                self.toast(ToastKind::Error, "Could not record the password locally.");
            }
        }
        self.generated = Some(value);
    }

    pub fn open_save_dialog(&mut self) {
        if self.generated.is_none() {
            self.toast(ToastKind::Info, "Generate a password first.");
            return;
        }
        self.save_name = Some(String::new());
    }

    pub async fn submit_save(&mut self) {
        let (Some(name), Some(secret)) = (self.save_name.take(), self.generated.clone()) else {
            return;
        };
        match self.items.create(&name, &secret).await {
            Ok(item) => {
                self.toast(ToastKind::Success, format!("Saved \"{}\".", item.name));
                self.refresh_vault().await;
            }
            Err(e @ ItemError::SessionExpired) => self.handle_session_expired(e.to_string()),
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    // ===== Vault =====

    /// Explicit refresh entry point; invoked on entering the vault and
    /// after every mutation. The local copy is never assumed fresh.
    pub async fn refresh_vault(&mut self) {
        match self.items.list().await {
            Ok(items) => {
                self.vault = items;
                if self.vault_selected >= self.vault.len() {
                    self.vault_selected = self.vault.len().saturating_sub(1);
                }
            }
            Err(e @ ItemError::SessionExpired) => self.handle_session_expired(e.to_string()),
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    pub async fn delete_selected(&mut self) {
        let Some(item) = self.vault.get(self.vault_selected) else {
            return;
        };
        let id = item.id;
        match self.items.delete(id).await {
            Ok(()) => {
                self.toast(ToastKind::Success, "Item deleted.");
                self.refresh_vault().await;
            }
            Err(e @ ItemError::SessionExpired) => self.handle_session_expired(e.to_string()),
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    pub fn select_previous(&mut self) {
        self.vault_selected = self.vault_selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if !self.vault.is_empty() && self.vault_selected < self.vault.len() - 1 {
            self.vault_selected += 1;
        }
    }

    // ===== History =====

    pub fn clear_history(&mut self) {
        match self.history.clear() {
            Ok(()) => {
                self.history_entries.clear();
                self.toast(ToastKind::Info, "History cleared.");
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear history");
                self.toast(ToastKind::Error, "Could not clear the history.");
            }
        }
    }
}

/// Parse a DD/MM/YYYY birth date as typed in the register form.
pub fn parse_birth_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%d/%m/%Y").ok()
}
