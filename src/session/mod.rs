//! Session State
//!
//! Holds who is logged in. A `Session` is created once, handed to the
//! `ApiClient`, and shared (it is cheap to clone) by every view that needs
//! to know the current user.
//!
//! ## Lifecycle
//!
//! 1. `Session::new` loads any persisted token; `loading` starts `true`
//! 2. The client's auth check resolves the token into a user (or clears it)
//! 3. Login/register store a fresh token; logout clears it

mod store;

pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::model::User;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the session layer
#[derive(Error, Debug)]
pub enum SessionError {
    /// I/O error on the token store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Token file could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// True until the startup auth check has resolved
    pub loading: bool,
}

/// Shared, explicitly passed authentication state
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    state: Arc<RwLock<AuthState>>,
}

impl Session {
    /// Create a session backed by `store`, picking up any persisted token
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load persisted token");
                None
            }
        };

        Self {
            store,
            state: Arc::new(RwLock::new(AuthState {
                token,
                loading: true,
                ..Default::default()
            })),
        }
    }

    /// Session with an in-memory store and no token
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Record a successful login/register: persist the token, set the user
    pub async fn establish(&self, token: &str, user: User) -> SessionResult<()> {
        self.store.save(token)?;

        let mut state = self.state.write().await;
        state.token = Some(token.to_string());
        state.user = Some(user);
        state.is_authenticated = true;
        state.loading = false;
        Ok(())
    }

    /// Resolve the startup check with the user the backend reported
    pub async fn confirm(&self, user: User) {
        let mut state = self.state.write().await;
        state.user = Some(user);
        state.is_authenticated = true;
        state.loading = false;
    }

    /// Swap in a rotated token, keeping the current user
    pub async fn replace_token(&self, token: &str) -> SessionResult<()> {
        self.store.save(token)?;
        self.state.write().await.token = Some(token.to_string());
        Ok(())
    }

    /// Replace the cached user after a profile update
    pub async fn set_user(&self, user: User) {
        self.state.write().await.user = Some(user);
    }

    /// Forget the token and the user
    pub async fn clear(&self) -> SessionResult<()> {
        {
            let mut state = self.state.write().await;
            *state = AuthState::default();
        }
        self.store.clear()
    }

    /// Mark the startup check as finished without changing anything else
    pub async fn finish_loading(&self) {
        self.state.write().await.loading = false;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
