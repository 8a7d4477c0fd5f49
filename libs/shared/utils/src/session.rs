use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::auth::{CurrentUser, Credential};

use crate::jwt::{current_user_from_token, TokenError};

/// Read side of the session, as seen by pages that need a credential.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;

    fn is_initializing(&self) -> bool;

    /// Resolves once the provider has finished its own initialization.
    async fn wait_initialized(&self);
}

#[derive(Default)]
struct SessionState {
    credential: Option<Credential>,
    user: Option<CurrentUser>,
}

impl SessionState {
    fn is_expired(&self) -> bool {
        self.user
            .as_ref()
            .and_then(|user| user.expires_at)
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

struct SessionInner {
    token_file: PathBuf,
    state: RwLock<SessionState>,
    initialized: watch::Sender<bool>,
}

/// Process-wide session: the bearer credential and the user it belongs to.
///
/// Starts out initializing; `init` loads the persisted credential and marks
/// the session ready. `login` and `logout` keep the token file in sync.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl SessionContext {
    pub fn new(token_file: impl Into<PathBuf>) -> Self {
        let (initialized, _) = watch::channel(false);
        Self {
            inner: Arc::new(SessionInner {
                token_file: token_file.into(),
                state: RwLock::new(SessionState::default()),
                initialized,
            }),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.token_file.clone())
    }

    pub fn token_file(&self) -> &Path {
        &self.inner.token_file
    }

    /// Loads the persisted credential, if any, and finishes initialization.
    ///
    /// A missing, empty or expired token leaves the session signed out.
    /// Initialization completes even when reading the file fails.
    pub async fn init(&self) -> Result<()> {
        let result = self.restore().await;
        self.inner.initialized.send_replace(true);
        result
    }

    async fn restore(&self) -> Result<()> {
        let Some(token) = self.read_token_file().await? else {
            debug!("No persisted token found");
            return Ok(());
        };

        match current_user_from_token(&token) {
            Ok(user) => {
                info!("Restored session for {}", user.username);
                self.install(Credential::new(token), Some(user));
                Ok(())
            }
            Err(TokenError::Expired) => {
                warn!("Persisted token has expired, discarding it");
                self.remove_token_file().await
            }
            Err(e) => {
                debug!("Persisted token has no readable claims: {}", e);
                self.install(Credential::new(token), None);
                Ok(())
            }
        }
    }

    /// `None` once the token's `exp` has passed, even mid-session.
    pub fn credential(&self) -> Option<Credential> {
        self.live_state(|state| state.credential.clone())
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.live_state(|state| state.user.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.credential().is_some()
    }

    pub fn is_initializing(&self) -> bool {
        !*self.inner.initialized.borrow()
    }

    pub async fn wait_initialized(&self) {
        let mut rx = self.inner.initialized.subscribe();
        // The sender lives as long as `self`, so this only returns once ready.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Installs a freshly issued token and persists it.
    pub async fn login(&self, token: &str) -> Result<Option<CurrentUser>> {
        let user = match current_user_from_token(token) {
            Ok(user) => Some(user),
            Err(TokenError::Expired) => anyhow::bail!("the issued token has already expired"),
            Err(e) => {
                debug!("Issued token has no readable claims: {}", e);
                None
            }
        };

        self.write_token_file(token).await?;
        self.install(Credential::new(token), user.clone());
        self.inner.initialized.send_replace(true);

        Ok(user)
    }

    /// Clears the credential and deletes the token file.
    pub async fn logout(&self) -> Result<()> {
        if let Ok(mut state) = self.inner.state.write() {
            *state = SessionState::default();
        }
        self.remove_token_file().await
    }

    fn install(&self, credential: Credential, user: Option<CurrentUser>) {
        if let Ok(mut state) = self.inner.state.write() {
            state.credential = Some(credential);
            state.user = user;
        }
    }

    fn read_state<T>(&self, f: impl FnOnce(&SessionState) -> Option<T>) -> Option<T> {
        self.inner.state.read().ok().and_then(|state| f(&state))
    }

    fn live_state<T>(&self, f: impl FnOnce(&SessionState) -> Option<T>) -> Option<T> {
        if self.read_state(|state| Some(state.is_expired())).unwrap_or(false) {
            self.expire();
            return None;
        }
        self.read_state(f)
    }

    /// Drops an expired credential from memory. The token file is discarded
    /// by the next `init`, which rejects expired tokens.
    fn expire(&self) {
        if let Ok(mut state) = self.inner.state.write() {
            if state.is_expired() {
                warn!("Session token has expired, signing out");
                *state = SessionState::default();
            }
        }
    }

    async fn read_token_file(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.inner.token_file).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read token file {}", self.inner.token_file.display())
            }),
        }
    }

    async fn write_token_file(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.inner.token_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        tokio::fs::write(&self.inner.token_file, token)
            .await
            .with_context(|| {
                format!("failed to write token file {}", self.inner.token_file.display())
            })
    }

    async fn remove_token_file(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.inner.token_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to remove token file {}", self.inner.token_file.display())
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for SessionContext {
    fn credential(&self) -> Option<Credential> {
        SessionContext::credential(self)
    }

    fn is_initializing(&self) -> bool {
        SessionContext::is_initializing(self)
    }

    async fn wait_initialized(&self) {
        SessionContext::wait_initialized(self).await
    }
}

/// Identity backed by one explicit credential, for requests that carry their own bearer token.
#[derive(Clone)]
pub struct StaticIdentity {
    credential: Credential,
}

impl StaticIdentity {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn credential(&self) -> Option<Credential> {
        Some(self.credential.clone())
    }

    fn is_initializing(&self) -> bool {
        false
    }

    async fn wait_initialized(&self) {}
}
