//! services/client/src/store/auth.rs
//!
//! The auth half of the session state store. Owns `AuthState` and keeps the
//! gateway's bearer header and the credential store in step with it.

use crate::store::{skip, surface, AuthError, Outcome, Route, StateError, StoreResult};
use lingua_core::domain::{AuthState, CredentialRecord, NoticeLevel, User};
use lingua_core::ports::{CredentialStore, LearningBackend, Notifier};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of checking the installed token against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// The backend rejected the token; local auth state has been reset.
    Expired,
}

pub struct AuthStore {
    backend: Arc<dyn LearningBackend>,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    state: AuthState,
}

impl AuthStore {
    /// Rebuilds auth state from the persisted credentials. Makes no network call.
    ///
    /// A persisted token installs the bearer header and marks the store
    /// authenticated. The saved username, if any, only fills in the display
    /// identity and is ignored when there is no token.
    pub fn rehydrate(
        backend: Arc<dyn LearningBackend>,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let record = credentials.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read saved credentials; starting logged out");
            CredentialRecord::default()
        });

        let state = match record.token.filter(|t| !t.is_empty()) {
            Some(token) => match backend.set_bearer_token(Some(&token)) {
                Ok(()) => {
                    info!(username = ?record.username, "restored saved login");
                    AuthState::authenticated(record.username)
                }
                Err(e) => {
                    warn!(error = %e, "saved token is unusable; starting logged out");
                    AuthState::default()
                }
            },
            None => AuthState::default(),
        };

        Self {
            backend,
            credentials,
            notifier,
            state,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    /// Exchanges credentials for a token and becomes authenticated.
    pub async fn login(&mut self, username: &str, password: &str) -> StoreResult<Route> {
        match self.try_login(username, password).await {
            Ok(()) => {
                info!(username, "logged in");
                self.notifier
                    .notify(NoticeLevel::Success, "Logged in successfully");
                Ok(Route::Chat)
            }
            Err(e) => Err(surface(self.notifier.as_ref(), "login", "Login failed", e)),
        }
    }

    async fn try_login(&mut self, username: &str, password: &str) -> StoreResult<()> {
        let token = self
            .backend
            .login(username, password)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        // Both the header and the saved token must be in place before the
        // state flips; a failed save takes the header back out.
        self.backend.set_bearer_token(Some(&token))?;
        if let Err(e) = self.credentials.save_token(&token) {
            self.clear_header();
            return Err(e.into());
        }
        if let Err(e) = self.credentials.save_username(username) {
            warn!(error = %e, "could not save username");
        }

        self.state = AuthState::authenticated(Some(username.to_string()));
        Ok(())
    }

    /// Creates an account. Does not log in; the caller is sent to the login step.
    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> StoreResult<Route> {
        match self.backend.register(username, email, password).await {
            Ok(()) => {
                info!(username, "registered");
                self.notifier.notify(
                    NoticeLevel::Success,
                    "Registered successfully! Please log in.",
                );
                Ok(Route::Login)
            }
            Err(e) => Err(surface(
                self.notifier.as_ref(),
                "register",
                "Registration failed",
                e.into(),
            )),
        }
    }

    /// Drops the token locally. Never fails and never calls the backend.
    pub fn logout(&mut self) -> Route {
        self.reset();
        info!("logged out");
        self.notifier.notify(NoticeLevel::Info, "Logged out");
        Route::Login
    }

    /// Checks the installed token with the backend. A rejected token resets
    /// the store exactly as `logout` does.
    pub async fn verify(&mut self) -> StoreResult<Outcome<Verification>> {
        if !self.state.is_authenticated {
            return Ok(skip(self.notifier.as_ref(), StateError::NotAuthenticated));
        }

        match self.backend.verify_token().await {
            Ok(()) => Ok(Outcome::Done(Verification::Valid)),
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "saved token rejected by backend");
                self.reset();
                self.notifier.notify(
                    NoticeLevel::Warning,
                    "Session expired, please log in again",
                );
                Ok(Outcome::Done(Verification::Expired))
            }
            Err(e) => Err(surface(
                self.notifier.as_ref(),
                "verify",
                "Failed to verify session",
                e.into(),
            )),
        }
    }

    fn clear_header(&self) {
        if let Err(e) = self.backend.set_bearer_token(None) {
            warn!(error = %e, "could not clear the bearer header");
        }
    }

    fn reset(&mut self) {
        self.clear_header();
        if let Err(e) = self.credentials.clear_token() {
            warn!(error = %e, "could not clear saved token");
        }
        self.state = AuthState::default();
    }
}
