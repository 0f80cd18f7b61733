//! The session store: drives login, registration, logout and identity
//! fetches against an [`AuthBackend`] and records the outcome in the shared
//! [`Session`].

use crate::auth::{AuthBackend, LoginRequest, RegisterRequest};
use crate::config::{IdentitySource, SessionConfig};
use crate::error::SessionError;
use crate::route::Route;
use crate::session::{Session, SessionState};
use crate::token;
use crate::user::User;
use chrono::Utc;
use client_balance_core::ApiError;
use client_balance_error_mapping::ErrorMapper;
use rootcause::prelude::Report;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Owns the credential and identity lifecycle.
pub struct SessionStore<B> {
    session: Session,
    backend: Arc<B>,
    config: SessionConfig,
    mapper: ErrorMapper,
}

impl<B: AuthBackend + 'static> SessionStore<B> {
    /// Creates a store over an existing session handle.
    ///
    /// The handle is usually shared with the request pipeline so both see
    /// the same credential.
    #[must_use]
    pub fn new(
        session: Session,
        backend: Arc<B>,
        config: SessionConfig,
        mapper: ErrorMapper,
    ) -> Self {
        Self {
            session,
            backend,
            config,
            mapper,
        }
    }

    /// Returns the shared session handle.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Restores the session from a stored credential.
    ///
    /// With the token source the credential's claims become the identity.
    /// With the remote source the backend is asked. An expired or unusable
    /// credential is removed and `Ok(None)` is returned.
    #[instrument(skip(self), fields(source = %self.config.identity_source))]
    pub async fn initialize(&self) -> Result<Option<User>, Report<SessionError>> {
        let Some(credential) = self.session.credential() else {
            debug!("no stored credential");
            return Ok(None);
        };

        match self.config.identity_source {
            IdentitySource::Token => {
                match token::identity_from_token(&credential, Utc::now()) {
                    Ok(user) => {
                        let ticket = self.session.begin();
                        self.session.complete(ticket, None, user.clone())?;
                        debug!(user_id = %user.id(), "session restored from credential");
                        Ok(Some(user))
                    }
                    Err(e) => {
                        info!(error = %e, "discarding stored credential");
                        self.session.clear();
                        Ok(None)
                    }
                }
            }
            IdentitySource::Remote => {
                if token::is_expired_at(&credential, Utc::now()) {
                    info!("discarding expired credential");
                    self.session.clear();
                    return Ok(None);
                }
                self.fetch_identity().await
            }
        }
    }

    /// Re-fetches the identity from the backend.
    #[instrument(skip(self))]
    pub async fn refresh_identity(&self) -> Result<Option<User>, Report<SessionError>> {
        if self.session.credential().is_none() {
            return Err(SessionError::NotAuthenticated.into());
        }
        self.fetch_identity().await
    }

    /// Signs in with email and password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, Report<SessionError>> {
        let ticket = self.session.begin();
        let request = LoginRequest::new(email, password);

        match self.backend.login(&request).await {
            Ok(response) => {
                self.session
                    .complete(ticket, Some(&response.token), response.user.clone())?;
                info!(user_id = %response.user.id(), role = %response.user.role(), "signed in");
                Ok(response.user)
            }
            Err(cause) => Err(self.failure(ticket, cause)),
        }
    }

    /// Creates a user and signs in as it.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, Report<SessionError>> {
        let ticket = self.session.begin();

        match self.backend.register(request).await {
            Ok(response) => {
                self.session
                    .complete(ticket, Some(&response.token), response.user.clone())?;
                info!(user_id = %response.user.id(), "registered");
                Ok(response.user)
            }
            Err(cause) => Err(self.failure(ticket, cause)),
        }
    }

    /// Signs out locally, at once.
    ///
    /// When remote logout is enabled and a runtime is available, the
    /// backend is told in a background task whose outcome is ignored. The
    /// task handle is returned for callers that want to wait for it.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let credential = self.session.credential();
        self.session.clear();
        info!("signed out");

        let credential = credential?;
        if !self.config.remote_logout {
            return None;
        }
        let runtime = Handle::try_current().ok()?;
        let backend = Arc::clone(&self.backend);

        Some(runtime.spawn(async move {
            if let Err(e) = backend.logout(&credential).await {
                debug!(error = %e, "remote logout failed");
            }
        }))
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn current_identity(&self) -> Option<User> {
        self.session.current_identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.session.is_client()
    }

    #[must_use]
    pub fn default_redirect_target(&self) -> Route {
        self.session.default_redirect_target()
    }

    async fn fetch_identity(&self) -> Result<Option<User>, Report<SessionError>> {
        let ticket = self.session.begin();

        match self.backend.me().await {
            Ok(user) => {
                self.session.complete(ticket, None, user.clone())?;
                debug!(user_id = %user.id(), "identity fetched");
                Ok(Some(user))
            }
            Err(cause) if matches!(cause.status_code(), Some(401 | 403)) => {
                info!(status = ?cause.status_code(), "backend rejected stored credential");
                if self.session.is_current(ticket) {
                    self.session.clear();
                }
                Ok(None)
            }
            Err(cause) => Err(self.failure(ticket, cause)),
        }
    }

    fn failure(&self, ticket: u64, cause: ApiError) -> Report<SessionError> {
        let message = self.mapper.map_http_error(&cause);
        debug!(error = %cause, "session call failed");

        if !self.session.fail(ticket, message) {
            return SessionError::Superseded.into();
        }

        SessionError::AuthenticationFailed {
            message: message.to_string(),
            cause,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthResponse;
    use crate::credential::{CredentialSlot, MemoryCredentialSlot};
    use crate::role::Role;
    use crate::token::unsigned_token;
    use async_trait::async_trait;
    use chrono::Duration;
    use client_balance_core::UserId;
    use client_balance_error_mapping::Locale;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeBackend {
        auth: Mutex<VecDeque<Result<AuthResponse, ApiError>>>,
        me: Mutex<VecDeque<Result<User, ApiError>>>,
        gate: Option<Arc<Notify>>,
        logouts: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn with_auth(response: Result<AuthResponse, ApiError>) -> Self {
            let backend = Self::default();
            backend.auth.lock().push_back(response);
            backend
        }

        fn with_me(response: Result<User, ApiError>) -> Self {
            let backend = Self::default();
            backend.me.lock().push_back(response);
            backend
        }

        async fn next_auth(&self) -> Result<AuthResponse, ApiError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.auth.lock().pop_front().unwrap_or(Err(ApiError::Transport {
                reason: "no scripted response".to_string(),
            }))
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
            self.next_auth().await
        }

        async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
            self.next_auth().await
        }

        async fn me(&self) -> Result<User, ApiError> {
            self.me.lock().pop_front().unwrap_or(Err(ApiError::Timeout))
        }

        async fn logout(&self, credential: &str) -> Result<(), ApiError> {
            self.logouts.lock().push(credential.to_string());
            Ok(())
        }
    }

    fn client_user() -> User {
        User::new(UserId::new(1), "A", "a@b.com", Role::Client)
    }

    fn response(token: &str, user: User) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            token: token.to_string(),
            user,
        })
    }

    fn store_with(
        backend: FakeBackend,
        config: SessionConfig,
    ) -> (SessionStore<FakeBackend>, Arc<MemoryCredentialSlot>, Arc<FakeBackend>) {
        let slot = Arc::new(MemoryCredentialSlot::default());
        let backend = Arc::new(backend);
        let store = SessionStore::new(
            Session::new(slot.clone()),
            Arc::clone(&backend),
            config,
            ErrorMapper::new(Locale::En),
        );
        (store, slot, backend)
    }

    fn store(
        backend: FakeBackend,
    ) -> (SessionStore<FakeBackend>, Arc<MemoryCredentialSlot>, Arc<FakeBackend>) {
        store_with(backend, SessionConfig::default())
    }

    #[tokio::test]
    async fn login_with_opaque_token() {
        let (store, slot, _) = store(FakeBackend::with_auth(response("T", client_user())));

        let user = store.login("a@b.com", "secret").await.expect("login");

        assert_eq!(user.role(), Role::Client);
        assert_eq!(slot.load().expect("load").as_deref(), Some("T"));
        assert!(store.state().last_error.is_none());
        assert!(!store.state().loading);
        assert!(store.is_authenticated());
        assert!(store.is_client());
        assert_eq!(store.default_redirect_target(), Route::Accounts);
    }

    #[tokio::test]
    async fn failed_login_sets_last_error_and_keeps_session() {
        let (store, slot, _) = store(FakeBackend::with_auth(Err(ApiError::status(
            401,
            Some("Invalid email or password".to_string()),
        ))));
        slot.store("previous").expect("store");

        let err = store.login("a@b.com", "wrong").await.unwrap_err();

        assert!(err.to_string().contains("Invalid email or password"));
        let state = store.state();
        assert_eq!(
            state.last_error.as_deref(),
            Some("Invalid email or password. Check your credentials and try again.")
        );
        assert!(!state.loading);
        assert_eq!(slot.load().expect("load").as_deref(), Some("previous"));
    }

    #[tokio::test]
    async fn network_failure_is_an_error_not_a_panic() {
        let (store, _, _) = store(FakeBackend::with_auth(Err(ApiError::Transport {
            reason: "connection refused".to_string(),
        })));

        assert!(store.login("a@b.com", "secret").await.is_err());
        assert!(store.state().last_error.is_some());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn next_attempt_resets_last_error() {
        let backend = FakeBackend::with_auth(Err(ApiError::status(500, None)));
        backend.auth.lock().push_back(response("T", client_user()));
        let (store, _, _) = store(backend);

        assert!(store.login("a@b.com", "secret").await.is_err());
        assert!(store.state().last_error.is_some());

        store.login("a@b.com", "secret").await.expect("login");
        assert!(store.state().last_error.is_none());
    }

    #[tokio::test]
    async fn register_signs_in() {
        let admin = User::new(UserId::new(9), "Root", "root@b.com", Role::Admin);
        let (store, slot, _) = store(FakeBackend::with_auth(response("R", admin)));

        let request = RegisterRequest::new("Root", "root@b.com", "secret", Role::Admin);
        let user = store.register(&request).await.expect("register");

        assert!(user.is_admin());
        assert_eq!(slot.load().expect("load").as_deref(), Some("R"));
        assert_eq!(store.default_redirect_target(), Route::AdminUsers);
    }

    #[tokio::test]
    async fn logout_clears_and_notifies_backend() {
        let (store, slot, backend) = store(FakeBackend::with_auth(response("T", client_user())));
        store.login("a@b.com", "secret").await.expect("login");

        let remote = store.logout().expect("remote logout task");

        assert!(!store.is_authenticated());
        assert!(store.current_identity().is_none());
        assert_eq!(slot.load().expect("load"), None);

        remote.await.expect("join");
        assert_eq!(*backend.logouts.lock(), vec!["T".to_string()]);
    }

    #[tokio::test]
    async fn logout_without_remote_call() {
        let config = SessionConfig {
            remote_logout: false,
            ..SessionConfig::default()
        };
        let (store, _, backend) =
            store_with(FakeBackend::with_auth(response("T", client_user())), config);
        store.login("a@b.com", "secret").await.expect("login");

        assert!(store.logout().is_none());
        assert!(backend.logouts.lock().is_empty());
    }

    #[tokio::test]
    async fn login_resolving_after_logout_is_discarded() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend {
            gate: Some(Arc::clone(&gate)),
            ..FakeBackend::with_auth(response("T", client_user()))
        };
        let (store, slot, _) = store(backend);
        let mut state = store.subscribe();

        let (result, ()) = tokio::join!(store.login("a@b.com", "secret"), async {
            state
                .wait_for(|s| s.loading)
                .await
                .expect("session state channel open");
            store.logout();
            gate.notify_one();
        });

        let err = result.unwrap_err();
        assert!(err.to_string().contains("superseded"));
        assert_eq!(slot.load().expect("load"), None);
        assert!(store.current_identity().is_none());
        assert!(!store.is_authenticated());
        assert!(!store.state().loading);
    }

    #[tokio::test]
    async fn initialize_from_token_claims() {
        let (store, slot, _) = store(FakeBackend::default());
        let token = unsigned_token(&json!({
            "id": 3,
            "name": "Ana",
            "email": "ana@b.com",
            "role": "admin",
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        }));
        slot.store(&token).expect("store");

        let user = store.initialize().await.expect("initialize").expect("identity");

        assert_eq!(user.id(), UserId::new(3));
        assert!(store.is_admin());
        assert!(!store.state().loading);
    }

    #[tokio::test]
    async fn initialize_discards_expired_token() {
        let (store, slot, _) = store(FakeBackend::default());
        let token = unsigned_token(&json!({
            "id": 3,
            "email": "ana@b.com",
            "exp": (Utc::now() - Duration::hours(1)).timestamp(),
        }));
        slot.store(&token).expect("store");

        assert!(store.initialize().await.expect("initialize").is_none());
        assert_eq!(slot.load().expect("load"), None);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn initialize_discards_opaque_token_with_token_source() {
        let (store, slot, _) = store(FakeBackend::default());
        slot.store("T").expect("store");

        assert!(store.initialize().await.expect("initialize").is_none());
        assert_eq!(slot.load().expect("load"), None);
    }

    #[tokio::test]
    async fn initialize_from_remote_identity() {
        let config = SessionConfig {
            identity_source: IdentitySource::Remote,
            ..SessionConfig::default()
        };
        let (store, slot, _) = store_with(FakeBackend::with_me(Ok(client_user())), config);
        slot.store("T").expect("store");

        let user = store.initialize().await.expect("initialize").expect("identity");

        assert_eq!(user.email(), "a@b.com");
        assert!(store.is_authenticated());
        assert_eq!(slot.load().expect("load").as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn remote_rejection_logs_out() {
        let config = SessionConfig {
            identity_source: IdentitySource::Remote,
            ..SessionConfig::default()
        };
        let (store, slot, _) =
            store_with(FakeBackend::with_me(Err(ApiError::status(401, None))), config);
        slot.store("T").expect("store");

        assert!(store.initialize().await.expect("initialize").is_none());
        assert_eq!(slot.load().expect("load"), None);
    }

    #[tokio::test]
    async fn remote_outage_keeps_credential() {
        let config = SessionConfig {
            identity_source: IdentitySource::Remote,
            ..SessionConfig::default()
        };
        let (store, slot, _) =
            store_with(FakeBackend::with_me(Err(ApiError::status(503, None))), config);
        slot.store("T").expect("store");

        assert!(store.initialize().await.is_err());
        assert_eq!(slot.load().expect("load").as_deref(), Some("T"));
        assert!(!store.is_authenticated());
        assert_eq!(
            store.state().last_error.as_deref(),
            Some("Service temporarily unavailable. Try again later.")
        );
    }

    #[tokio::test]
    async fn refresh_requires_credential() {
        let (store, _, _) = store(FakeBackend::default());
        let err = store.refresh_identity().await.unwrap_err();
        assert!(err.to_string().contains("not authenticated"));
    }
}
