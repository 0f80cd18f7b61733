//! The shared session handle.
//!
//! A [`Session`] owns the credential slot and the observable
//! [`SessionState`]. It is cheap to clone; the session store and the request
//! authenticator hold clones of the same handle. It is the only code that
//! writes the credential slot.
//!
//! Every login, register, identity fetch and logout advances a generation
//! counter. A call that started under an older generation is discarded when
//! it resolves, so a slow login can never bring back a session that was
//! logged out in the meantime.

use crate::credential::CredentialSlot;
use crate::error::SessionError;
use crate::role::Role;
use crate::route::Route;
use crate::token;
use crate::user::User;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Who is signed in.
    pub identity: Option<User>,
    /// True while a login, register or identity fetch is pending.
    pub loading: bool,
    /// Normalized message of the last failed attempt.
    pub last_error: Option<String>,
}

/// Handle to the process-wide session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    slot: Arc<dyn CredentialSlot>,
    state: watch::Sender<SessionState>,
    generation: Mutex<u64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.inner.slot.key())
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates an empty session over `slot`. Nothing is read from the slot
    /// until the store initializes.
    #[must_use]
    pub fn new(slot: Arc<dyn CredentialSlot>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                slot,
                state,
                generation: Mutex::new(0),
            }),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Returns the stored credential. A slot that cannot be read counts as empty.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        match self.inner.slot.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read credential slot");
                None
            }
        }
    }

    /// Returns the in-memory identity. Never touches the network.
    #[must_use]
    pub fn current_identity(&self) -> Option<User> {
        self.inner.state.borrow().identity.clone()
    }

    /// True if an unexpired credential is stored and an identity is held.
    ///
    /// Finding an expired credential logs the session out.
    pub fn is_authenticated(&self) -> bool {
        let Some(credential) = self.credential() else {
            return false;
        };

        if token::is_expired_at(&credential, Utc::now()) {
            tracing::info!("stored credential expired");
            self.clear();
            return false;
        }

        self.inner.state.borrow().identity.is_some()
    }

    /// Role of the held identity.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.inner.state.borrow().identity.as_ref().map(User::role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.role() == Some(Role::Client)
    }

    /// Where a signed-in user lands by default.
    #[must_use]
    pub fn default_redirect_target(&self) -> Route {
        Route::default_for(self.role())
    }

    /// Ends the session because the backend rejected the credential.
    pub fn expire(&self) {
        tracing::info!("session expired by the backend");
        self.clear();
    }

    /// Removes the credential and identity and clears the last error.
    ///
    /// Any call still in flight is superseded.
    pub fn clear(&self) {
        let mut generation = self.inner.generation.lock();
        *generation += 1;

        if let Err(e) = self.inner.slot.clear() {
            tracing::warn!(error = %e, "failed to clear credential slot");
        }

        self.inner.state.send_modify(|state| {
            state.identity = None;
            state.loading = false;
            state.last_error = None;
        });
    }

    /// Starts a tracked call: marks the session loading and returns its ticket.
    pub(crate) fn begin(&self) -> u64 {
        let mut generation = self.inner.generation.lock();
        *generation += 1;

        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.last_error = None;
        });

        *generation
    }

    /// True if no other call started or logout happened since `ticket`.
    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        *self.inner.generation.lock() == ticket
    }

    /// Finishes a tracked call successfully.
    ///
    /// Stores `credential` when given and installs `identity`. A stale
    /// ticket changes nothing and yields [`SessionError::Superseded`].
    pub(crate) fn complete(
        &self,
        ticket: u64,
        credential: Option<&str>,
        identity: User,
    ) -> Result<(), SessionError> {
        let generation = self.inner.generation.lock();
        if *generation != ticket {
            tracing::debug!(ticket, current = *generation, "discarding stale session result");
            return Err(SessionError::Superseded);
        }

        if let Some(credential) = credential
            && let Err(e) = self.inner.slot.store(credential)
        {
            let reason = e.to_string();
            self.inner.state.send_modify(|state| {
                state.loading = false;
                state.last_error = Some(reason.clone());
            });
            return Err(SessionError::Storage { reason });
        }

        self.inner.state.send_modify(|state| {
            state.identity = Some(identity);
            state.loading = false;
            state.last_error = None;
        });
        Ok(())
    }

    /// Finishes a tracked call with a failure message.
    ///
    /// Credential and identity are left as they are. Returns false if the
    /// ticket was stale and nothing was recorded.
    pub(crate) fn fail(&self, ticket: u64, message: &str) -> bool {
        let generation = self.inner.generation.lock();
        if *generation != ticket {
            return false;
        }

        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.last_error = Some(message.to_string());
        });
        true
    }
}
