//! Credential attachment and reaction to authorization failures.
//!
//! [`RequestAuthenticator`] wraps another transport. Before a request goes
//! out it adds the `Authorization` header; when the response comes back it
//! reacts to 401, 403 and 429. The response itself is always handed back
//! unchanged, so callers still see the failure.

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, RequestAuth};
use async_trait::async_trait;
use client_balance_core::ApiError;
use client_balance_error_mapping::{ErrorMapper, UserMessage};
use client_balance_platform_access::{Navigator, Route, Session};
use std::sync::Arc;

/// Kind of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    SessionExpired,
    AccessDenied,
    RateLimited,
    Error,
}

/// A message for the user, already rendered in the configured locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Shows notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(kind = ?notice.kind, "{}", notice.message);
    }
}

/// Transport stage that authenticates requests against the session.
pub struct RequestAuthenticator<T> {
    inner: T,
    session: Session,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    mapper: ErrorMapper,
    notify_all_errors: bool,
}

impl<T: HttpTransport> RequestAuthenticator<T> {
    #[must_use]
    pub fn new(
        inner: T,
        session: Session,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        mapper: ErrorMapper,
    ) -> Self {
        Self {
            inner,
            session,
            navigator,
            notifier,
            mapper,
            notify_all_errors: false,
        }
    }

    /// Also notify the normalized message for other error statuses.
    #[must_use]
    pub fn notify_all_errors(mut self, enabled: bool) -> Self {
        self.notify_all_errors = enabled;
        self
    }

    fn authorize(&self, request: &mut HttpRequest) {
        if request.authorization.is_some() {
            return;
        }
        request.authorization = match &request.auth {
            RequestAuth::Session => self
                .session
                .credential()
                .map(|credential| format!("Bearer {credential}")),
            RequestAuth::Bearer(credential) => Some(format!("Bearer {credential}")),
            RequestAuth::Anonymous => None,
        };
    }

    fn notify(&self, kind: NoticeKind, message: UserMessage) {
        self.notifier.notify(Notice {
            kind,
            message: self.mapper.render(message).to_string(),
        });
    }

    fn react(&self, response: &HttpResponse, session_auth: bool) {
        match response.status {
            401 if session_auth => {
                tracing::info!("credential rejected; ending session");
                self.session.expire();
                self.navigator.navigate(Route::Login);
                self.notify(NoticeKind::SessionExpired, UserMessage::SessionExpired);
            }
            403 => self.notify(NoticeKind::AccessDenied, UserMessage::AccessDenied),
            429 => self.notify(NoticeKind::RateLimited, UserMessage::TooManyRequests),
            status if status >= 400 && self.notify_all_errors => {
                let message = response.error_message();
                self.notifier.notify(Notice {
                    kind: NoticeKind::Error,
                    message: self
                        .mapper
                        .map_by_status_code(status, message.as_deref())
                        .to_string(),
                });
            }
            _ => {}
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for RequestAuthenticator<T> {
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.authorize(&mut request);
        let session_auth = request.auth == RequestAuth::Session;

        let response = self.inner.send(request).await?;
        self.react(&response, session_auth);
        Ok(response)
    }
}
