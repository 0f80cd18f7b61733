//! REST implementation of the session store's backend.

use crate::client::{ApiClient, to_body};
use crate::transport::{HttpRequest, RequestAuth};
use async_trait::async_trait;
use client_balance_core::ApiError;
use client_balance_platform_access::{
    AuthBackend, AuthResponse, LoginRequest, RegisterRequest, User,
};

/// `/auth/*` endpoints.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthBackend for AuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let request = HttpRequest::post("/auth/login")
            .with_body(to_body(request)?)
            .with_auth(RequestAuth::Anonymous);
        self.client.json(request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let request = HttpRequest::post("/auth/register")
            .with_body(to_body(request)?)
            .with_auth(RequestAuth::Anonymous);
        self.client.json(request).await
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.client.get("/auth/me").await
    }

    async fn logout(&self, credential: &str) -> Result<(), ApiError> {
        let request = HttpRequest::post("/auth/logout")
            .with_auth(RequestAuth::Bearer(credential.to_string()));
        self.client.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::RequestAuthenticator;
    use crate::testing::{RecordingNavigator, RecordingNotifier, ScriptedTransport};
    use crate::transport::HttpResponse;
    use client_balance_error_mapping::{ErrorMapper, Locale};
    use client_balance_platform_access::{
        CredentialSlot, MemoryCredentialSlot, Role, Route, Session, SessionConfig, SessionStore,
    };
    use serde_json::json;
    use std::sync::Arc;

    struct Harness {
        store: SessionStore<AuthApi>,
        transport: Arc<ScriptedTransport>,
        slot: Arc<MemoryCredentialSlot>,
        navigator: Arc<RecordingNavigator>,
        client: ApiClient,
    }

    fn harness() -> Harness {
        let slot = Arc::new(MemoryCredentialSlot::default());
        let session = Session::new(slot.clone());
        let transport = Arc::new(ScriptedTransport::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let mapper = ErrorMapper::new(Locale::En);
        let authenticator = RequestAuthenticator::new(
            transport.clone(),
            session.clone(),
            navigator.clone(),
            Arc::new(RecordingNotifier::default()),
            mapper,
        );
        let client = ApiClient::new(Arc::new(authenticator));
        let store = SessionStore::new(
            session,
            Arc::new(AuthApi::new(client.clone())),
            SessionConfig::default(),
            mapper,
        );
        Harness {
            store,
            transport,
            slot,
            navigator,
            client,
        }
    }

    fn login_body() -> String {
        json!({
            "token": "T",
            "user": {"id": 1, "name": "A", "email": "a@b.com", "role": "client"}
        })
        .to_string()
    }

    #[tokio::test]
    async fn login_over_http() {
        let h = harness();
        h.transport.push(Ok(HttpResponse::new(200, login_body())));

        let user = h.store.login("a@b.com", "secret").await.expect("login");

        assert_eq!(user.role(), Role::Client);
        assert_eq!(h.slot.load().expect("load").as_deref(), Some("T"));
        assert!(h.store.state().last_error.is_none());

        let sent = h.transport.requests();
        assert_eq!(sent[0].path, "/auth/login");
        assert_eq!(sent[0].authorization, None);
        assert_eq!(
            sent[0].body,
            Some(json!({"email": "a@b.com", "password": "secret"}))
        );
    }

    #[tokio::test]
    async fn later_requests_carry_the_credential() {
        let h = harness();
        h.transport.push(Ok(HttpResponse::new(200, login_body())));
        h.transport.push(Ok(HttpResponse::new(200, "[]")));
        h.store.login("a@b.com", "secret").await.expect("login");

        let _: Vec<serde_json::Value> = h.client.get("/accounts").await.expect("accounts");

        assert_eq!(h.transport.requests()[1].authorization.as_deref(), Some("Bearer T"));
    }

    #[tokio::test]
    async fn unauthorized_response_ends_session_and_still_fails() {
        let h = harness();
        h.transport.push(Ok(HttpResponse::new(200, login_body())));
        h.transport.push(Ok(HttpResponse::new(401, r#"{"message":"Token expired"}"#)));
        h.store.login("a@b.com", "secret").await.expect("login");

        let err = h.client.get::<serde_json::Value>("/accounts").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(h.slot.load().expect("load"), None);
        assert!(!h.store.is_authenticated());
        assert_eq!(h.navigator.routes(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn wrong_password_keeps_existing_session() {
        let h = harness();
        h.transport.push(Ok(HttpResponse::new(200, login_body())));
        h.transport.push(Ok(HttpResponse::new(
            401,
            r#"{"message":"Invalid credentials"}"#,
        )));
        h.store.login("a@b.com", "secret").await.expect("login");

        assert!(h.store.login("a@b.com", "wrong").await.is_err());

        assert_eq!(h.slot.load().expect("load").as_deref(), Some("T"));
        assert!(h.navigator.routes().is_empty());
        assert_eq!(
            h.store.state().last_error.as_deref(),
            Some("Invalid credentials. Check your email and password.")
        );
    }

    #[tokio::test]
    async fn logout_sends_captured_credential() {
        let h = harness();
        h.transport.push(Ok(HttpResponse::new(200, login_body())));
        h.transport.push(Ok(HttpResponse::new(204, "")));
        h.store.login("a@b.com", "secret").await.expect("login");

        let remote = h.store.logout().expect("remote logout");
        remote.await.expect("join");

        let sent = h.transport.requests();
        assert_eq!(sent[1].path, "/auth/logout");
        assert_eq!(sent[1].authorization.as_deref(), Some("Bearer T"));
        assert_eq!(h.slot.load().expect("load"), None);
    }

    #[tokio::test]
    async fn me_uses_session_credential() {
        let h = harness();
        h.slot.store("T").expect("store");
        h.transport.push(Ok(HttpResponse::new(
            200,
            r#"{"id":5,"name":"Root","email":"root@b.com","role":"admin","status":"active"}"#,
        )));

        let api = AuthApi::new(h.client.clone());
        let user = api.me().await.expect("me");

        assert!(user.is_admin());
        assert_eq!(h.transport.requests()[0].authorization.as_deref(), Some("Bearer T"));
    }
}
