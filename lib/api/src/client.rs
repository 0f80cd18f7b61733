//! JSON calls over the transport pipeline.

use crate::authenticator::{Notifier, RequestAuthenticator};
use crate::config::ApiConfig;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use client_balance_core::ApiError;
use client_balance_error_mapping::ErrorMapper;
use client_balance_platform_access::{Navigator, Session};
use rootcause::prelude::Report;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Client for the balance API.
///
/// Non-success responses become [`ApiError::Status`] carrying the server's
/// message. Cloning is cheap.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Creates a client over any transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Builds the standard pipeline: reqwest, wrapped by the request
    /// authenticator bound to `session`.
    pub fn connect(
        config: &ApiConfig,
        session: Session,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        mapper: ErrorMapper,
    ) -> Result<Self, Report<ApiError>> {
        let transport = ReqwestTransport::new(config)?;
        let authenticator =
            RequestAuthenticator::new(transport, session, navigator, notifier, mapper)
                .notify_all_errors(config.notify_all_errors);
        Ok(Self::new(Arc::new(authenticator)))
    }

    /// Sends a request and fails on a non-success status.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.send(request).await?.error_for_status()
    }

    /// Sends a request and decodes the JSON response.
    pub async fn json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.json(HttpRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(HttpRequest::post(path).with_body(to_body(body)?))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(HttpRequest::put(path).with_body(to_body(body)?))
            .await
    }

    /// Sends a DELETE; any success status will do, the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::delete(path)).await.map(|_| ())
    }
}

/// Serializes a request body.
pub(crate) fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<JsonValue, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        reason: e.to_string(),
    })
}
