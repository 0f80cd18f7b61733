//! The HTTP boundary.
//!
//! Requests and responses are plain data so pipeline stages can wrap a
//! transport without knowing about reqwest. A transport returns every
//! response the server sends, whatever its status; only failures to get a
//! response at all are errors here.

use crate::config::ApiConfig;
use async_trait::async_trait;
use client_balance_core::ApiError;
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// HTTP methods the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// Which credential a request carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestAuth {
    /// The stored session credential. A 401 ends the session.
    #[default]
    Session,
    /// An explicit credential. A 401 is passed through.
    Bearer(String),
    /// No credential. Used for login and registration.
    Anonymous,
}

/// An outgoing request. `path` is relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<JsonValue>,
    pub auth: RequestAuth,
    /// Value of the `Authorization` header, once a stage has set it.
    pub authorization: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            auth: RequestAuth::Session,
            authorization: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: RequestAuth) -> Self {
        self.auth = auth;
        self
    }
}

/// A response as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable error text: the JSON `message` field, else a string
    /// `error` field, else the raw body.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let body = self.body.trim();
        if body.is_empty() {
            return None;
        }

        if let Ok(JsonValue::Object(fields)) = serde_json::from_str::<JsonValue>(body) {
            for key in ["message", "error"] {
                if let Some(JsonValue::String(text)) = fields.get(key)
                    && !text.trim().is_empty()
                {
                    return Some(text.clone());
                }
            }
        }

        Some(body.to_string())
    }

    /// Turns a non-success response into [`ApiError::Status`].
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ApiError::status(self.status, self.error_message()))
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode {
            reason: e.to_string(),
        })
    }
}

/// Sends requests and returns responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request).await
    }
}

/// Transport over a reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the client with the configured timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, Report<ApiError>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport {
                reason: error_chain(&e),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };

        if let Some(authorization) = &request.authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, path = %request.path, "sending request");
        let response = builder.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_error)?;
        tracing::debug!(status, path = %request.path, "received response");

        Ok(HttpResponse { status, body })
    }
}

fn request_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Transport {
        reason: error_chain(&error),
    }
}

// reqwest's top-level message hides the cause ("connection refused" etc.)
// in the source chain.
fn error_chain(error: &dyn StdError) -> String {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}
