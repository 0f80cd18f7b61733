//! HTTP access to the balance API.
//!
//! Requests flow through a small pipeline:
//!
//! ```text
//! ApiClient -> RequestAuthenticator -> ReqwestTransport -> network
//! ```
//!
//! The authenticator attaches the session credential and ends the session
//! when the server answers 401. On top of the client sit the REST backend
//! for the session store (`AuthApi`) and the account and user services.

pub mod accounts;
pub mod auth;
pub mod authenticator;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use accounts::{
    Account, AccountService, AccountState, AccountType, CreateAccountRequest, Transaction,
    TransactionKind, TransactionRequest,
};
pub use auth::AuthApi;
pub use authenticator::{Notice, NoticeKind, Notifier, RequestAuthenticator, TracingNotifier};
pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::ServiceError;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, RequestAuth, ReqwestTransport,
};
pub use users::{UserService, UserState, UserUpdate};
