//! Mapping from raw failure signals to [`UserMessage`]s.
//!
//! Free-text messages are matched first, against an ordered pattern list
//! (first match wins). Only when no pattern applies is the HTTP status
//! consulted. Patterns overlap ("account not found" also contains "not
//! found"), so the specific ones come first.

use crate::locale::Locale;
use crate::message::UserMessage;
use client_balance_core::ApiError;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Ordered (pattern, message) pairs. Matching is case-insensitive.
const MESSAGE_PATTERNS: &[(&str, UserMessage)] = &[
    // Authentication
    (r"invalid email or password", UserMessage::InvalidEmailOrPassword),
    (r"invalid credentials", UserMessage::InvalidCredentials),
    (r"unauthorized", UserMessage::Unauthorized),
    (r"token expired", UserMessage::SessionExpired),
    (r"too many login attempts", UserMessage::TooManyLoginAttempts),
    (r"account locked", UserMessage::AccountLocked),
    // Balance
    (r"insufficient balance", UserMessage::InsufficientBalance),
    (r"insufficient funds", UserMessage::InsufficientFunds),
    (r"balance too low", UserMessage::BalanceTooLow),
    // Validation
    (r"validation failed", UserMessage::ValidationFailed),
    (r"invalid input", UserMessage::InvalidInput),
    (r"required field", UserMessage::RequiredField),
    (r"invalid format", UserMessage::InvalidFormat),
    (r"invalid amount", UserMessage::InvalidAmount),
    // Accounts
    (r"account not found", UserMessage::AccountNotFound),
    (r"account already exists", UserMessage::AccountAlreadyExists),
    (r"account inactive", UserMessage::AccountInactive),
    // Users
    (r"user not found", UserMessage::UserNotFound),
    (r"user already exists", UserMessage::UserAlreadyExists),
    (r"email already in use", UserMessage::EmailInUse),
    // Transactions
    (r"transaction failed", UserMessage::TransactionFailed),
    (r"transaction not found", UserMessage::TransactionNotFound),
    (r"transaction limit exceeded", UserMessage::TransactionLimitExceeded),
    // Network
    (r"network error", UserMessage::NetworkError),
    (r"timeout", UserMessage::Timeout),
    (r"connection refused", UserMessage::ConnectionRefused),
    // Server
    (r"internal server error", UserMessage::InternalServerError),
    (r"service unavailable", UserMessage::ServiceUnavailable),
    (r"bad gateway", UserMessage::BadGateway),
    // Permissions
    (r"forbidden", UserMessage::Forbidden),
    (r"access denied", UserMessage::AccessDenied),
    // Generic
    (r"not found", UserMessage::NotFound),
    (r"bad request", UserMessage::BadRequest),
];

static COMPILED_PATTERNS: LazyLock<Vec<(Regex, UserMessage)>> = LazyLock::new(|| {
    MESSAGE_PATTERNS
        .iter()
        .filter_map(|(pattern, message)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .ok()
                .map(|regex| (regex, *message))
        })
        .collect()
});

/// Normalizes failure signals into localized display strings.
///
/// The mapper holds no state besides its locale; every method is a pure
/// function of its arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorMapper {
    locale: Locale,
}

impl ErrorMapper {
    /// Creates a mapper rendering messages in `locale`.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Returns the locale messages are rendered in.
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Finds the first pattern matching a free-text message.
    #[must_use]
    pub fn classify_message(message: &str) -> Option<UserMessage> {
        COMPILED_PATTERNS
            .iter()
            .find(|(regex, _)| regex.is_match(message))
            .map(|(_, user_message)| *user_message)
    }

    /// Looks up the fixed message for an HTTP status code.
    #[must_use]
    pub fn classify_status(status: u16) -> Option<UserMessage> {
        let message = match status {
            400 => UserMessage::BadRequest,
            401 => UserMessage::SessionExpired,
            403 => UserMessage::Forbidden,
            404 => UserMessage::NotFound,
            409 => UserMessage::Conflict,
            422 => UserMessage::ValidationFailed,
            429 => UserMessage::TooManyRequests,
            500 => UserMessage::InternalServerError,
            502 => UserMessage::BadGateway,
            503 => UserMessage::ServiceUnavailable,
            504 => UserMessage::Timeout,
            _ => return None,
        };
        Some(message)
    }

    /// Classifies a failure from its optional status and optional message.
    ///
    /// Message patterns win over the status table. An unknown status maps
    /// to [`UserMessage::Unexpected`]; no signal at all maps to
    /// [`UserMessage::Unknown`]. Only an empty message counts as absent, so
    /// whitespace is an unrecognized message.
    #[must_use]
    pub fn classify(status: Option<u16>, message: Option<&str>) -> UserMessage {
        let message = message.filter(|m| !m.is_empty());

        if let Some(found) = message.and_then(Self::classify_message) {
            return found;
        }

        match status {
            Some(code) => Self::classify_status(code).unwrap_or(UserMessage::Unexpected),
            None if message.is_some() => UserMessage::Unexpected,
            None => UserMessage::Unknown,
        }
    }

    /// Classifies a failed API call.
    #[must_use]
    pub fn classify_error(error: &ApiError) -> UserMessage {
        match error {
            ApiError::Status { status, message } => {
                Self::classify(Some(*status), message.as_deref())
            }
            ApiError::Transport { reason } => {
                Self::classify_message(reason).unwrap_or(UserMessage::NetworkError)
            }
            ApiError::Timeout => UserMessage::Timeout,
            ApiError::Decode { .. } => UserMessage::Unexpected,
        }
    }

    /// Renders a message in this mapper's locale.
    #[must_use]
    pub fn render(&self, message: UserMessage) -> &'static str {
        message.text(self.locale)
    }

    /// Maps a free-text server message.
    ///
    /// An empty message yields the "unknown error" text; a message no
    /// pattern recognizes yields the "unexpected error" text.
    #[must_use]
    pub fn map_error_message(&self, message: &str) -> &'static str {
        self.render(Self::classify(None, Some(message)))
    }

    /// Maps a status code, trying the optional message first.
    #[must_use]
    pub fn map_by_status_code(&self, status: u16, message: Option<&str>) -> &'static str {
        self.render(Self::classify(Some(status), message))
    }

    /// Maps a failed API call.
    #[must_use]
    pub fn map_http_error(&self, error: &ApiError) -> &'static str {
        self.render(Self::classify_error(error))
    }

    /// Maps whatever signal is available.
    #[must_use]
    pub fn normalize(&self, status: Option<u16>, message: Option<&str>) -> &'static str {
        self.render(Self::classify(status, message))
    }
}
