//! Strongly-typed ID types for domain entities.
//!
//! The balance API identifies every record with a positive integer. Wrapping
//! them keeps an account id from being passed where a user id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed ID wrapper around an integer key.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from the raw integer key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw integer key.
            #[must_use]
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Returns the prefix accepted when parsing.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let prefix_with_hash = concat!($prefix, "#");
                let raw = trimmed.strip_prefix(prefix_with_hash).unwrap_or(trimmed);

                let value = raw.parse::<i64>().map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    reason: e.to_string(),
                })?;
                if value <= 0 {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: format!("{value} is not a positive id"),
                    });
                }
                Ok(Self(value))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user.
    UserId,
    "user"
);

define_id!(
    /// Unique identifier for a balance account.
    AccountId,
    "account"
);

define_id!(
    /// Unique identifier for a deposit or withdrawal.
    TransactionId,
    "tx"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_number() {
        assert_eq!(AccountId::new(42).to_string(), "42");
    }

    #[test]
    fn parse_plain_and_prefixed() {
        let plain: AccountId = "7".parse().expect("should parse");
        let prefixed: AccountId = "account#7".parse().expect("should parse");
        assert_eq!(plain, prefixed);
        assert_eq!(plain.get(), 7);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "seven".parse::<UserId>().unwrap_err();
        assert_eq!(err.id_type, "UserId");
    }

    #[test]
    fn parse_rejects_non_positive() {
        assert!("0".parse::<TransactionId>().is_err());
        assert!("-3".parse::<TransactionId>().is_err());
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&UserId::new(12)).expect("serialize");
        assert_eq!(json, "12");
        let parsed: UserId = serde_json::from_str("12").expect("deserialize");
        assert_eq!(parsed, UserId::new(12));
    }
}
