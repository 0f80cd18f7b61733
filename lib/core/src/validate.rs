//! Input validation applied before a request leaves the client.
//!
//! The rules mirror the constraints the balance API enforces so that obvious
//! mistakes are reported without a round trip. Error texts use the same
//! vocabulary as the server ("invalid amount", "insufficient balance", ...)
//! so the error normalizer renders them the same way.

use std::fmt;

/// Smallest amount accepted for a deposit or withdrawal.
pub const MIN_AMOUNT: f64 = 0.01;

/// Largest amount accepted for a single deposit or withdrawal.
pub const MAX_AMOUNT: f64 = 999_999.99;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum display name length (after trimming).
pub const MIN_NAME_LEN: usize = 2;

/// Maximum account description length.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// A rejected input value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A mandatory field was empty.
    RequiredField { field: &'static str },
    /// The email address is malformed.
    InvalidEmail,
    /// The password is shorter than the minimum.
    PasswordTooShort { min: usize },
    /// The display name is shorter than the minimum.
    NameTooShort { min: usize },
    /// Password and confirmation differ.
    PasswordMismatch,
    /// The amount is NaN or infinite.
    AmountNotFinite,
    /// The amount is below [`MIN_AMOUNT`].
    AmountTooSmall { min: f64 },
    /// The amount is above [`MAX_AMOUNT`].
    AmountTooLarge { max: f64 },
    /// A withdrawal exceeds the known balance.
    InsufficientBalance { balance: f64 },
    /// The description is longer than the maximum.
    DescriptionTooLong { max: usize },
    /// The initial deposit of a new account is negative.
    NegativeInitialDeposit,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredField { field } => write!(f, "required field '{field}' is empty"),
            Self::InvalidEmail => write!(f, "invalid format: not an email address"),
            Self::PasswordTooShort { min } => {
                write!(f, "invalid input: password must have at least {min} characters")
            }
            Self::NameTooShort { min } => {
                write!(f, "invalid input: name must have at least {min} characters")
            }
            Self::PasswordMismatch => write!(f, "invalid input: passwords do not match"),
            Self::AmountNotFinite => write!(f, "invalid amount: not a number"),
            Self::AmountTooSmall { min } => write!(f, "invalid amount: minimum is {min:.2}"),
            Self::AmountTooLarge { max } => write!(f, "invalid amount: maximum is {max:.2}"),
            Self::InsufficientBalance { balance } => {
                write!(f, "insufficient balance: {balance:.2} available")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "invalid input: description exceeds {max} characters")
            }
            Self::NegativeInitialDeposit => {
                write!(f, "invalid amount: initial deposit cannot be negative")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks that an email address has a local part and a domain.
pub fn email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::RequiredField { field: "email" });
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.starts_with('.')
        || domain.ends_with('.')
        || value.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Checks the password length.
pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::RequiredField { field: "password" });
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Checks that the confirmation repeats the password.
pub fn password_confirmation(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Checks the display name length.
pub fn name(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::RequiredField { field: "name" });
    }
    if value.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort { min: MIN_NAME_LEN });
    }
    Ok(())
}

/// Checks a deposit or withdrawal amount.
pub fn amount(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::AmountNotFinite);
    }
    if value < MIN_AMOUNT {
        return Err(ValidationError::AmountTooSmall { min: MIN_AMOUNT });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(())
}

/// Checks a withdrawal against the balance the client last saw.
pub fn withdrawal(value: f64, balance: f64) -> Result<(), ValidationError> {
    amount(value)?;
    if value > balance {
        return Err(ValidationError::InsufficientBalance { balance });
    }
    Ok(())
}

/// Checks an optional free-text description.
pub fn description(value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => {
            Err(ValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LEN,
            })
        }
        _ => Ok(()),
    }
}

/// Checks the opening deposit of a new account.
pub fn initial_deposit(value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::AmountNotFinite),
        Some(v) if v < 0.0 => Err(ValidationError::NegativeInitialDeposit),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_ordinary_address() {
        assert!(email("a@b.com").is_ok());
        assert!(email("  maria.silva@banco.com.br ").is_ok());
    }

    #[test]
    fn email_rejects_malformed() {
        assert_eq!(email(""), Err(ValidationError::RequiredField { field: "email" }));
        assert_eq!(email("no-at-sign"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("two@@signs.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("@b.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("a@"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("a b@c.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_length() {
        assert!(password("secret").is_ok());
        assert_eq!(
            password("short"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            password(""),
            Err(ValidationError::RequiredField { field: "password" })
        );
    }

    #[test]
    fn confirmation_must_match() {
        assert!(password_confirmation("secret", "secret").is_ok());
        assert_eq!(
            password_confirmation("secret", "secreT"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn name_is_trimmed_before_length_check() {
        assert!(name("Al").is_ok());
        assert_eq!(name(" A "), Err(ValidationError::NameTooShort { min: 2 }));
    }

    #[test]
    fn amount_bounds() {
        assert!(amount(0.01).is_ok());
        assert!(amount(999_999.99).is_ok());
        assert!(matches!(
            amount(0.0),
            Err(ValidationError::AmountTooSmall { .. })
        ));
        assert!(matches!(
            amount(1_000_000.0),
            Err(ValidationError::AmountTooLarge { .. })
        ));
        assert_eq!(amount(f64::NAN), Err(ValidationError::AmountNotFinite));
    }

    #[test]
    fn withdrawal_cannot_exceed_balance() {
        assert!(withdrawal(50.0, 50.0).is_ok());
        assert_eq!(
            withdrawal(50.01, 50.0),
            Err(ValidationError::InsufficientBalance { balance: 50.0 })
        );
    }

    #[test]
    fn description_and_initial_deposit() {
        assert!(description(None).is_ok());
        assert!(description(Some("savings for travel")).is_ok());
        let long = "x".repeat(256);
        assert!(description(Some(&long)).is_err());

        assert!(initial_deposit(None).is_ok());
        assert!(initial_deposit(Some(0.0)).is_ok());
        assert_eq!(
            initial_deposit(Some(-1.0)),
            Err(ValidationError::NegativeInitialDeposit)
        );
    }

    #[test]
    fn messages_use_server_vocabulary() {
        assert!(
            ValidationError::InsufficientBalance { balance: 10.0 }
                .to_string()
                .starts_with("insufficient balance")
        );
        assert!(
            ValidationError::AmountTooSmall { min: MIN_AMOUNT }
                .to_string()
                .starts_with("invalid amount")
        );
    }
}
