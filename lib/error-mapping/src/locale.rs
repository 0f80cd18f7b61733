//! Display languages for user-facing messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used to render [`UserMessage`](crate::UserMessage)s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese, the product's primary language.
    #[default]
    #[serde(rename = "pt-BR", alias = "pt", alias = "pt_BR")]
    PtBr,
    /// English.
    #[serde(rename = "en", alias = "en-US", alias = "en_US")]
    En,
}

impl Locale {
    /// Returns the BCP 47 tag for this locale.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::PtBr => "pt-BR",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned for an unsupported locale tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocaleError {
    /// The rejected tag.
    pub tag: String,
}

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale '{}' (expected pt-BR or en)", self.tag)
    }
}

impl std::error::Error for ParseLocaleError {}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(ParseLocaleError { tag: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_portuguese() {
        assert_eq!(Locale::default(), Locale::PtBr);
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("pt-BR".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("pt_br".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("en-US".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn serde_uses_tags() {
        assert_eq!(
            serde_json::to_string(&Locale::PtBr).expect("serialize"),
            "\"pt-BR\""
        );
        let parsed: Locale = serde_json::from_str("\"en\"").expect("deserialize");
        assert_eq!(parsed, Locale::En);
    }
}
