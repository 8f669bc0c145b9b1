use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::IdentityError;

/// The fixed set of identity providers a user can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Twitter,
    Linkedin,
}

impl Provider {
    /// Bearer tokens from this provider are kept in-band on the session token.
    /// Every other provider goes through the credential relay.
    pub const PRIMARY: Provider = Provider::Google;

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Twitter => "twitter",
            Provider::Linkedin => "linkedin",
        }
    }

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }

    /// OAuth1 providers hand out a token/secret pair instead of a bearer token.
    pub fn uses_oauth1(self) -> bool {
        matches!(self, Provider::Twitter)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            "twitter" => Ok(Provider::Twitter),
            "linkedin" => Ok(Provider::Linkedin),
            other => Err(IdentityError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_google_is_primary() {
        assert!(Provider::Google.is_primary());
        assert!(!Provider::Twitter.is_primary());
        assert!(!Provider::Linkedin.is_primary());
    }

    #[test]
    fn unknown_provider_fails_closed() {
        let err = "github".parse::<Provider>().unwrap_err();
        assert!(matches!(err, IdentityError::UnknownProvider(name) if name == "github"));
    }

    #[test]
    fn parses_its_own_names() {
        for provider in [Provider::Google, Provider::Twitter, Provider::Linkedin] {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }
}
