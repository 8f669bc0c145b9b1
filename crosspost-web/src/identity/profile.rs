use serde::{Deserialize, Serialize};

use super::error::IdentityError;
use super::provider::Provider;

/// Profile claims as reported by a provider (OIDC standard claim names).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// User profile owned by the account subsystem, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

const LINKEDIN_FALLBACK_NAME: &str = "LinkedIn User";

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

impl UserProfile {
    /// Map provider claims onto a profile at account creation or linking.
    ///
    /// A LinkedIn profile without `sub` is unusable. A profile without an
    /// email has nothing to be keyed by and yields `MissingEmail`.
    pub fn from_claims(provider: Provider, claims: &ProfileClaims) -> Result<Self, IdentityError> {
        if provider == Provider::Linkedin && non_empty(&claims.sub).is_none() {
            return Err(IdentityError::MissingSubject(provider));
        }

        let email = non_empty(&claims.email).ok_or(IdentityError::MissingEmail(provider))?;

        let name = match provider {
            Provider::Linkedin => Some(linkedin_display_name(claims)),
            Provider::Google | Provider::Twitter => non_empty(&claims.name),
        };

        Ok(Self {
            email,
            name,
            image: non_empty(&claims.picture),
            firstname: non_empty(&claims.given_name),
            lastname: non_empty(&claims.family_name),
        })
    }

    /// Fold a freshly mapped profile for the same email into this one.
    /// Fields the incoming provider did not report are kept.
    pub fn link(&mut self, incoming: UserProfile) {
        debug_assert_eq!(self.email, incoming.email);
        if incoming.name.is_some() {
            self.name = incoming.name;
        }
        if incoming.image.is_some() {
            self.image = incoming.image;
        }
        if incoming.firstname.is_some() {
            self.firstname = incoming.firstname;
        }
        if incoming.lastname.is_some() {
            self.lastname = incoming.lastname;
        }
    }
}

fn linkedin_display_name(claims: &ProfileClaims) -> String {
    if let Some(name) = non_empty(&claims.name) {
        return name;
    }

    let joined = format!(
        "{} {}",
        claims.given_name.as_deref().unwrap_or_default(),
        claims.family_name.as_deref().unwrap_or_default()
    );
    let joined = joined.trim();
    if joined.is_empty() {
        LINKEDIN_FALLBACK_NAME.to_string()
    } else {
        joined.to_string()
    }
}
