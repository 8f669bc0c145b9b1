//! Provider callback payloads and their normalization into one credential shape.

use serde::Deserialize;

use super::error::IdentityError;
use super::provider::Provider;

/// OAuth2 account fields (Google).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BearerAccount {
    pub access_token: Option<String>,
}

/// OAuth1 account fields (Twitter).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuth1Account {
    pub oauth_token: Option<String>,
    pub oauth_token_secret: Option<String>,
}

/// OpenID Connect account fields (LinkedIn). The ID token is carried along
/// but never inspected here; claims arrive separately as profile claims.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OidcAccount {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

/// Raw account payload handed over by an identity provider at sign-in.
///
/// Tagged by the `provider` field; unknown providers do not deserialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderCallback {
    Google(BearerAccount),
    Twitter(OAuth1Account),
    Linkedin(OidcAccount),
}

impl ProviderCallback {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderCallback::Google(_) => Provider::Google,
            ProviderCallback::Twitter(_) => Provider::Twitter,
            ProviderCallback::Linkedin(_) => Provider::Linkedin,
        }
    }
}

/// A provider credential reduced to `token` plus, for OAuth1 only, `secret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCredential {
    provider: Provider,
    token: String,
    secret: Option<String>,
}

impl NormalizedCredential {
    /// Build a credential, enforcing that a secret is present iff the
    /// provider is an OAuth1 provider. Empty strings count as missing.
    pub fn new(
        provider: Provider,
        token: impl Into<String>,
        secret: Option<String>,
    ) -> Result<Self, IdentityError> {
        let token = token.into();
        if token.is_empty() {
            return Err(IdentityError::MissingCredential(provider));
        }

        let secret = secret.filter(|s| !s.is_empty());
        match (provider.uses_oauth1(), secret.is_some()) {
            (true, false) => Err(IdentityError::MalformedCredential {
                provider,
                reason: "token secret is required",
            }),
            (false, true) => Err(IdentityError::MalformedCredential {
                provider,
                reason: "bearer credentials carry no secret",
            }),
            _ => Ok(Self {
                provider,
                token,
                secret,
            }),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl BearerAccount {
    fn normalize(&self, provider: Provider) -> Option<NormalizedCredential> {
        let token = present(&self.access_token)?;
        NormalizedCredential::new(provider, token, None).ok()
    }
}

impl OAuth1Account {
    fn normalize(&self) -> Option<NormalizedCredential> {
        let token = present(&self.oauth_token)?;
        let secret = present(&self.oauth_token_secret)?;
        NormalizedCredential::new(Provider::Twitter, token, Some(secret.to_string())).ok()
    }
}

impl OidcAccount {
    fn normalize(&self) -> Option<NormalizedCredential> {
        let token = present(&self.access_token)?;
        NormalizedCredential::new(Provider::Linkedin, token, None).ok()
    }
}

/// Pull the credential out of a provider callback. `None` means the
/// expected token field was missing or empty.
pub fn extract_credential(callback: &ProviderCallback) -> Option<NormalizedCredential> {
    match callback {
        ProviderCallback::Google(account) => account.normalize(Provider::Google),
        ProviderCallback::Twitter(account) => account.normalize(),
        ProviderCallback::Linkedin(account) => account.normalize(),
    }
}
