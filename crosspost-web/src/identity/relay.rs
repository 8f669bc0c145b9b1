//! Two-phase credential relay.
//!
//! Phase 1 ([`sign_in`]) decides at sign-in time whether a provider credential
//! can be kept in-band or has to be shipped to the credential persistence
//! endpoint through a redirect. Phase 2 ([`complete_relay`]) runs when that
//! redirect is followed and turns the encoded parameters back into a
//! credential.

use serde::{Deserialize, Serialize, Serializer};

use super::credential::{extract_credential, NormalizedCredential, ProviderCallback};
use super::error::IdentityError;
use super::provider::Provider;

pub const DEFAULT_RELAY_PATH: &str = "/api/user/save-token";

/// Relative redirect target carrying a credential as query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRedirect(String);

impl RelayRedirect {
    pub fn for_credential(
        relay_path: &str,
        credential: &NormalizedCredential,
    ) -> Result<Self, IdentityError> {
        let query = serde_urlencoded::to_string(RelayQuery {
            provider: credential.provider().as_str(),
            token: credential.token(),
            secret: credential.secret(),
        })
        .map_err(|e| IdentityError::InvalidRelay(e.to_string()))?;

        let separator = if relay_path.contains('?') { '&' } else { '?' };
        Ok(Self(format!("{}{}{}", relay_path, separator, query)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct RelayQuery<'a> {
    provider: &'a str,
    token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
}

/// Result of the sign-in decision.
///
/// Serializes the way the sign-in endpoint reports it: `true`, the redirect
/// path, or `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Primary provider; the session completes in-band.
    Complete,
    /// Session completion is deferred to whoever consumes the redirect.
    Relay(RelayRedirect),
    /// The callback lacked a usable credential. No session state is created.
    Rejected(Provider),
}

impl Serialize for SignInOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SignInOutcome::Complete => serializer.serialize_bool(true),
            SignInOutcome::Relay(redirect) => serializer.serialize_str(redirect.as_str()),
            SignInOutcome::Rejected(_) => serializer.serialize_bool(false),
        }
    }
}

impl SignInOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SignInOutcome::Complete => "complete",
            SignInOutcome::Relay(_) => "relay",
            SignInOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Phase 1: decide how a provider callback finishes signing in.
pub fn sign_in(callback: &ProviderCallback, relay_path: &str) -> SignInOutcome {
    let provider = callback.provider();
    if provider.is_primary() {
        return SignInOutcome::Complete;
    }

    let Some(credential) = extract_credential(callback) else {
        tracing::error!(provider = %provider, "No token found for {} login", provider);
        return SignInOutcome::Rejected(provider);
    };

    match RelayRedirect::for_credential(relay_path, &credential) {
        Ok(redirect) => {
            tracing::info!(provider = %provider, "Relaying credential for out-of-band persistence");
            SignInOutcome::Relay(redirect)
        }
        Err(e) => {
            tracing::error!(provider = %provider, error = %e, "Failed to build relay redirect");
            SignInOutcome::Rejected(provider)
        }
    }
}

/// Query parameters of a relay redirect, as received in phase 2.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayParams {
    pub provider: String,
    pub token: String,
    #[serde(default)]
    pub secret: Option<String>,
}

impl RelayParams {
    pub fn from_query(query: &str) -> Result<Self, IdentityError> {
        serde_urlencoded::from_str(query).map_err(|e| IdentityError::InvalidRelay(e.to_string()))
    }
}

/// Phase 2: rebuild the relayed credential, re-checking everything phase 1
/// guaranteed since the parameters came back through the browser.
pub fn complete_relay(params: RelayParams) -> Result<NormalizedCredential, IdentityError> {
    let provider: Provider = params.provider.parse()?;
    if provider.is_primary() {
        return Err(IdentityError::InvalidRelay(format!(
            "{} credentials are kept on the session token",
            provider
        )));
    }

    NormalizedCredential::new(provider, params.token, params.secret)
}
