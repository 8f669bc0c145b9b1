use serde::Deserialize;
use std::sync::Arc;

use super::metrics::record_sign_in;
use super::stores::{CredentialStore, SessionTokenStore, UserProfileStore};
use crate::identity::{
    build_session_view, complete_relay, sign_in, IdentityError, NormalizedCredential,
    ProfileClaims, ProviderCallback, RelayParams, SessionView, SignInOutcome, UserProfile,
};

/// Sign-in callback as delivered by the OAuth layer: the provider account
/// payload plus the profile claims reported alongside it.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInCallback {
    pub account: ProviderCallback,
    #[serde(default)]
    pub profile: ProfileClaims,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResult {
    pub outcome: SignInOutcome,
    /// Identity the outcome applies to. `None` when the sign-in was rejected
    /// or the profile carried no email.
    pub email: Option<String>,
}

/// Ties the pure identity rules to the collaborator stores.
pub struct IdentityBridge {
    sessions: Arc<dyn SessionTokenStore>,
    profiles: Arc<dyn UserProfileStore>,
    credentials: Arc<dyn CredentialStore>,
    relay_path: String,
}

impl IdentityBridge {
    pub fn new(
        sessions: Arc<dyn SessionTokenStore>,
        profiles: Arc<dyn UserProfileStore>,
        credentials: Arc<dyn CredentialStore>,
        relay_path: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            profiles,
            credentials,
            relay_path: relay_path.into(),
        }
    }

    pub fn relay_path(&self) -> &str {
        &self.relay_path
    }

    /// Run one provider callback through the sign-in decision, profile
    /// mapping and, for the primary provider, the session token merge.
    ///
    /// A profile without an email does not change the outcome; the callback is
    /// then accepted without any profile or token being stored. Nothing is
    /// written unless the sign-in is accepted.
    pub async fn handle_callback(
        &self,
        callback: &SignInCallback,
    ) -> Result<CallbackResult, IdentityError> {
        let account = &callback.account;
        let provider = account.provider();

        let (outcome, profile) = match UserProfile::from_claims(provider, &callback.profile) {
            Ok(profile) => (sign_in(account, &self.relay_path), Some(profile)),
            Err(IdentityError::MissingEmail(_)) => {
                tracing::info!(provider = %provider, "Profile carries no email, nothing will be stored");
                (sign_in(account, &self.relay_path), None)
            }
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "Rejecting sign-in with unusable profile");
                (SignInOutcome::Rejected(provider), None)
            }
        };
        record_sign_in(provider, &outcome);

        let profile = match profile {
            Some(profile) if !matches!(outcome, SignInOutcome::Rejected(_)) => profile,
            _ => {
                return Ok(CallbackResult {
                    outcome,
                    email: None,
                })
            }
        };

        let profile = self.profiles.upsert(profile).await?;

        if outcome == SignInOutcome::Complete {
            let token = self
                .sessions
                .update(&profile.email, &|token| {
                    token.merge_sign_in(account);
                })
                .await?;
            tracing::info!(
                provider = %provider,
                has_access_token = token.access_token.is_some(),
                "Session token merged"
            );
        }

        Ok(CallbackResult {
            outcome,
            email: Some(profile.email),
        })
    }

    /// Phase 2 of the relay: validate the redirect parameters and persist the
    /// credential for `user_key`.
    pub async fn complete_relay(
        &self,
        user_key: &str,
        params: RelayParams,
    ) -> Result<NormalizedCredential, IdentityError> {
        let credential = complete_relay(params)?;
        self.credentials.save(user_key, credential.clone()).await?;

        tracing::info!(provider = %credential.provider(), "Relayed credential persisted");
        Ok(credential)
    }

    /// Build the session view for the identity recorded on the HTTP session,
    /// if any.
    pub async fn session_view(&self, email: Option<&str>) -> Result<SessionView, IdentityError> {
        let Some(email) = email else {
            return Ok(build_session_view(&Default::default(), None));
        };

        let token = self.sessions.load(email).await?.unwrap_or_default();
        let profile = self.profiles.find_by_email(email).await?;
        Ok(build_session_view(&token, profile.as_ref()))
    }
}
