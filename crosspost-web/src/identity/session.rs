//! Durable session token and the per-request session view built from it.

use serde::{Deserialize, Serialize};

use super::credential::{extract_credential, ProviderCallback};
use super::profile::UserProfile;
use super::provider::Provider;

/// Server-held token record for one user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: Option<String>,
    pub provider: Option<Provider>,
}

impl SessionToken {
    /// Fold a sign-in callback into the token.
    ///
    /// Only a primary-provider callback carrying a token writes; everything
    /// else leaves the token untouched, so an established session is never
    /// cleared or downgraded by a linked provider. Returns whether the token
    /// changed.
    pub fn merge_sign_in(&mut self, callback: &ProviderCallback) -> bool {
        if !callback.provider().is_primary() {
            return false;
        }
        let Some(credential) = extract_credential(callback) else {
            return false;
        };

        self.access_token = Some(credential.token().to_string());
        self.provider = Some(credential.provider());
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
}

/// Externally visible snapshot of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: SessionUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Project the durable token and the profile into a fresh view.
///
/// The access token is only exposed when the view has an email, so an
/// anonymous or half-finished session never sees a stored token.
pub fn build_session_view(token: &SessionToken, profile: Option<&UserProfile>) -> SessionView {
    let mut view = SessionView::default();

    if let Some(profile) = profile {
        view.user.email = Some(profile.email.clone()).filter(|e| !e.is_empty());
        view.user.name = profile.name.clone();
        view.user.image = profile.image.clone();
        view.user.firstname = profile.firstname.clone();
        view.user.lastname = profile.lastname.clone();
    }

    if view.user.email.is_some() {
        view.access_token = token.access_token.clone();
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::credential::{BearerAccount, OAuth1Account, OidcAccount};

    fn google(token: Option<&str>) -> ProviderCallback {
        ProviderCallback::Google(BearerAccount {
            access_token: token.map(str::to_string),
        })
    }

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            email: email.to_string(),
            name: None,
            image: None,
            firstname: Some("Ada".into()),
            lastname: None,
        }
    }

    #[test]
    fn primary_sign_in_sets_token_and_provider() {
        let mut token = SessionToken::default();
        assert!(token.merge_sign_in(&google(Some("ya29"))));
        assert_eq!(token.access_token.as_deref(), Some("ya29"));
        assert_eq!(token.provider, Some(Provider::Google));
    }

    #[test]
    fn other_providers_never_touch_the_token() {
        let mut token = SessionToken::default();
        token.merge_sign_in(&google(Some("ya29")));
        let before = token.clone();

        let twitter = ProviderCallback::Twitter(OAuth1Account {
            oauth_token: Some("tw".into()),
            oauth_token_secret: Some("sec".into()),
        });
        let linkedin = ProviderCallback::Linkedin(OidcAccount {
            access_token: Some("li".into()),
            id_token: None,
        });
        assert!(!token.merge_sign_in(&twitter));
        assert!(!token.merge_sign_in(&linkedin));
        assert_eq!(token, before);
    }

    #[test]
    fn tokenless_primary_callback_does_not_clear() {
        let mut token = SessionToken::default();
        token.merge_sign_in(&google(Some("ya29")));
        assert!(!token.merge_sign_in(&google(None)));
        assert!(!token.merge_sign_in(&google(Some(""))));
        assert_eq!(token.access_token.as_deref(), Some("ya29"));
    }

    #[test]
    fn view_exposes_token_only_with_email() {
        let token = SessionToken {
            access_token: Some("ya29".into()),
            provider: Some(Provider::Google),
        };

        let anonymous = build_session_view(&token, None);
        assert_eq!(anonymous.access_token, None);
        assert_eq!(anonymous.user, SessionUser::default());

        let blank = build_session_view(&token, Some(&profile("")));
        assert_eq!(blank.access_token, None);

        let signed_in = build_session_view(&token, Some(&profile("ada@example.com")));
        assert_eq!(signed_in.access_token.as_deref(), Some("ya29"));
        assert_eq!(signed_in.user.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn view_without_stored_token_omits_it() {
        let view = build_session_view(&SessionToken::default(), Some(&profile("ada@example.com")));
        assert_eq!(view.access_token, None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "user": { "email": "ada@example.com", "firstname": "Ada" } })
        );
    }

    #[test]
    fn view_keeps_empty_names_distinct_from_absent() {
        let mut p = profile("ada@example.com");
        p.lastname = Some(String::new());
        let view = build_session_view(&SessionToken::default(), Some(&p));
        assert_eq!(view.user.lastname.as_deref(), Some(""));
        assert_eq!(view.user.name, None);
    }

    #[test]
    fn view_building_is_idempotent() {
        let token = SessionToken {
            access_token: Some("ya29".into()),
            provider: Some(Provider::Google),
        };
        let p = profile("ada@example.com");
        let first = serde_json::to_vec(&build_session_view(&token, Some(&p))).unwrap();
        let second = serde_json::to_vec(&build_session_view(&token, Some(&p))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn view_uses_camel_case_access_token() {
        let token = SessionToken {
            access_token: Some("ya29".into()),
            provider: Some(Provider::Google),
        };
        let json = serde_json::to_value(build_session_view(&token, Some(&profile("a@b.c")))).unwrap();
        assert_eq!(json["accessToken"], "ya29");
    }
}
