//! Multi-provider identity bridge.
//!
//! Normalizes Google (OAuth2), Twitter (OAuth1) and LinkedIn (OIDC) callbacks
//! into one credential shape, decides whether a credential must be relayed
//! for out-of-band persistence, and maintains the durable session token the
//! session view is projected from.

pub mod credential;
pub mod error;
pub mod profile;
pub mod provider;
pub mod relay;
pub mod session;

pub use credential::{extract_credential, NormalizedCredential, ProviderCallback};
pub use error::IdentityError;
pub use profile::{ProfileClaims, UserProfile};
pub use provider::Provider;
pub use relay::{complete_relay, sign_in, RelayParams, RelayRedirect, SignInOutcome};
pub use session::{build_session_view, SessionToken, SessionUser, SessionView};
