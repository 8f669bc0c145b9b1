pub mod identity_bridge;
pub mod metrics;
pub mod stores;

pub use identity_bridge::{CallbackResult, IdentityBridge, SignInCallback};
pub use stores::{
    CredentialStore, InMemoryCredentialStore, InMemoryProfileStore, InMemorySessionTokenStore,
    SessionTokenStore, UserProfileStore,
};
