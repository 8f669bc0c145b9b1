//! Collaborator stores the identity bridge reads and writes through.
//!
//! The in-memory implementations back the single-process deployment and the
//! tests; a database-backed store only has to honour the same per-key
//! atomicity.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::identity::{NormalizedCredential, Provider, SessionToken, UserProfile};

/// Durable session tokens keyed by user identity (email).
#[async_trait]
pub trait SessionTokenStore: Send + Sync {
    async fn load(&self, user_key: &str) -> Result<Option<SessionToken>, anyhow::Error>;

    /// Atomically apply `apply` to the record for `user_key`, creating an
    /// empty record first if none exists, and return the updated record.
    async fn update(
        &self,
        user_key: &str,
        apply: &(dyn for<'a> Fn(&'a mut SessionToken) + Send + Sync),
    ) -> Result<SessionToken, anyhow::Error>;
}

/// Read side of the account subsystem plus the upsert used at account
/// creation and linking.
#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, anyhow::Error>;
    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, anyhow::Error>;
}

/// Persistence for relayed (non-primary) provider credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save(
        &self,
        user_key: &str,
        credential: NormalizedCredential,
    ) -> Result<(), anyhow::Error>;

    async fn find(
        &self,
        user_key: &str,
        provider: Provider,
    ) -> Result<Option<NormalizedCredential>, anyhow::Error>;
}

#[derive(Default)]
pub struct InMemorySessionTokenStore {
    tokens: DashMap<String, SessionToken>,
}

impl InMemorySessionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionTokenStore for InMemorySessionTokenStore {
    async fn load(&self, user_key: &str) -> Result<Option<SessionToken>, anyhow::Error> {
        Ok(self.tokens.get(user_key).map(|entry| entry.value().clone()))
    }

    async fn update(
        &self,
        user_key: &str,
        apply: &(dyn for<'a> Fn(&'a mut SessionToken) + Send + Sync),
    ) -> Result<SessionToken, anyhow::Error> {
        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self.tokens.entry(user_key.to_string()).or_default();
        apply(entry.value_mut());
        Ok(entry.value().clone())
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserProfileStore for InMemoryProfileStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, anyhow::Error> {
        Ok(self.profiles.get(email).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, anyhow::Error> {
        let stored = match self.profiles.entry(profile.email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut existing) => {
                existing.get_mut().link(profile);
                existing.get().clone()
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => slot.insert(profile).value().clone(),
        };
        Ok(stored)
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: DashMap<(String, Provider), NormalizedCredential>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn save(
        &self,
        user_key: &str,
        credential: NormalizedCredential,
    ) -> Result<(), anyhow::Error> {
        self.credentials
            .insert((user_key.to_string(), credential.provider()), credential);
        Ok(())
    }

    async fn find(
        &self,
        user_key: &str,
        provider: Provider,
    ) -> Result<Option<NormalizedCredential>, anyhow::Error> {
        Ok(self
            .credentials
            .get(&(user_key.to_string(), provider))
            .map(|entry| entry.value().clone()))
    }
}
