use service_core::error::AppError;
use thiserror::Error;

use super::provider::Provider;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("No token found for {0} login")]
    MissingCredential(Provider),

    #[error("Malformed {provider} credential: {reason}")]
    MalformedCredential {
        provider: Provider,
        reason: &'static str,
    },

    #[error("Unknown identity provider: {0}")]
    UnknownProvider(String),

    #[error("No sub found in {0} profile")]
    MissingSubject(Provider),

    #[error("No email found in {0} profile")]
    MissingEmail(Provider),

    #[error("Invalid relay parameters: {0}")]
    InvalidRelay(String),

    #[error("Identity store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        let message = err.to_string();
        match err {
            IdentityError::MissingCredential(_)
            | IdentityError::MissingSubject(_)
            | IdentityError::MissingEmail(_) => AppError::AuthError(anyhow::anyhow!(message)),
            IdentityError::MalformedCredential { .. }
            | IdentityError::UnknownProvider(_)
            | IdentityError::InvalidRelay(_) => AppError::BadRequest(anyhow::anyhow!(message)),
            IdentityError::Store(e) => AppError::InternalError(e),
        }
    }
}
