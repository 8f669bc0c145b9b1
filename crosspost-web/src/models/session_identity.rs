use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use service_core::error::AppError;
use tower_sessions::Session;

const EMAIL_KEY: &str = "email";
const PENDING_EMAIL_KEY: &str = "pending_email";

/// Identity recorded on the browser session.
///
/// `email` is set once the primary provider has signed the user in.
/// `pending_email` is set by a linked-provider callback that is waiting for
/// the relay endpoint to persist its credential.
pub struct SessionIdentity {
    session: Session,
    pub email: Option<String>,
    pub pending_email: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::InternalError(anyhow::anyhow!(msg)))?;

        let email: Option<String> = session.get(EMAIL_KEY).await.map_err(session_error)?;
        let pending_email: Option<String> =
            session.get(PENDING_EMAIL_KEY).await.map_err(session_error)?;

        Ok(Self {
            session,
            email,
            pending_email,
        })
    }
}

impl SessionIdentity {
    /// The identity a relayed credential belongs to: the signed-in user if
    /// there is one, else the user whose callback started the relay.
    pub fn relay_owner(&self) -> Option<&str> {
        self.email.as_deref().or(self.pending_email.as_deref())
    }

    /// Record a completed primary sign-in. The session id is rotated.
    pub async fn sign_in(&mut self, email: &str) -> Result<(), AppError> {
        self.session.cycle_id().await.map_err(session_error)?;
        self.session
            .insert(EMAIL_KEY, email)
            .await
            .map_err(session_error)?;
        self.session
            .remove::<String>(PENDING_EMAIL_KEY)
            .await
            .map_err(session_error)?;
        self.email = Some(email.to_string());
        self.pending_email = None;
        Ok(())
    }

    pub async fn set_pending(&mut self, email: &str) -> Result<(), AppError> {
        self.session
            .insert(PENDING_EMAIL_KEY, email)
            .await
            .map_err(session_error)?;
        self.pending_email = Some(email.to_string());
        Ok(())
    }

    /// Promote a pending identity once its relay has completed.
    pub async fn confirm_pending(&mut self) -> Result<(), AppError> {
        if self.email.is_some() {
            return Ok(());
        }
        if let Some(email) = self.pending_email.clone() {
            self.sign_in(&email).await?;
        }
        Ok(())
    }

    pub async fn sign_out(&mut self) -> Result<(), AppError> {
        self.session.flush().await.map_err(session_error)?;
        self.email = None;
        self.pending_email = None;
        Ok(())
    }
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::Error::new(err))
}
