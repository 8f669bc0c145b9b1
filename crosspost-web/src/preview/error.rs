use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Page body exceeds {0} bytes")]
    TooLarge(usize),
}

impl PreviewError {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewError::Request(_) => "request_error",
            PreviewError::Status(_) => "bad_status",
            PreviewError::Timeout(_) => "timeout",
            PreviewError::TooLarge(_) => "too_large",
        }
    }
}
