//! Link preview pipeline: find URLs in post text, fetch each page's social
//! metadata concurrently, and degrade any failure to a bare-URL preview.

pub mod aggregator;
pub mod error;
pub mod fetcher;
pub mod links;

use serde::{Deserialize, Serialize};

pub use aggregator::PreviewAggregator;
pub use error::PreviewError;
pub use fetcher::{HttpTransport, PageTransport, PreviewFetcher};
pub use links::extract_links;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LinkPreview {
    /// A preview with nothing but the URL. Used whenever a fetch fails.
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
            image: None,
        }
    }
}
