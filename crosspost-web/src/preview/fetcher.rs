use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;

use super::error::PreviewError;
use super::LinkPreview;
use crate::config::PreviewSettings;
use crate::services::metrics::record_preview_fetch;

const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 200;

/// Retrieves a page body. Any failure is reported as an error; callers
/// never see partial bodies.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, PreviewError>;
}

/// Plain HTTP GET transport. Bodies larger than the configured cap are
/// refused rather than buffered.
pub struct HttpTransport {
    client: Client,
    max_body_bytes: usize,
}

impl HttpTransport {
    pub fn new(settings: &PreviewSettings) -> Result<Self, PreviewError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: settings.max_body_bytes,
        })
    }
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn fetch_page(&self, url: &str) -> Result<String, PreviewError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(PreviewError::TooLarge(self.max_body_bytes));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(PreviewError::TooLarge(self.max_body_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Fetches and parses one URL's social metadata. Never fails: every error,
/// including a timeout, collapses to [`LinkPreview::bare`].
#[derive(Clone)]
pub struct PreviewFetcher {
    transport: Arc<dyn PageTransport>,
    timeout: Duration,
}

impl PreviewFetcher {
    pub fn new(transport: Arc<dyn PageTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn fetch(&self, url: &str) -> LinkPreview {
        let body = match tokio::time::timeout(self.timeout, self.transport.fetch_page(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return self.degrade(url, e),
            Err(_) => return self.degrade(url, PreviewError::Timeout(self.timeout)),
        };

        record_preview_fetch("ok");
        PageMetadata::parse(&body).into_preview(url)
    }

    fn degrade(&self, url: &str, error: PreviewError) -> LinkPreview {
        tracing::warn!(url = %url, error = %error, "Error fetching link preview");
        record_preview_fetch(error.label());
        LinkPreview::bare(url)
    }
}

static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static TWITTER_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="twitter:title"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:description"]"#));
static TWITTER_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[name="twitter:description"]"#));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="description"]"#));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static TWITTER_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="twitter:image"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("metadata selectors are valid CSS")
}

/// Metadata read from a page, before it is attached to a URL.
#[derive(Debug, Default, PartialEq, Eq)]
struct PageMetadata {
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
}

impl PageMetadata {
    /// Each field takes the first non-empty source in order: Open Graph,
    /// Twitter card, generic tag. The document is dropped before returning
    /// since it is not `Send`.
    fn parse(body: &str) -> Self {
        let document = Html::parse_document(body);

        let title = meta_content(&document, &OG_TITLE)
            .or_else(|| meta_content(&document, &TWITTER_TITLE))
            .or_else(|| element_text(&document, &TITLE));

        let description = meta_content(&document, &OG_DESCRIPTION)
            .or_else(|| meta_content(&document, &TWITTER_DESCRIPTION))
            .or_else(|| meta_content(&document, &DESCRIPTION));

        let image = meta_content(&document, &OG_IMAGE)
            .or_else(|| meta_content(&document, &TWITTER_IMAGE));

        Self {
            title: title.map(|t| truncate_chars(t, TITLE_MAX_CHARS)),
            description: description.map(|d| truncate_chars(d, DESCRIPTION_MAX_CHARS)),
            image,
        }
    }

    fn into_preview(self, url: &str) -> LinkPreview {
        LinkPreview {
            url: url.to_string(),
            title: self.title,
            description: self.description,
            image: self.image,
        }
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn element_text(document: &Html, selector: &Selector) -> Option<String> {
    let text: String = document.select(selector).next()?.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn truncate_chars(mut value: String, max_chars: usize) -> String {
    if let Some((byte_index, _)) = value.char_indices().nth(max_chars) {
        value.truncate(byte_index);
    }
    value
}
