use futures::future::join_all;

use super::fetcher::PreviewFetcher;
use super::links::extract_links;
use super::LinkPreview;

/// Fans every link in a text body out to the fetcher and gathers the results.
#[derive(Clone)]
pub struct PreviewAggregator {
    fetcher: PreviewFetcher,
}

impl PreviewAggregator {
    pub fn new(fetcher: PreviewFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &PreviewFetcher {
        &self.fetcher
    }

    /// One preview per extracted URL, in the order the URLs appear.
    ///
    /// All fetches run concurrently and the call returns once every one of
    /// them has settled, so latency tracks the slowest fetch.
    pub async fn previews_for(&self, text: &str) -> Vec<LinkPreview> {
        let links = extract_links(text);
        if links.is_empty() {
            return Vec::new();
        }

        tracing::debug!(count = links.len(), "Fetching link previews");
        join_all(links.iter().map(|url| self.fetcher.fetch(url))).await
    }
}
