//! Transport abstractions for page content and image bytes.
//!
//! The crawler only sees two capabilities:
//! - `ContentFetcher`: raw page content (Markdown or HTML) for a URL
//! - `ImageSource`: raw image bytes for a link
//!
//! ## Implementations
//!
//! ```text
//! fetch/
//! ├── firecrawl.rs   # Markdown through the web content extraction API
//! ├── direct.rs      # Plain GET with the age-gate cookie
//! └── images.rs      # Image GET with User-Agent and Referer headers
//! ```

pub mod direct;
pub mod firecrawl;
pub mod images;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, FetcherKind};

// Re-export for convenience
pub use direct::DirectFetcher;
pub use firecrawl::FirecrawlFetcher;
pub use images::HttpImageSource;

/// Retrieves raw page content for a resource identifier.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the page at `url` and return its content.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Retrieves raw image bytes for a link.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch the image at `link`.
    async fn fetch_image(&self, link: &str) -> Result<Vec<u8>>;
}

/// Build the content fetcher a site profile asks for.
pub fn build_fetcher(kind: FetcherKind, config: &Config) -> Result<Arc<dyn ContentFetcher>> {
    let fetcher: Arc<dyn ContentFetcher> = match kind {
        FetcherKind::Firecrawl => Arc::new(FirecrawlFetcher::from_config(
            &config.crawler,
            &config.firecrawl,
        )?),
        FetcherKind::Direct => Arc::new(DirectFetcher::new(&config.crawler)?),
    };
    Ok(fetcher)
}
