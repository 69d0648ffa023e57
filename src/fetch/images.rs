//! HTTP image fetching.

use async_trait::async_trait;
use reqwest::header::REFERER;

use crate::error::Result;
use crate::fetch::ImageSource;
use crate::models::{CrawlerConfig, LinkConfig};
use crate::utils::http::{create_async_client, ensure_success};
use crate::utils::url::image_file_name;

/// `ImageSource` issuing GET requests with a browser User-Agent.
///
/// Links on the configured referer host also carry a Referer built from the
/// image stem, which that host requires for hotlinked images.
pub struct HttpImageSource {
    client: reqwest::Client,
    referer_host: String,
    referer_prefix: String,
}

impl HttpImageSource {
    pub fn new(crawler: &CrawlerConfig, links: &LinkConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(crawler)?,
            referer_host: links.referer_host.clone(),
            referer_prefix: links.referer_prefix.clone(),
        })
    }

    /// Referer to send for `link`, if any.
    fn referer_for(&self, link: &str) -> Option<String> {
        if self.referer_host.is_empty() || !link.contains(&self.referer_host) {
            return None;
        }
        image_file_name(link).map(|(stem, _)| format!("{}{}", self.referer_prefix, stem))
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch_image(&self, link: &str) -> Result<Vec<u8>> {
        let mut request = self.client.get(link);
        if let Some(referer) = self.referer_for(link) {
            request = request.header(REFERER, referer);
        }

        let response = ensure_success(link, request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source() -> HttpImageSource {
        HttpImageSource::new(&CrawlerConfig::default(), &LinkConfig::default()).unwrap()
    }

    #[test]
    fn test_referer_only_for_referer_host() {
        let source = source();
        assert_eq!(
            source.referer_for("https://i.imgur.com/AbCd123.jpeg"),
            Some("https://imgur.com/AbCd123".to_string())
        );
        assert_eq!(source.referer_for("https://pbs.twimg.com/media/x.jpg"), None);
    }

    #[tokio::test]
    async fn test_fetch_image_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pic.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let bytes = source()
            .fetch_image(&format!("{}/pic.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
