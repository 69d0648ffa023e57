//! Plain HTTP page fetching.

use async_trait::async_trait;
use reqwest::header::COOKIE;

use crate::error::Result;
use crate::fetch::ContentFetcher;
use crate::models::CrawlerConfig;
use crate::utils::http::{create_async_client, ensure_success};

/// `ContentFetcher` issuing a GET with the age-gate cookie.
pub struct DirectFetcher {
    client: reqwest::Client,
    cookie: String,
}

impl DirectFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            cookie: config.cookie.clone(),
        })
    }
}

#[async_trait]
impl ContentFetcher for DirectFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut request = self.client.get(url);
        if !self.cookie.is_empty() {
            request = request.header(COOKIE, &self.cookie);
        }

        let response = ensure_success(url, request.send().await?).await?;
        Ok(response.text().await?)
    }
}
