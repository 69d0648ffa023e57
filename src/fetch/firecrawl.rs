//! Markdown fetching through the Firecrawl scrape API.
//!
//! The service renders the target page with the age-gate cookie set and
//! returns its main content as Markdown.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::fetch::ContentFetcher;
use crate::models::{CrawlerConfig, FirecrawlConfig};
use crate::utils::http::{create_async_client, ensure_success};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    headers: BTreeMap<&'static str, &'a str>,
    formats: [&'static str; 1],
    only_main_content: bool,
    wait_for: u64,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: String,
}

/// The API reports errors either as `{code, message}` or as a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Detailed { code: i64, message: String },
    Message(String),
}

/// `ContentFetcher` backed by the Firecrawl scrape endpoint.
pub struct FirecrawlFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key_env: String,
    api_key: Option<String>,
    cookie: String,
    user_agent: String,
    wait_for_ms: u64,
    only_main_content: bool,
}

impl FirecrawlFetcher {
    /// Create a fetcher, reading the bearer token from the configured
    /// environment variable.
    pub fn from_config(crawler: &CrawlerConfig, firecrawl: &FirecrawlConfig) -> Result<Self> {
        let api_key = std::env::var(&firecrawl.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(crawler, firecrawl, api_key)
    }

    /// Create a fetcher with an explicit token.
    pub fn new(
        crawler: &CrawlerConfig,
        firecrawl: &FirecrawlConfig,
        api_key: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: create_async_client(crawler)?,
            endpoint: firecrawl.endpoint.clone(),
            api_key_env: firecrawl.api_key_env.clone(),
            api_key,
            cookie: crawler.cookie.clone(),
            user_agent: crawler.user_agent.clone(),
            wait_for_ms: firecrawl.wait_for_ms,
            only_main_content: firecrawl.only_main_content,
        })
    }

    fn request_body<'a>(&'a self, url: &'a str) -> ScrapeRequest<'a> {
        let mut headers = BTreeMap::new();
        headers.insert("Cookie", self.cookie.as_str());
        headers.insert("User-Agent", self.user_agent.as_str());

        ScrapeRequest {
            url,
            headers,
            formats: ["markdown"],
            only_main_content: self.only_main_content,
            wait_for: self.wait_for_ms,
        }
    }

    /// Interpret a decoded response body.
    fn into_markdown(url: &str, response: ScrapeResponse) -> Result<String> {
        if !response.success {
            return Err(match response.error {
                Some(ErrorPayload::Detailed { code, message }) => AppError::upstream(code, message),
                Some(ErrorPayload::Message(message)) => AppError::upstream(0, message),
                None => AppError::Unsuccessful,
            });
        }

        let markdown = response.data.unwrap_or_default().markdown;
        if markdown.is_empty() {
            return Err(AppError::EmptyContent(url.to_string()));
        }
        Ok(markdown)
    }
}

#[async_trait]
impl ContentFetcher for FirecrawlFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::MissingCredential(self.api_key_env.clone()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(url))
            .send()
            .await?;
        let response = ensure_success(&self.endpoint, response).await?;

        let body = response.text().await?;
        let decoded: ScrapeResponse = serde_json::from_str(&body)?;
        Self::into_markdown(url, decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TARGET: &str = "https://www.ptt.cc/bbs/Beauty/index.html";

    async fn fetcher_for(server: &MockServer, api_key: Option<&str>) -> FirecrawlFetcher {
        let firecrawl = FirecrawlConfig {
            endpoint: format!("{}/v1/scrape", server.uri()),
            ..FirecrawlConfig::default()
        };
        FirecrawlFetcher::new(
            &CrawlerConfig::default(),
            &firecrawl,
            api_key.map(str::to_string),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "url": TARGET,
                "headers": { "Cookie": "over18=1" },
                "formats": ["markdown"],
                "onlyMainContent": true,
                "waitFor": 1000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "markdown": "## [正妹] hello" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Some("secret")).await;
        assert_eq!(fetcher.fetch(TARGET).await.unwrap(), "## [正妹] hello");
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let server = MockServer::start().await;
        let fetcher = fetcher_for(&server, None).await;

        let err = fetcher.fetch(TARGET).await.unwrap_err();
        assert!(matches!(err, AppError::MissingCredential(ref name) if name == "FIRECRAWL_KEY"));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Some("secret")).await;
        match fetcher.fetch(TARGET).await.unwrap_err() {
            AppError::Status { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Some("secret")).await;
        assert!(matches!(
            fetcher.fetch(TARGET).await.unwrap_err(),
            AppError::Json(_)
        ));
    }

    #[tokio::test]
    async fn test_upstream_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": { "code": 402, "message": "payment required" }
            })))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Some("secret")).await;
        match fetcher.fetch(TARGET).await.unwrap_err() {
            AppError::Upstream { code, message } => {
                assert_eq!(code, 402);
                assert_eq!(message, "payment required");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsuccessful_without_payload() {
        let response: ScrapeResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(matches!(
            FirecrawlFetcher::into_markdown(TARGET, response),
            Err(AppError::Unsuccessful)
        ));
    }

    #[test]
    fn test_empty_markdown_on_success() {
        let response: ScrapeResponse =
            serde_json::from_str(r#"{"success": true, "data": {"markdown": ""}}"#).unwrap();
        assert!(matches!(
            FirecrawlFetcher::into_markdown(TARGET, response),
            Err(AppError::EmptyContent(_))
        ));
    }

    #[test]
    fn test_string_error_payload() {
        let response: ScrapeResponse =
            serde_json::from_str(r#"{"success": false, "error": "quota exceeded"}"#).unwrap();
        match FirecrawlFetcher::into_markdown(TARGET, response) {
            Err(AppError::Upstream { code, message }) => {
                assert_eq!(code, 0);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
