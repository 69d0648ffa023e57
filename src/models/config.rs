//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::HtmlSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by every fetcher
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Web content extraction service settings
    #[serde(default)]
    pub firecrawl: FirecrawlConfig,

    /// Image download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Image link normalization rules
    #[serde(default)]
    pub links: LinkConfig,

    /// Listing behavior
    #[serde(default)]
    pub listing: ListingConfig,

    /// Site profiles
    #[serde(default = "defaults::default_sites")]
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Look up a site profile by id.
    pub fn site(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.firecrawl.endpoint.trim().is_empty() {
            return Err(AppError::validation("firecrawl.endpoint is empty"));
        }
        if self.firecrawl.api_key_env.trim().is_empty() {
            return Err(AppError::validation("firecrawl.api_key_env is empty"));
        }
        if self.download.workers == 0 {
            return Err(AppError::validation("download.workers must be > 0"));
        }
        if self.listing.max_pages == 0 {
            return Err(AppError::validation("listing.max_pages must be > 0"));
        }
        if self.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        for site in &self.sites {
            site.validate()?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            firecrawl: FirecrawlConfig::default(),
            download: DownloadConfig::default(),
            links: LinkConfig::default(),
            listing: ListingConfig::default(),
            sites: defaults::default_sites(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Age-gate cookie sent with page requests
    #[serde(default = "defaults::cookie")]
    pub cookie: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            cookie: defaults::cookie(),
        }
    }
}

/// Web content extraction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirecrawlConfig {
    /// Scrape endpoint
    #[serde(default = "defaults::firecrawl_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the bearer token
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// Milliseconds the service waits before capturing the page
    #[serde(default = "defaults::wait_for")]
    pub wait_for_ms: u64,

    /// Strip navigation and chrome from the returned markdown
    #[serde(default = "defaults::only_main_content")]
    pub only_main_content: bool,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::firecrawl_endpoint(),
            api_key_env: defaults::api_key_env(),
            wait_for_ms: defaults::wait_for(),
            only_main_content: defaults::only_main_content(),
        }
    }
}

/// Image download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root folder for per-post directories
    #[serde(default = "defaults::base_dir")]
    pub base_dir: PathBuf,

    /// Number of concurrent download workers
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    /// Images must exceed this size on both axes to be stored
    #[serde(default = "defaults::min_dimension")]
    pub min_dimension: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_dir: defaults::base_dir(),
            workers: defaults::workers(),
            min_dimension: defaults::min_dimension(),
        }
    }
}

/// Image link normalization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// URL prefixes of hosts eligible for download
    #[serde(default = "defaults::accepted_hosts")]
    pub accepted_hosts: Vec<String>,

    /// Prefix of abbreviated share links
    #[serde(default = "defaults::share_prefix")]
    pub share_prefix: String,

    /// Prefix share links are rewritten to
    #[serde(default = "defaults::direct_prefix")]
    pub direct_prefix: String,

    /// Extension appended to rewritten share links
    #[serde(default = "defaults::default_extension")]
    pub default_extension: String,

    /// Host whose image requests need a Referer
    #[serde(default = "defaults::referer_host")]
    pub referer_host: String,

    /// Referer prefix, followed by the image stem
    #[serde(default = "defaults::referer_prefix")]
    pub referer_prefix: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            accepted_hosts: defaults::accepted_hosts(),
            share_prefix: defaults::share_prefix(),
            direct_prefix: defaults::direct_prefix(),
            default_extension: defaults::default_extension(),
            referer_host: defaults::referer_host(),
            referer_prefix: defaults::referer_prefix(),
        }
    }
}

/// Listing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Upper bound on pages fetched by a single `list_at_least` call
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_pages: defaults::max_pages(),
        }
    }
}

/// Raw content format a site is fetched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    Html,
}

/// Transport used to fetch a site's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    Firecrawl,
    Direct,
}

/// A crawlable site profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Profile identifier (e.g., "ptt")
    pub id: String,

    /// Label used in download folder names (e.g., "PTT")
    pub label: String,

    /// Prefix for relative post links
    pub base_address: String,

    /// Latest listing page
    pub entry_address: String,

    /// Listing page for `page > 0`; `{page}` is replaced by the index
    pub page_template: String,

    /// Added to the page number before substitution
    #[serde(default)]
    pub page_offset: u32,

    /// Search endpoint, keyword is appended URL-escaped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_address: Option<String>,

    /// Required title prefix; every title passes when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_marker: Option<String>,

    /// Raw content format
    pub format: ContentFormat,

    /// Transport
    pub fetcher: FetcherKind,

    /// Selectors for HTML profiles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<HtmlSelectors>,

    /// Apply the host allow-list before downloading
    #[serde(default)]
    pub restrict_image_hosts: bool,

    /// Pattern a downloadable post URL must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_url_pattern: Option<String>,
}

impl SiteConfig {
    /// Validate a single site profile.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("site id is empty"));
        }
        if self.label.trim().is_empty() {
            return Err(AppError::validation(format!("site {}: label is empty", self.id)));
        }
        if self.entry_address.trim().is_empty() {
            return Err(AppError::validation(format!(
                "site {}: entry_address is empty",
                self.id
            )));
        }
        url::Url::parse(&self.entry_address)?;
        url::Url::parse(&self.base_address)?;
        if !self.page_template.contains("{page}") {
            return Err(AppError::validation(format!(
                "site {}: page_template has no {{page}} placeholder",
                self.id
            )));
        }
        if self.format == ContentFormat::Html && self.selectors.is_none() {
            return Err(AppError::validation(format!(
                "site {}: html sites need selectors",
                self.id
            )));
        }
        Ok(())
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::{ContentFormat, FetcherKind, SiteConfig};
    use crate::models::HtmlSelectors;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn cookie() -> String {
        "over18=1".into()
    }

    // Extraction service defaults
    pub fn firecrawl_endpoint() -> String {
        "https://api.firecrawl.dev/v1/scrape".into()
    }
    pub fn api_key_env() -> String {
        "FIRECRAWL_KEY".into()
    }
    pub fn wait_for() -> u64 {
        1000
    }
    pub fn only_main_content() -> bool {
        true
    }

    // Download defaults
    pub fn base_dir() -> PathBuf {
        PathBuf::from("downloads")
    }
    pub fn workers() -> usize {
        25
    }
    pub fn min_dimension() -> u32 {
        300
    }

    // Link defaults
    pub fn accepted_hosts() -> Vec<String> {
        vec![
            "https://i.imgur.com/".into(),
            "http://i.imgur.com/".into(),
            "https://pbs.twimg.com/".into(),
            "https://imgur.com/".into(),
            "https://i.meee.com.tw/".into(),
            "https://i.ytimg.com/".into(),
            "https://d.img.vision/".into(),
        ]
    }
    pub fn share_prefix() -> String {
        "https://imgur.com/".into()
    }
    pub fn direct_prefix() -> String {
        "https://i.imgur.com/".into()
    }
    pub fn default_extension() -> String {
        "jpeg".into()
    }
    pub fn referer_host() -> String {
        "i.imgur.com".into()
    }
    pub fn referer_prefix() -> String {
        "https://imgur.com/".into()
    }

    // Listing defaults
    pub fn max_pages() -> u32 {
        10
    }

    // Site defaults
    pub fn default_sites() -> Vec<SiteConfig> {
        vec![
            SiteConfig {
                id: "ptt".to_string(),
                label: "PTT".to_string(),
                base_address: "https://www.ptt.cc".to_string(),
                entry_address: "https://www.ptt.cc/bbs/Beauty/index.html".to_string(),
                page_template: "https://www.ptt.cc/bbs/Beauty/index{page}.html".to_string(),
                page_offset: 0,
                search_address: Some("https://www.ptt.cc/bbs/Beauty/search?q=".to_string()),
                category_marker: Some("[正妹]".to_string()),
                format: ContentFormat::Markdown,
                fetcher: FetcherKind::Firecrawl,
                selectors: None,
                restrict_image_hosts: true,
                post_url_pattern: Some(r"M\.\d+\.".to_string()),
            },
            SiteConfig {
                id: "ck101".to_string(),
                label: "CK101".to_string(),
                base_address: "https://www.CK101.cc".to_string(),
                entry_address: "http://ck101.com/forum-1345-1.html".to_string(),
                page_template: "http://ck101.com/forum-1345-{page}.html".to_string(),
                page_offset: 1,
                search_address: None,
                category_marker: None,
                format: ContentFormat::Html,
                fetcher: FetcherKind::Direct,
                selectors: Some(HtmlSelectors::default()),
                restrict_image_hosts: false,
                post_url_pattern: None,
            },
        ]
    }
}
