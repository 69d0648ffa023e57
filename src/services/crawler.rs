//! Board crawler: listing and per-post downloading for one site profile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::fetch::{ContentFetcher, HttpImageSource, ImageSource, build_fetcher};
use crate::models::{Article, Config, CrawlSession, PostRecord, SiteConfig};
use crate::services::downloader::{DownloadReport, DownloadWorkerPool};
use crate::services::extract::{SiteParser, parser_for};
use crate::services::links::ImageLinkNormalizer;
use crate::services::pagination::PaginationResolver;
use crate::storage::LocalStorage;
use crate::utils::sanitize_dir_name;

/// Outcome of [`BoardCrawler::download_post`].
#[derive(Debug)]
pub enum DownloadStatus {
    /// The post's directory already exists; nothing was fetched.
    AlreadyDownloaded(PathBuf),
    /// The post page yielded no title.
    NoArticle,
    /// Images were downloaded into `dir`.
    Completed { dir: PathBuf, report: DownloadReport },
}

/// Lists posts of one site and downloads their images.
pub struct BoardCrawler {
    site: SiteConfig,
    resolver: PaginationResolver,
    parser: Box<dyn SiteParser>,
    fetcher: Arc<dyn ContentFetcher>,
    normalizer: ImageLinkNormalizer,
    pool: DownloadWorkerPool,
    storage: LocalStorage,
    session: CrawlSession,
    max_pages: u32,
    post_url: Option<Regex>,
}

impl BoardCrawler {
    /// Create a crawler for `site` with explicit transports.
    pub fn new(
        site: SiteConfig,
        config: &Config,
        fetcher: Arc<dyn ContentFetcher>,
        images: Arc<dyn ImageSource>,
    ) -> Result<Self> {
        site.validate()?;

        let normalizer = ImageLinkNormalizer::new(&config.links);
        let parser = parser_for(&site, normalizer.clone())?;
        let post_url = site
            .post_url_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        Ok(Self {
            resolver: PaginationResolver::new(&site),
            parser,
            fetcher,
            normalizer,
            pool: DownloadWorkerPool::new(images, config.download.min_dimension),
            storage: LocalStorage::new(&config.download.base_dir),
            session: CrawlSession::new(),
            max_pages: config.listing.max_pages.max(1),
            post_url,
            site,
        })
    }

    /// Create a crawler for the configured site `site_id` with the
    /// transports its profile names.
    pub fn from_config(config: &Config, site_id: &str) -> Result<Self> {
        let site = config
            .site(site_id)
            .cloned()
            .ok_or_else(|| AppError::config(format!("unknown site '{site_id}'")))?;

        let fetcher = build_fetcher(site.fetcher, config)?;
        let images = Arc::new(HttpImageSource::new(&config.crawler, &config.links)?);
        Self::new(site, config, fetcher, images)
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    pub fn base_dir(&self) -> &Path {
        self.storage.root()
    }

    /// Whether `url` looks like a post of this site.
    pub fn has_valid_url(&self, url: &str) -> bool {
        self.post_url.as_ref().is_none_or(|re| re.is_match(url))
    }

    /// List page `page`, replacing or extending the session.
    ///
    /// Returns the session size. A failed fetch clears the session when
    /// replacing and leaves it untouched when appending.
    pub async fn list_page(&mut self, page: u32, replace: bool) -> usize {
        match self.fetch_listing(page).await {
            Some(posts) if replace => self.session.replace(posts),
            Some(posts) => self.session.append(posts),
            None => {
                if replace {
                    self.session.clear();
                }
                self.session.len()
            }
        }
    }

    /// Fetch and extract one listing page. `None` when the fetch failed.
    async fn fetch_listing(&self, page: u32) -> Option<Vec<PostRecord>> {
        let url = self.resolver.resolve(page);
        match self.fetcher.fetch(&url).await {
            Ok(raw) => {
                let posts = self.parser.extract_posts(&raw);
                log::info!("Listed {} posts from {url}", posts.len());
                Some(posts)
            }
            Err(e) => {
                log::warn!("Failed to fetch listing {url}: {e}");
                None
            }
        }
    }

    /// Replace the session with search results for `keyword`.
    pub async fn list_by_keyword(&mut self, keyword: &str) -> usize {
        let Some(url) = self.resolver.resolve_search(keyword) else {
            log::warn!("Site {} has no search", self.site.id);
            self.session.clear();
            return 0;
        };

        match self.fetcher.fetch(&url).await {
            Ok(raw) => {
                let posts = self.parser.extract_posts(&raw);
                log::info!("Found {} posts for '{keyword}'", posts.len());
                self.session.replace(posts)
            }
            Err(e) => {
                log::warn!("Failed to search for '{keyword}': {e}");
                self.session.clear();
                0
            }
        }
    }

    /// List pages from `start_page` onward until at least `min_count` posts
    /// are held.
    ///
    /// Stops early when a page fails to load or after the configured page
    /// limit. Pages whose posts are all filtered out do not stop the walk.
    pub async fn list_at_least(&mut self, min_count: usize, start_page: u32) -> usize {
        let mut count = self.list_page(start_page, true).await;
        let mut page = start_page;
        let mut fetched = 1;

        while count < min_count && fetched < self.max_pages {
            page = page.saturating_add(1);
            fetched += 1;
            let Some(posts) = self.fetch_listing(page).await else {
                log::info!("Listing stopped at page {page} with {count} posts");
                break;
            };
            count = self.session.append(posts);
        }
        count
    }

    /// Fetch and extract one post. A failed fetch yields an empty article.
    pub async fn fetch_article(&self, url: &str) -> Article {
        match self.fetcher.fetch(url).await {
            Ok(raw) => self.parser.extract_article(&raw),
            Err(e) => {
                log::warn!("Failed to fetch post {url}: {e}");
                Article::default()
            }
        }
    }

    /// Directory name for a post, relative to the download root.
    pub fn post_dir_name(&self, title: &str) -> String {
        format!("{} - {}", self.site.label, sanitize_dir_name(title))
    }

    /// Download every qualifying image of the post at `url`.
    ///
    /// Does nothing if the post's directory already exists.
    pub async fn download_post(&self, url: &str, concurrency: usize) -> Result<DownloadStatus> {
        let article = self.fetch_article(url).await;
        if !article.has_title() {
            log::warn!("No article found at {url}");
            return Ok(DownloadStatus::NoArticle);
        }

        let dir_name = self.post_dir_name(&article.title);
        if self.storage.exists(&dir_name).await {
            log::info!("Already downloaded: {dir_name}");
            return Ok(DownloadStatus::AlreadyDownloaded(self.storage.path(&dir_name)));
        }
        let dir = self.storage.ensure_dir(&dir_name).await?;

        let links: Vec<String> = article
            .image_urls
            .iter()
            .filter(|link| !self.site.restrict_image_hosts || self.normalizer.is_accepted_host(link))
            .map(|link| self.normalizer.normalize(link))
            .collect();
        if links.is_empty() {
            log::info!("No images in {url}");
        }

        log::info!("[{}] {} starting download", self.site.label, article.title);
        let report = self.pool.download(&dir, links, concurrency).await;
        Ok(DownloadStatus::Completed { dir, report })
    }
}
