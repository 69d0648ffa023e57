// src/models/mod.rs

//! Domain models for the crawler.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod article;
mod config;
mod post;
mod selectors;
mod session;

// Re-export all public types
pub use article::Article;
pub use config::{
    Config, ContentFormat, CrawlerConfig, DownloadConfig, FetcherKind, FirecrawlConfig,
    LinkConfig, ListingConfig, SiteConfig,
};
pub use post::PostRecord;
pub use selectors::HtmlSelectors;
pub use session::CrawlSession;
