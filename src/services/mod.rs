//! Crawling services.
//!
//! ```text
//! services/
//! ├── pagination.rs   # Page number and keyword -> listing URL
//! ├── extract/        # Raw page -> posts and articles
//! ├── links.rs        # Image link normalization and allow-list
//! ├── downloader.rs   # Bounded concurrent image downloads
//! └── crawler.rs      # Listing session and per-post downloads
//! ```

pub mod crawler;
pub mod downloader;
pub mod extract;
pub mod links;
pub mod pagination;

// Re-export for convenience
pub use crawler::{BoardCrawler, DownloadStatus};
pub use downloader::{DownloadReport, DownloadWorkerPool, ItemResult, ItemStatus};
pub use extract::{CategoryFilter, SiteParser, parse_score, parser_for};
pub use links::ImageLinkNormalizer;
pub use pagination::PaginationResolver;
