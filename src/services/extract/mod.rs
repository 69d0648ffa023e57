//! Page content extraction.
//!
//! Turns raw listing and post pages into [`PostRecord`]s and [`Article`]s.
//! Extraction never fails: unparseable input yields fewer records or
//! emptier fields, never an error.
//!
//! ```text
//! extract/
//! ├── markdown.rs   # Markdown pages (pattern matching)
//! └── html.rs       # HTML pages (CSS selectors)
//! ```

pub mod html;
pub mod markdown;

use crate::error::{AppError, Result};
use crate::models::{Article, ContentFormat, PostRecord, SiteConfig};
use crate::services::links::ImageLinkNormalizer;

pub use html::HtmlParser;
pub use markdown::MarkdownParser;

/// Token a listing shows for a maxed-out interest counter.
const FULL_SCORE_TOKEN: &str = "爆";

/// Score assigned to [`FULL_SCORE_TOKEN`].
const FULL_SCORE: i32 = 100;

/// Site-specific parser for listing and post pages.
pub trait SiteParser: Send + Sync {
    /// Extract the listed posts that pass the category filter, in page order.
    fn extract_posts(&self, raw: &str) -> Vec<PostRecord>;

    /// Extract post details. Missing parts are left empty.
    fn extract_article(&self, raw: &str) -> Article;
}

/// Title-prefix check selecting the posts of interest.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    marker: Option<String>,
}

impl CategoryFilter {
    /// A filter that keeps titles starting with `marker`, or everything if `None`.
    pub fn new(marker: Option<&str>) -> Self {
        Self {
            marker: marker.filter(|m| !m.is_empty()).map(str::to_string),
        }
    }

    pub fn accepts(&self, title: &str) -> bool {
        match &self.marker {
            Some(marker) => title.starts_with(marker.as_str()),
            None => true,
        }
    }
}

/// Convert a raw interest token to a score.
///
/// `爆` is 100, `X` followed by anything is 0, anything else that is not an
/// integer is 0.
pub fn parse_score(token: &str) -> i32 {
    let token = token.trim();
    if token == FULL_SCORE_TOKEN {
        return FULL_SCORE;
    }
    if token.starts_with('X') {
        return 0;
    }
    token.parse().unwrap_or(0)
}

/// Build the parser a site profile asks for.
pub fn parser_for(
    site: &SiteConfig,
    normalizer: ImageLinkNormalizer,
) -> Result<Box<dyn SiteParser>> {
    let filter = CategoryFilter::new(site.category_marker.as_deref());
    let parser: Box<dyn SiteParser> = match site.format {
        ContentFormat::Markdown => Box::new(MarkdownParser::new(
            &site.base_address,
            filter,
            normalizer,
        )),
        ContentFormat::Html => {
            let selectors = site.selectors.as_ref().ok_or_else(|| {
                AppError::config(format!("site '{}' needs selectors for html", site.id))
            })?;
            Box::new(HtmlParser::new(
                &site.base_address,
                selectors,
                filter,
                normalizer,
            )?)
        }
    };
    Ok(parser)
}

/// First `limit` characters of `raw`, for diagnostics.
pub(crate) fn preview(raw: &str, limit: usize) -> String {
    raw.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("爆"), 100);
        assert_eq!(parse_score(" 爆 "), 100);
        assert_eq!(parse_score("X1"), 0);
        assert_eq!(parse_score("XX"), 0);
        assert_eq!(parse_score(""), 0);
        assert_eq!(parse_score("abc"), 0);
        assert_eq!(parse_score("42"), 42);
    }

    #[test]
    fn test_category_filter() {
        let filter = CategoryFilter::new(Some("[正妹]"));
        assert!(filter.accepts("[正妹] hello"));
        assert!(!filter.accepts("Re: [正妹] hello"));
        assert!(!filter.accepts("[公告] rules"));

        let open = CategoryFilter::new(None);
        assert!(open.accepts("anything"));
    }

    #[test]
    fn test_parser_for_default_sites() {
        let config = Config::default();
        for site in &config.sites {
            assert!(parser_for(site, ImageLinkNormalizer::default()).is_ok());
        }
    }

    #[test]
    fn test_parser_for_html_without_selectors() {
        let mut site = Config::default().site("ck101").unwrap().clone();
        site.selectors = None;
        assert!(matches!(
            parser_for(&site, ImageLinkNormalizer::default()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("正妹正妹", 2), "正妹");
    }
}
