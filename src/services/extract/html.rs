//! HTML listing and post extraction driven by configured CSS selectors.

use scraper::{ElementRef, Html, Selector};

use super::{CategoryFilter, SiteParser, parse_score};
use crate::error::{AppError, Result};
use crate::models::{Article, HtmlSelectors, PostRecord};
use crate::services::links::ImageLinkNormalizer;
use crate::utils::url::{absolutize, extract_post_id};

/// Attribute tried when the configured image attribute is missing.
const FALLBACK_IMAGE_ATTR: &str = "src";

/// Selectors compiled once per parser.
struct CompiledSelectors {
    row: Selector,
    link: Selector,
    score: Option<Selector>,
    article_title: Selector,
    image: Option<Selector>,
    body: Option<Selector>,
    anchor: Selector,
}

/// Parser for sites served as plain HTML.
pub struct HtmlParser {
    base_address: String,
    filter: CategoryFilter,
    normalizer: ImageLinkNormalizer,
    config: HtmlSelectors,
    selectors: CompiledSelectors,
}

impl HtmlParser {
    /// Create a parser, failing if any configured selector is invalid.
    pub fn new(
        base_address: &str,
        config: &HtmlSelectors,
        filter: CategoryFilter,
        normalizer: ImageLinkNormalizer,
    ) -> Result<Self> {
        let optional = |s: &Option<String>| s.as_deref().map(parse_selector).transpose();

        let selectors = CompiledSelectors {
            row: parse_selector(&config.row_selector)?,
            link: parse_selector(&config.link_selector)?,
            score: optional(&config.score_selector)?,
            article_title: parse_selector(&config.article_title_selector)?,
            image: optional(&config.image_selector)?,
            body: optional(&config.body_selector)?,
            anchor: parse_selector("a[href]")?,
        };

        Ok(Self {
            base_address: base_address.to_string(),
            filter,
            normalizer,
            config: config.clone(),
            selectors,
        })
    }

    fn parse_row(&self, row: &ElementRef) -> Option<PostRecord> {
        // The last link in a row is the post link.
        let link = row.select(&self.selectors.link).last()?;
        let title = link
            .value()
            .attr(&self.config.title_attr)
            .unwrap_or_default()
            .trim();
        let href = link
            .value()
            .attr(&self.config.link_attr)
            .unwrap_or_default()
            .trim();

        if href.is_empty() {
            return None;
        }
        if !self.filter.accepts(title) {
            log::debug!("Skipping post outside category: {title}");
            return None;
        }

        let url = absolutize(&self.base_address, href);
        Some(PostRecord {
            id: extract_post_id(&url),
            title: title.to_string(),
            url,
            score: self.parse_row_score(row),
            ..PostRecord::default()
        })
    }

    /// Score from the last counter element whose text carries the prefix.
    fn parse_row_score(&self, row: &ElementRef) -> i32 {
        let Some(score_sel) = &self.selectors.score else {
            return 0;
        };
        let prefix = self.config.score_prefix.as_str();

        row.select(score_sel)
            .filter_map(|el| el.value().attr(&self.config.score_attr))
            .filter(|text| prefix.is_empty() || text.contains(prefix))
            .last()
            .map_or(0, |text| {
                if prefix.is_empty() {
                    parse_score(text)
                } else {
                    parse_score(&text.replace(prefix, ""))
                }
            })
    }

    fn image_urls(&self, document: &Html) -> Vec<String> {
        let Some(image_sel) = &self.selectors.image else {
            return self.harvest_image_links(document);
        };

        let images: Vec<String> = document
            .select(image_sel)
            .filter_map(|img| {
                img.value()
                    .attr(&self.config.image_attr)
                    .or_else(|| img.value().attr(FALLBACK_IMAGE_ATTR))
            })
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(|link| self.normalizer.normalize(link))
            .collect();

        if images.is_empty() {
            log::debug!("No images under selector, harvesting page links");
            return self.harvest_image_links(document);
        }
        images
    }

    /// Every link on the page that targets an allow-listed image host.
    fn harvest_image_links(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selectors.anchor)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| self.normalizer.is_accepted_host(href))
            .map(|href| self.normalizer.normalize(href))
            .collect()
    }
}

impl SiteParser for HtmlParser {
    fn extract_posts(&self, raw: &str) -> Vec<PostRecord> {
        let document = Html::parse_document(raw);
        let posts: Vec<PostRecord> = document
            .select(&self.selectors.row)
            .filter_map(|row| self.parse_row(&row))
            .collect();

        if posts.is_empty() && !raw.is_empty() {
            log::info!(
                "No rows matched '{}' in listing",
                self.config.row_selector
            );
        }
        posts
    }

    fn extract_article(&self, raw: &str) -> Article {
        let document = Html::parse_document(raw);

        let title = document
            .select(&self.selectors.article_title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let content = self
            .selectors
            .body
            .as_ref()
            .and_then(|sel| document.select(sel).next())
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .unwrap_or_default();

        Article {
            title,
            image_urls: self.image_urls(&document),
            content,
            ..Article::default()
        }
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
