//! Markdown listing and post extraction.
//!
//! Listing pages are a run of blocks:
//!
//! ```text
//! ## [正妹] Post title
//! [Post title](https://www.ptt.cc/bbs/Beauty/M.1700000000.A.ABC.html)
//! Author: someone Date: 1/02 Push: 爆
//! ```
//!
//! Post pages open with a bolded metadata block (`**Author**:`, `**Board**:`,
//! `**Title**:`, `**Date**:`), followed by the body and a signature/comment
//! trailer.

use std::sync::LazyLock;

use regex::Regex;

use super::{CategoryFilter, SiteParser, parse_score, preview};
use crate::models::{Article, PostRecord};
use crate::services::links::ImageLinkNormalizer;
use crate::utils::url::{absolutize, extract_post_id};

static POST_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^##[ \t]*(.*?)[ \t]*\n.*?\[.*?\]\((.*?)\)[ \t]*\nAuthor:[ \t]*(.*?)[ \t]*Date:[ \t]*(.*?)[ \t]*Push:[ \t]*(.*)",
    )
    .unwrap()
});

static METADATA_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\*\*Author\*\*:[ \t]*(.*?)(?:[ \t]*\(.*?\))?[ \t]*\n\*\*Board\*\*:[ \t]*(.*?)[ \t]*\n\*\*Title\*\*:[ \t]*(.*?)[ \t]*\n\*\*Date\*\*:[ \t]*(.*?)[ \t]*$",
    )
    .unwrap()
});

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*Title\*\*:[ \t]*(.*)").unwrap());

static IMAGE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[.*?\]\((https?://\S+?\.(?:jpg|jpeg|png|gif|bmp|webp))\)").unwrap()
});

static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:--\s*$|※\s(?:發信站|編輯|轉錄至看板|推噓紀錄).*|推\s|噓\s|→\s|◆\sFrom:)")
        .unwrap()
});

/// Characters of unmatched input included in the diagnostic log.
const PREVIEW_CHARS: usize = 500;

/// How much of the metadata block a strategy recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Author, board, title and date.
    Full,
    /// Title only.
    TitleOnly,
}

/// Metadata recovered from a post page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataMatch {
    pub author: String,
    pub board: String,
    pub title: String,
    pub date: String,
    /// Byte offset just past the matched text, where the body starts.
    pub end: usize,
    pub confidence: Confidence,
}

type MetadataStrategy = fn(&str) -> Option<MetadataMatch>;

/// Metadata strategies, most complete first.
const METADATA_STRATEGIES: &[(&str, MetadataStrategy)] = &[
    ("metadata-block", metadata_block),
    ("title-line", title_line),
];

fn metadata_block(raw: &str) -> Option<MetadataMatch> {
    let caps = METADATA_BLOCK.captures(raw)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str()).trim().to_string();

    Some(MetadataMatch {
        author: field(1),
        board: field(2),
        title: field(3),
        date: field(4),
        end: caps.get(0).map_or(0, |m| m.end()),
        confidence: Confidence::Full,
    })
}

fn title_line(raw: &str) -> Option<MetadataMatch> {
    let caps = TITLE_LINE.captures(raw)?;
    let title = caps.get(1).map_or("", |m| m.as_str()).trim();
    if title.is_empty() {
        return None;
    }

    Some(MetadataMatch {
        author: String::new(),
        board: String::new(),
        title: title.to_string(),
        date: String::new(),
        end: caps.get(0).map_or(0, |m| m.end()),
        confidence: Confidence::TitleOnly,
    })
}

/// Run the metadata strategies in order and keep the first hit.
pub fn match_metadata(raw: &str) -> Option<MetadataMatch> {
    METADATA_STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(raw)?;
        if found.confidence != Confidence::Full {
            log::debug!("Metadata recovered by fallback strategy '{name}'");
        }
        Some(found)
    })
}

/// Body text between `start` and the first signature marker after it, with
/// image lines removed.
fn slice_content(raw: &str, start: usize) -> String {
    let rest = raw.get(start..).unwrap_or_default();
    let end = SIGNATURE.find(rest).map_or(rest.len(), |m| m.start());

    rest[..end]
        .split('\n')
        .filter(|line| !IMAGE_MARKUP.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Parser for sites served as Markdown by the extraction API.
pub struct MarkdownParser {
    base_address: String,
    filter: CategoryFilter,
    normalizer: ImageLinkNormalizer,
}

impl MarkdownParser {
    pub fn new(base_address: &str, filter: CategoryFilter, normalizer: ImageLinkNormalizer) -> Self {
        Self {
            base_address: base_address.to_string(),
            filter,
            normalizer,
        }
    }

    /// Every image referenced by image markup, in order, normalized.
    fn image_urls(&self, raw: &str) -> Vec<String> {
        IMAGE_MARKUP
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1))
            .map(|m| self.normalizer.normalize(m.as_str()))
            .collect()
    }
}

impl SiteParser for MarkdownParser {
    fn extract_posts(&self, raw: &str) -> Vec<PostRecord> {
        let mut posts = Vec::new();
        let mut matched = 0usize;

        for caps in POST_BLOCK.captures_iter(raw) {
            matched += 1;
            let field = |i: usize| caps.get(i).map_or("", |m| m.as_str()).trim();

            let title = field(1);
            if !self.filter.accepts(title) {
                log::debug!("Skipping post outside category: {title}");
                continue;
            }

            let href = field(2);
            if href.is_empty() {
                continue;
            }
            let url = absolutize(&self.base_address, href);

            posts.push(PostRecord {
                id: extract_post_id(&url),
                title: title.to_string(),
                url,
                score: parse_score(field(5)),
                author: field(3).to_string(),
                date: field(4).to_string(),
            });
        }

        if matched == 0 && !raw.is_empty() {
            log::info!(
                "No posts found in listing. Sample: {}",
                preview(raw, PREVIEW_CHARS)
            );
        }
        posts
    }

    fn extract_article(&self, raw: &str) -> Article {
        let metadata = match_metadata(raw);
        if metadata.is_none() && !raw.is_empty() {
            log::debug!("No metadata found in post page");
        }

        let start = metadata.as_ref().map_or(0, |m| m.end);
        let mut article = Article {
            image_urls: self.image_urls(raw),
            content: slice_content(raw, start),
            ..Article::default()
        };
        if let Some(metadata) = metadata {
            article.author = metadata.author;
            article.board = metadata.board;
            article.title = metadata.title;
            article.date = metadata.date;
        }
        article
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
## [正妹] First post
[[正妹] First post](https://www.ptt.cc/bbs/Beauty/M.1700000001.A.AAA.html)
Author: alice Date: 1/02 Push: 爆

## [公告] Board rules
[[公告] Board rules](https://www.ptt.cc/bbs/Beauty/M.1700000002.A.BBB.html)
Author: mod Date: 1/02 Push: 5

## [正妹] Second post
[[正妹] Second post](/bbs/Beauty/M.1700000003.A.CCC.html)
Author: bob Date: 1/03 Push: X2

## [正妹] Third post
[[正妹] Third post](https://www.ptt.cc/bbs/Beauty/M.1700000004.A.DDD.html)
Author: carol Date: 1/03 Push: 42
";

    const ARTICLE: &str = "\
**Author**: alice (Alice A.)
**Board**: Beauty
**Title**: [正妹] First post
**Date**: Tue Jan  2 10:00:00 2024

Hello there.
![](https://i.imgur.com/abc123.jpg)
Second line.
![pic](https://i.imgur.com/def456.png)

--
※ 發信站: 批踢踢實業坊(ptt.cc)
推 someone: nice
";

    fn parser() -> MarkdownParser {
        MarkdownParser::new(
            "https://www.ptt.cc",
            CategoryFilter::new(Some("[正妹]")),
            ImageLinkNormalizer::default(),
        )
    }

    #[test]
    fn test_extract_posts_filters_in_order() {
        let posts = parser().extract_posts(LISTING);
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            ["[正妹] First post", "[正妹] Second post", "[正妹] Third post"]
        );

        assert_eq!(posts[0].score, 100);
        assert_eq!(posts[0].id, "M.1700000001.A.AAA");
        assert_eq!(posts[0].author, "alice");
        assert_eq!(posts[0].date, "1/02");

        assert_eq!(posts[1].score, 0);
        assert_eq!(
            posts[1].url,
            "https://www.ptt.cc/bbs/Beauty/M.1700000003.A.CCC.html"
        );

        assert_eq!(posts[2].score, 42);
    }

    #[test]
    fn test_extract_posts_unmatched_input() {
        assert!(parser().extract_posts("just some text").is_empty());
        assert!(parser().extract_posts("").is_empty());
    }

    #[test]
    fn test_extract_posts_empty_push_keeps_next_block() {
        let raw = "\
## [正妹] One
[[正妹] One](/bbs/Beauty/M.1700000010.A.AAA.html)
Author: a Date: 1/05 Push:

## [正妹] Two
[[正妹] Two](/bbs/Beauty/M.1700000011.A.BBB.html)
Author: b Date: 1/05 Push: 5
";
        let posts = parser().extract_posts(raw);
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["[正妹] One", "[正妹] Two"]);
        assert_eq!(posts[0].score, 0);
        assert_eq!(posts[1].score, 5);
    }

    #[test]
    fn test_extract_article_full_metadata() {
        let article = parser().extract_article(ARTICLE);
        assert_eq!(article.author, "alice");
        assert_eq!(article.board, "Beauty");
        assert_eq!(article.title, "[正妹] First post");
        assert_eq!(article.date, "Tue Jan  2 10:00:00 2024");
        assert_eq!(
            article.image_urls,
            [
                "https://i.imgur.com/abc123.jpg",
                "https://i.imgur.com/def456.png"
            ]
        );
        assert_eq!(article.content, "Hello there.\nSecond line.");
        assert_eq!(article.reactions(), (0, 0));
    }

    #[test]
    fn test_extract_article_title_fallback() {
        let raw = "\
Some header
**Title**: [正妹] Only title
Body text
![](https://i.imgur.com/xyz.jpeg)
推 fan: +1
";
        let article = parser().extract_article(raw);
        assert_eq!(article.title, "[正妹] Only title");
        assert!(article.author.is_empty());
        assert_eq!(article.image_urls, ["https://i.imgur.com/xyz.jpeg"]);
        assert_eq!(article.content, "Body text");
    }

    #[test]
    fn test_extract_article_empty_title_line() {
        let article = parser().extract_article("**Title**:\n\nBody text here\n");
        assert!(!article.has_title());
        assert_eq!(match_metadata("**Title**:   \nnext line"), None);
    }

    #[test]
    fn test_metadata_block_empty_fields_stay_on_their_line() {
        let raw = "**Author**:\n**Board**: Beauty\n**Title**: [正妹] t\n**Date**:\n\nBody";
        let found = match_metadata(raw).unwrap();
        assert_eq!(found.confidence, Confidence::Full);
        assert_eq!(found.author, "");
        assert_eq!(found.board, "Beauty");
        assert_eq!(found.title, "[正妹] t");
        assert_eq!(found.date, "");
    }

    #[test]
    fn test_extract_article_without_metadata() {
        let raw = "Intro\n![](https://pbs.twimg.com/media/pic.jpg)\nOutro";
        let article = parser().extract_article(raw);
        assert!(!article.has_title());
        assert_eq!(article.image_urls, ["https://pbs.twimg.com/media/pic.jpg"]);
        assert_eq!(article.content, "Intro\nOutro");
    }

    #[test]
    fn test_duplicate_images_kept() {
        let raw = "![](https://i.imgur.com/a.jpg)\n![](https://i.imgur.com/a.jpg)";
        let article = parser().extract_article(raw);
        assert_eq!(article.image_urls.len(), 2);
    }

    #[test]
    fn test_match_metadata_confidence() {
        assert_eq!(
            match_metadata(ARTICLE).map(|m| m.confidence),
            Some(Confidence::Full)
        );
        assert_eq!(
            match_metadata("**Title**: t").map(|m| m.confidence),
            Some(Confidence::TitleOnly)
        );
        assert_eq!(match_metadata("nothing"), None);
    }
}
