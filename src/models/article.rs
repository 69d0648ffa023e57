//! Article detail data structure.

use serde::{Deserialize, Serialize};

/// Detail-page extraction result.
///
/// Every field is independently optional: a missing author never prevents the
/// title or the images from being filled in. An empty `title` is how callers
/// recognize a failed fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub author: String,
    pub board: String,
    pub title: String,
    pub date: String,

    /// Image URLs in order of first appearance, duplicates kept
    pub image_urls: Vec<String>,

    /// Body text with image lines removed
    pub content: String,

    /// Always 0 for markdown pages, which carry no reaction tags
    pub likes: u32,

    /// Always 0 for markdown pages, which carry no reaction tags
    pub dislikes: u32,
}

impl Article {
    /// Whether extraction recovered a title.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Like and dislike counts as a pair.
    pub fn reactions(&self) -> (u32, u32) {
        (self.likes, self.dislikes)
    }
}
