//! Listed posts held by one crawler instance.

use crate::models::PostRecord;

/// The posts currently listed by a crawler, in listing order.
#[derive(Debug, Clone, Default)]
pub struct CrawlSession {
    posts: Vec<PostRecord>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored posts, returning the new count.
    pub fn replace(&mut self, posts: Vec<PostRecord>) -> usize {
        self.posts = posts;
        self.posts.len()
    }

    /// Append posts after the stored ones, returning the new count.
    pub fn append(&mut self, posts: Vec<PostRecord>) -> usize {
        self.posts.extend(posts);
        self.posts.len()
    }

    pub fn clear(&mut self) {
        self.posts.clear();
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn get(&self, index: usize) -> Option<&PostRecord> {
        self.posts.get(index)
    }

    /// Title at `index`, empty when out of range.
    pub fn title_at(&self, index: usize) -> &str {
        self.get(index).map_or("", |p| p.title.as_str())
    }

    /// URL at `index`, empty when out of range.
    pub fn url_at(&self, index: usize) -> &str {
        self.get(index).map_or("", |p| p.url.as_str())
    }

    /// Score at `index`, 0 when out of range.
    pub fn score_at(&self, index: usize) -> i32 {
        self.get(index).map_or(0, |p| p.score)
    }
}
