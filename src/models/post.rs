//! Post record data structure.

use serde::{Deserialize, Serialize};

/// One entry of a board listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostRecord {
    /// Post identifier derived from the URL's file name (empty if unknown)
    pub id: String,

    /// Post title, including its category tag
    pub title: String,

    /// Absolute URL of the post page
    pub url: String,

    /// Interest counter after score conversion
    pub score: i32,

    /// Author name when the listing shows one
    #[serde(default)]
    pub author: String,

    /// Listing date when the listing shows one
    #[serde(default)]
    pub date: String,
}

impl PostRecord {
    /// Format a post for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{title}`, `{url}`, `{score}`, `{author}`, `{date}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{title}", &self.title)
            .replace("{url}", &self.url)
            .replace("{score}", &self.score.to_string())
            .replace("{author}", &self.author)
            .replace("{date}", &self.date)
    }
}
