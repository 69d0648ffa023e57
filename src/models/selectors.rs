// src/models/selectors.rs

//! CSS selectors for scraping an HTML board.

use serde::{Deserialize, Serialize};

/// CSS selectors for scraping an HTML board and its post pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSelectors {
    /// Selector for each post block in the listing
    pub row_selector: String,

    /// Selector for the link element within a row (the last match wins)
    pub link_selector: String,

    /// Attribute holding the post title on the link element
    #[serde(default = "default_title_attr")]
    pub title_attr: String,

    /// Attribute holding the post URL on the link element
    #[serde(default = "default_link_attr")]
    pub link_attr: String,

    /// Selector for the element carrying the interest counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_selector: Option<String>,

    /// Attribute holding the counter text
    #[serde(default = "default_title_attr")]
    pub score_attr: String,

    /// Prefix marking the counter text (e.g., "查看")
    #[serde(default)]
    pub score_prefix: String,

    /// Selector for the post title on the detail page
    pub article_title_selector: String,

    /// Selector for images inside the post body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_selector: Option<String>,

    /// Attribute holding the image URL (falls back to `src`)
    #[serde(default = "default_image_attr")]
    pub image_attr: String,

    /// Selector for the post body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_selector: Option<String>,
}

fn default_title_attr() -> String {
    "title".to_string()
}

fn default_link_attr() -> String {
    "href".to_string()
}

fn default_image_attr() -> String {
    "src".to_string()
}

impl Default for HtmlSelectors {
    fn default() -> Self {
        Self {
            row_selector: ".cl_box".to_string(),
            link_selector: "a".to_string(),
            title_attr: default_title_attr(),
            link_attr: default_link_attr(),
            score_selector: Some("em".to_string()),
            score_attr: default_title_attr(),
            score_prefix: "查看".to_string(),
            article_title_selector: "h1".to_string(),
            image_selector: Some("div[itemprop=articleBody] img".to_string()),
            image_attr: "file".to_string(),
            body_selector: Some("div[itemprop=articleBody]".to_string()),
        }
    }
}
