//! Image link normalization and host allow-listing.

use crate::models::LinkConfig;

/// Canonicalizes discovered image links and decides which are downloadable.
#[derive(Debug, Clone)]
pub struct ImageLinkNormalizer {
    accepted_hosts: Vec<String>,
    share_prefix: String,
    direct_prefix: String,
    default_extension: String,
}

impl ImageLinkNormalizer {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            accepted_hosts: config.accepted_hosts.clone(),
            share_prefix: config.share_prefix.clone(),
            direct_prefix: config.direct_prefix.clone(),
            default_extension: config.default_extension.clone(),
        }
    }

    /// Rewrite share links to the direct image host; other links pass through.
    ///
    /// Share links carry no extension, so the default one is appended.
    pub fn normalize(&self, link: &str) -> String {
        if self.share_prefix.is_empty() || !link.contains(&self.share_prefix) {
            return link.to_string();
        }
        let image_id = link.rsplit('/').next().unwrap_or_default();
        format!(
            "{}{}.{}",
            self.direct_prefix, image_id, self.default_extension
        )
    }

    /// Whether `link` points at an allow-listed image host.
    pub fn is_accepted_host(&self, link: &str) -> bool {
        self.accepted_hosts.iter().any(|host| link.contains(host))
    }
}

impl Default for ImageLinkNormalizer {
    fn default() -> Self {
        Self::new(&LinkConfig::default())
    }
}
