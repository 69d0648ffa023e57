//! Listing page address resolution.

use url::form_urlencoded::byte_serialize;

use crate::models::SiteConfig;

/// Maps logical page numbers and search keywords to listing URLs.
///
/// Page 0 is always the site's entry page. Any other page is a literal index:
/// `{page}` in the template is replaced by `page + page_offset`.
#[derive(Debug, Clone)]
pub struct PaginationResolver {
    entry_address: String,
    page_template: String,
    page_offset: u32,
    search_address: Option<String>,
}

impl PaginationResolver {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            entry_address: site.entry_address.clone(),
            page_template: site.page_template.clone(),
            page_offset: site.page_offset,
            search_address: site.search_address.clone(),
        }
    }

    /// URL of listing page `page`.
    pub fn resolve(&self, page: u32) -> String {
        if page == 0 {
            return self.entry_address.clone();
        }
        let index = page.saturating_add(self.page_offset);
        self.page_template.replace("{page}", &index.to_string())
    }

    /// URL of the search results for `keyword`, if the site has search.
    pub fn resolve_search(&self, keyword: &str) -> Option<String> {
        let base = self.search_address.as_ref()?;
        let escaped: String = byte_serialize(keyword.as_bytes()).collect();
        Some(format!("{base}{escaped}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    fn resolver(id: &str) -> PaginationResolver {
        PaginationResolver::new(Config::default().site(id).unwrap())
    }

    #[test]
    fn test_page_zero_is_entry() {
        assert_eq!(
            resolver("ptt").resolve(0),
            "https://www.ptt.cc/bbs/Beauty/index.html"
        );
        assert_eq!(
            resolver("ck101").resolve(0),
            "http://ck101.com/forum-1345-1.html"
        );
    }

    #[test]
    fn test_page_is_literal_index() {
        assert_eq!(
            resolver("ptt").resolve(3931),
            "https://www.ptt.cc/bbs/Beauty/index3931.html"
        );
    }

    #[test]
    fn test_page_offset_applied() {
        assert_eq!(
            resolver("ck101").resolve(1),
            "http://ck101.com/forum-1345-2.html"
        );
    }

    #[test]
    fn test_search_escapes_keyword() {
        assert_eq!(
            resolver("ptt").resolve_search("cute cat").as_deref(),
            Some("https://www.ptt.cc/bbs/Beauty/search?q=cute+cat")
        );
        assert_eq!(
            resolver("ptt").resolve_search("正妹").as_deref(),
            Some("https://www.ptt.cc/bbs/Beauty/search?q=%E6%AD%A3%E5%A6%B9")
        );
    }

    #[test]
    fn test_search_unsupported() {
        assert_eq!(resolver("ck101").resolve_search("anything"), None);
    }
}
