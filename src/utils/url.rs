// src/utils/url.rs

//! URL manipulation utilities.

/// Make a post link absolute by prefixing the site's base address.
///
/// # Examples
/// ```
/// use photomgr::utils::url::absolutize;
///
/// assert_eq!(
///     absolutize("https://www.ptt.cc", "/bbs/Beauty/M.1.A.B.html"),
///     "https://www.ptt.cc/bbs/Beauty/M.1.A.B.html"
/// );
/// ```
pub fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    let base = base.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// Last path segment of a URL with query and fragment removed.
pub fn last_segment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.rsplit('/').next().unwrap_or("")
}

/// Extract a post identifier: the URL's file name without its extension.
///
/// Returns an empty string when the URL has no file name.
pub fn extract_post_id(url: &str) -> String {
    let name = last_segment(url);
    match name.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name.to_string(),
    }
}

/// Split an image link into file stem and canonical extension.
///
/// Only `png`, `jpg`, `jpeg` and `gif` are recognized; `jpeg` becomes `jpg`.
pub fn image_file_name(link: &str) -> Option<(String, String)> {
    let name = last_segment(link);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }

    let ext = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        _ => return None,
    };
    Some((stem.to_string(), ext.to_string()))
}
