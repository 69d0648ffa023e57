//! Utility functions and helpers.

pub mod http;
pub mod url;

use std::path::Path;

/// Replace characters that would let a title escape its parent directory.
pub fn sanitize_dir_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            _ => c,
        })
        .collect()
}

/// Whether a path exists. Errors other than `NotFound` count as existing.
pub async fn path_exists(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_dir_name() {
        assert_eq!(sanitize_dir_name(" [正妹] a/b\\c "), "[正妹] a_b_c");
        assert_eq!(sanitize_dir_name("plain"), "plain");
    }

    #[tokio::test]
    async fn test_path_exists() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(path_exists(tmp.path()).await);
        assert!(!path_exists(&tmp.path().join("missing")).await);
    }
}
