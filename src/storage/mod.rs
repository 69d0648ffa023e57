//! Persistence of downloaded images.
//!
//! Each post gets its own directory under the download root. The
//! directory's existence is the only record that a post was downloaded.

pub mod local;

// Re-export for convenience
pub use local::LocalStorage;
