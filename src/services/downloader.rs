//! Bounded concurrent image downloading.
//!
//! A fixed number of workers drain a shared queue of links. Each link is
//! fetched, decoded, size-checked, re-encoded by its extension and written
//! into the destination directory. A failing link never affects the others.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use image::{DynamicImage, GenericImageView, ImageFormat};
use tokio::sync::{Mutex, mpsc};

use crate::error::{AppError, Result};
use crate::fetch::ImageSource;
use crate::storage::LocalStorage;
use crate::utils::url::image_file_name;

/// What happened to one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Written to this path.
    Saved(PathBuf),
    /// Decoded but not larger than the minimum in both dimensions.
    TooSmall { width: u32, height: u32 },
    /// Fetch, decode, encode or write failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub link: String,
    pub status: ItemStatus,
}

/// Per-link outcomes of one download batch, in completion order.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub items: Vec<ItemResult>,
}

impl DownloadReport {
    pub fn saved(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Saved(_)))
    }

    pub fn too_small(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::TooSmall { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.status)).count()
    }
}

/// Result of decoding and re-encoding one image.
enum Processed {
    TooSmall { width: u32, height: u32 },
    Encoded(Vec<u8>),
}

/// Fixed-size pool of download workers.
#[derive(Clone)]
pub struct DownloadWorkerPool {
    source: Arc<dyn ImageSource>,
    min_dimension: u32,
}

impl DownloadWorkerPool {
    /// Images must be strictly larger than `min_dimension` in both
    /// dimensions to be kept.
    pub fn new(source: Arc<dyn ImageSource>, min_dimension: u32) -> Self {
        Self {
            source,
            min_dimension,
        }
    }

    /// Download `links` into `dest` with exactly `concurrency` workers,
    /// returning once every link has been handled.
    pub async fn download(
        &self,
        dest: &Path,
        links: Vec<String>,
        concurrency: usize,
    ) -> DownloadReport {
        let (tx, rx) = mpsc::unbounded_channel();
        for link in links {
            // The receiver is alive, so this cannot fail.
            let _ = tx.send(link);
        }
        drop(tx);

        let queue = Arc::new(Mutex::new(rx));
        let storage = LocalStorage::new(dest);
        let workers = (0..concurrency.max(1)).map(|id| {
            let queue = Arc::clone(&queue);
            let pool = self.clone();
            let storage = storage.clone();
            tokio::spawn(async move { pool.run_worker(id, queue, storage).await })
        });

        let mut report = DownloadReport::default();
        for joined in join_all(workers).await {
            match joined {
                Ok(items) => report.items.extend(items),
                Err(e) => log::error!("Download worker stopped: {e}"),
            }
        }

        log::info!(
            "Downloaded into {}: {} saved, {} too small, {} failed",
            dest.display(),
            report.saved(),
            report.too_small(),
            report.failed()
        );
        report
    }

    async fn run_worker(
        &self,
        id: usize,
        queue: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
        storage: LocalStorage,
    ) -> Vec<ItemResult> {
        let mut results = Vec::new();
        loop {
            // Hold the lock only while taking the next link.
            let next = queue.lock().await.recv().await;
            let Some(link) = next else {
                break;
            };

            let status = match self.process(&link, &storage).await {
                Ok(status) => status,
                Err(e) => {
                    log::warn!("[worker {id}] {link}: {e}");
                    ItemStatus::Failed(e.to_string())
                }
            };
            results.push(ItemResult { link, status });
        }
        results
    }

    async fn process(&self, link: &str, storage: &LocalStorage) -> Result<ItemStatus> {
        let (stem, ext) =
            image_file_name(link).ok_or_else(|| AppError::UnsupportedImage(link.to_string()))?;

        let bytes = self.source.fetch_image(link).await?;

        let min_dimension = self.min_dimension;
        let format_ext = ext.clone();
        let processed =
            tokio::task::spawn_blocking(move || encode_image(&bytes, &format_ext, min_dimension))
                .await??;

        match processed {
            Processed::TooSmall { width, height } => {
                log::debug!("Skipping small image {link} ({width}x{height})");
                Ok(ItemStatus::TooSmall { width, height })
            }
            Processed::Encoded(encoded) => {
                let path = storage
                    .write_bytes(&format!("{stem}.{ext}"), &encoded)
                    .await?;
                Ok(ItemStatus::Saved(path))
            }
        }
    }
}

/// Decode with format sniffing, then retry as PNG.
fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Ok(img),
        Err(_) => Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?),
    }
}

fn encode_image(bytes: &[u8], ext: &str, min_dimension: u32) -> Result<Processed> {
    let img = decode_image(bytes)?;
    let (width, height) = img.dimensions();
    if width <= min_dimension || height <= min_dimension {
        return Ok(Processed::TooSmall { width, height });
    }

    let (img, format) = match ext {
        "jpg" => (DynamicImage::ImageRgb8(img.to_rgb8()), ImageFormat::Jpeg),
        "gif" => (DynamicImage::ImageRgba8(img.to_rgba8()), ImageFormat::Gif),
        _ => (img, ImageFormat::Png),
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)?;
    Ok(Processed::Encoded(buf.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{StaticImages, png_bytes};
    use tempfile::TempDir;

    fn pool(images: StaticImages) -> DownloadWorkerPool {
        DownloadWorkerPool::new(Arc::new(images), 300)
    }

    #[tokio::test]
    async fn test_small_image_not_written() {
        let tmp = TempDir::new().unwrap();
        let link = "https://i.imgur.com/small.png";
        let pool = pool(StaticImages::new().with_image(link, png_bytes(250, 250)));

        let report = pool.download(tmp.path(), vec![link.to_string()], 4).await;
        assert_eq!(report.too_small(), 1);
        assert!(!tmp.path().join("small.png").exists());
    }

    #[tokio::test]
    async fn test_large_images_written_by_extension() {
        let tmp = TempDir::new().unwrap();
        let png = "https://i.imgur.com/big.png";
        let jpeg = "https://i.imgur.com/photo.jpeg";
        let pool = pool(
            StaticImages::new()
                .with_image(png, png_bytes(400, 400))
                .with_image(jpeg, png_bytes(400, 400)),
        );

        let report = pool
            .download(tmp.path(), vec![png.to_string(), jpeg.to_string()], 2)
            .await;
        assert_eq!(report.saved(), 2);

        let saved_png = std::fs::read(tmp.path().join("big.png")).unwrap();
        assert_eq!(
            image::guess_format(&saved_png).unwrap(),
            ImageFormat::Png
        );
        let saved_jpg = std::fs::read(tmp.path().join("photo.jpg")).unwrap();
        assert_eq!(
            image::guess_format(&saved_jpg).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_gif_link_reencoded_as_gif() {
        let tmp = TempDir::new().unwrap();
        let link = "https://i.imgur.com/anim.gif";
        let pool = pool(StaticImages::new().with_image(link, png_bytes(400, 400)));

        let report = pool.download(tmp.path(), vec![link.to_string()], 1).await;
        assert_eq!(report.saved(), 1);

        let saved = std::fs::read(tmp.path().join("anim.gif")).unwrap();
        assert_eq!(image::guess_format(&saved).unwrap(), ImageFormat::Gif);
        let decoded = image::load_from_memory(&saved).unwrap();
        assert_eq!(decoded.dimensions(), (400, 400));
    }

    #[test]
    fn test_decode_image_fallback() {
        let img = decode_image(&png_bytes(10, 20)).unwrap();
        assert_eq!(img.dimensions(), (10, 20));

        // Unrecognized bytes fail both the sniffed and the PNG attempt.
        assert!(matches!(
            decode_image(b"not an image"),
            Err(AppError::Image(_))
        ));
    }

    #[tokio::test]
    async fn test_boundary_dimension_rejected() {
        let tmp = TempDir::new().unwrap();
        let link = "https://i.imgur.com/edge.png";
        let pool = pool(StaticImages::new().with_image(link, png_bytes(300, 800)));

        let report = pool.download(tmp.path(), vec![link.to_string()], 1).await;
        assert_eq!(
            report.items[0].status,
            ItemStatus::TooSmall {
                width: 300,
                height: 800
            }
        );
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let good = "https://i.imgur.com/good.png";
        let images = StaticImages::new()
            .with_image(good, png_bytes(400, 400))
            .with_image("https://i.imgur.com/broken.png", b"not an image".to_vec());
        let pool = pool(images);

        let links = vec![
            "https://i.imgur.com/missing.png".to_string(),
            "https://i.imgur.com/broken.png".to_string(),
            "https://example.com/page.html".to_string(),
            good.to_string(),
        ];
        let report = pool.download(tmp.path(), links, 3).await;

        assert_eq!(report.items.len(), 4);
        assert_eq!(report.saved(), 1);
        assert_eq!(report.failed(), 3);
        assert!(tmp.path().join("good.png").exists());
    }

    #[tokio::test]
    async fn test_unsupported_link_not_fetched() {
        let tmp = TempDir::new().unwrap();
        let images = Arc::new(StaticImages::new());
        let pool = DownloadWorkerPool::new(images.clone(), 300);

        let report = pool
            .download(tmp.path(), vec!["https://imgur.com/noext".to_string()], 1)
            .await;
        assert_eq!(report.failed(), 1);
        assert_eq!(images.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let tmp = TempDir::new().unwrap();
        let report = pool(StaticImages::new())
            .download(tmp.path(), Vec::new(), 25)
            .await;
        assert!(report.items.is_empty());
    }
}
