use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use crate::unsplash::catalog::Catalog;
use crate::unsplash::interrupt::CancelFlag;
use crate::unsplash::progress;
use crate::unsplash::sender::RequestSender;

/// What happened to a single download. Skips cover any non-200 status and
/// any transport or filesystem error; callers iterate on without handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DownloadStatus {
    Saved,
    Skipped,
}

/// Downloads catalog items to `{id}-{quality}.jpg` files, best effort.
pub(crate) struct ImageDownloader {
    request_sender: RequestSender,
    images_dir: PathBuf,
    cancel: CancelFlag,
}

impl ImageDownloader {
    pub(crate) fn new(request_sender: RequestSender, images_dir: &Path, cancel: CancelFlag) -> Self {
        ImageDownloader {
            request_sender,
            images_dir: images_dir.to_path_buf(),
            cancel,
        }
    }

    /// Streams `url` into `destination`. Never raises: any failure is logged
    /// and reported as `Skipped`. A non-200 response leaves the destination
    /// untouched; the file is only created once the status is known good.
    pub(crate) fn download(&self, url: &str, destination: &Path) -> DownloadStatus {
        let mut response = match self.request_sender.get_bytes(url) {
            Ok(response) => response,
            Err(err) => {
                warn!("Skipping {url}: {err:#}");
                return DownloadStatus::Skipped;
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Skipping {url}: status {}", response.status());
            return DownloadStatus::Skipped;
        }

        let mut file = match File::create(destination) {
            Ok(file) => file,
            Err(err) => {
                warn!("Skipping {}: {err}", destination.display());
                return DownloadStatus::Skipped;
            }
        };

        if let Err(err) = response.copy_to(&mut file) {
            warn!("Truncated write for {}: {err}", destination.display());
            return DownloadStatus::Skipped;
        }

        DownloadStatus::Saved
    }

    /// Downloads every catalog item at the given quality tier. A missing tier
    /// on any item aborts the run; individual download failures do not.
    /// Returns how many files were saved.
    pub(crate) fn download_all(&self, catalog: &Catalog, quality: &str) -> Result<usize> {
        create_dir_all(&self.images_dir).with_context(|| {
            format!(
                "Failed to create images directory: {}",
                self.images_dir.display()
            )
        })?;

        let mut saved = 0;
        for item in progress::wrap(catalog.items().iter(), catalog.len() as u64, "Downloading") {
            if self.cancel.is_cancelled() {
                info!("Operation interrupted by user.");
                break;
            }

            let url = item.url_for(quality)?;
            let destination = self.images_dir.join(format!("{}-{}.jpg", item.id, quality));
            if self.download(url, &destination) == DownloadStatus::Saved {
                saved += 1;
            }
        }

        Ok(saved)
    }
}
