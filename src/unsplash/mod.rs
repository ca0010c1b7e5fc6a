use anyhow::Result;

use crate::unsplash::catalog::Catalog;
use crate::unsplash::downloader::ImageDownloader;
use crate::unsplash::fetcher::{FetchReport, MetadataFetcher};
use crate::unsplash::interrupt::CancelFlag;
use crate::unsplash::io::{Config, Directories};
use crate::unsplash::processor::ImageProcessor;
use crate::unsplash::sender::RequestSender;

pub(crate) mod catalog;
pub(crate) mod downloader;
pub(crate) mod error;
pub(crate) mod fetcher;
pub(crate) mod interrupt;
pub(crate) mod io;
pub(crate) mod processor;
pub(crate) mod progress;
pub(crate) mod sender;

/// Glues the pipeline stages together for the interactive shell. Every stage
/// reads fresh from disk; nothing is carried in memory between operations.
pub(crate) struct UnsplashWebConnector {
    directories: Directories,
    cancel: CancelFlag,
}

impl UnsplashWebConnector {
    pub(crate) fn new(directories: Directories, cancel: CancelFlag) -> Self {
        UnsplashWebConnector {
            directories,
            cancel,
        }
    }

    /// Fetches a fresh metadata batch. The credential is resolved before any
    /// network call so a missing config fails fast.
    pub(crate) fn fetch_metadata(&self) -> Result<FetchReport> {
        let access_key = Config::access_key()?;
        let request_sender = RequestSender::new(access_key);
        MetadataFetcher::new(
            request_sender,
            self.directories.metadata_dir(),
            self.cancel.clone(),
        )
        .fetch()
    }

    /// Downloads every cataloged image at the given quality tier.
    pub(crate) fn download_images(&self, quality: &str) -> Result<usize> {
        let catalog = Catalog::load(self.directories.metadata_dir())?;
        if catalog.is_empty() {
            info!("Catalog is empty, nothing to download.");
            return Ok(0);
        }

        let downloader = ImageDownloader::new(
            RequestSender::anonymous(),
            self.directories.images_dir(),
            self.cancel.clone(),
        );
        downloader.download_all(&catalog, quality)
    }

    /// Generates thumbnails for every downloaded image.
    pub(crate) fn create_thumbnails(&self, max_size: u32) -> Result<usize> {
        let processor = ImageProcessor::new(self.directories.images_dir(), self.cancel.clone());
        processor.create_thumbnails(max_size)
    }

    /// Runs the full transform sequence over every downloaded image. Only
    /// thumbnails are persisted; the other transforms validate that the
    /// files process cleanly.
    pub(crate) fn run_transform_pass(&self, max_size: u32) -> Result<usize> {
        let processor = ImageProcessor::new(self.directories.images_dir(), self.cancel.clone());
        processor.run_transform_pass(max_size)
    }

    /// Prints the combined catalog as a table for ad-hoc inspection.
    pub(crate) fn print_catalog(&self) -> Result<()> {
        let catalog = Catalog::load(self.directories.metadata_dir())?;
        if catalog.is_empty() {
            info!("Catalog is empty, fetch metadata first.");
            return Ok(());
        }

        catalog.as_table().printstd();
        info!(
            "{} items across all batch files.",
            console::style(catalog.len()).cyan().italic()
        );
        Ok(())
    }
}
