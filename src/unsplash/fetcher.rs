use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::ProgressBar;
use reqwest::StatusCode;
use serde_json::Value;

use crate::unsplash::interrupt::CancelFlag;
use crate::unsplash::progress;
use crate::unsplash::sender::RequestSender;

/// Items requested per API call.
pub(crate) const PAGE_SIZE: usize = 30;

/// Total item budget for one fetch session.
pub(crate) const ITEM_BUDGET: usize = 1500;

/// How the fetch loop ended. Every outcome is followed by persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    Completed,
    RateLimited,
    Failed,
    Interrupted,
}

/// What a fetch session produced: the loop outcome, the number of items
/// accumulated, and the batch file they were persisted to.
#[derive(Debug)]
pub(crate) struct FetchReport {
    pub(crate) outcome: FetchOutcome,
    pub(crate) item_count: usize,
    pub(crate) batch_file: PathBuf,
}

/// Pulls photo metadata page by page and always persists the accumulated
/// batch, no matter how the loop exits.
pub(crate) struct MetadataFetcher {
    request_sender: RequestSender,
    metadata_dir: PathBuf,
    cancel: CancelFlag,
    page_budget: usize,
}

impl MetadataFetcher {
    pub(crate) fn new(request_sender: RequestSender, metadata_dir: &Path, cancel: CancelFlag) -> Self {
        MetadataFetcher {
            request_sender,
            metadata_dir: metadata_dir.to_path_buf(),
            cancel,
            page_budget: ITEM_BUDGET / PAGE_SIZE,
        }
    }

    /// Caps the number of pages requested in one session.
    pub(crate) fn with_page_budget(mut self, page_budget: usize) -> Self {
        self.page_budget = page_budget;
        self
    }

    /// Runs one fetch session. The caller has already resolved the
    /// credential, so every failure past this point leaves a batch file
    /// behind: the accumulator is written even when the loop stops on a rate
    /// limit, an error, or a cancellation.
    pub(crate) fn fetch(&self) -> Result<FetchReport> {
        let mut items: Vec<Value> = Vec::new();

        let progress_bar = progress::bar(self.page_budget as u64, "Downloading");
        let outcome = self.fetch_pages(&mut items, &progress_bar);
        progress_bar.finish();

        let batch_file = self.persist(&items)?;
        info!(
            "Persisted {} items to {}",
            items.len(),
            console::style(batch_file.display()).color256(39).italic()
        );

        Ok(FetchReport {
            outcome,
            item_count: items.len(),
            batch_file,
        })
    }

    fn fetch_pages(&self, items: &mut Vec<Value>, progress_bar: &ProgressBar) -> FetchOutcome {
        for _page in 0..self.page_budget {
            if self.cancel.is_cancelled() {
                info!("Operation interrupted by user.");
                return FetchOutcome::Interrupted;
            }

            let response = match self.request_sender.get_photos_page(PAGE_SIZE) {
                Ok(response) => response,
                Err(err) => {
                    error!("Something went wrong: {err:#}");
                    return FetchOutcome::Failed;
                }
            };

            match response.status() {
                StatusCode::OK => match response.json::<Vec<Value>>() {
                    Ok(mut page_items) => items.append(&mut page_items),
                    Err(err) => {
                        error!("Something went wrong: {err}");
                        return FetchOutcome::Failed;
                    }
                },
                StatusCode::FORBIDDEN => {
                    info!("Api limit reached!");
                    return FetchOutcome::RateLimited;
                }
                status => {
                    error!("Something went wrong! Metadata endpoint answered {status}");
                    return FetchOutcome::Failed;
                }
            }

            progress_bar.inc(1);
        }

        FetchOutcome::Completed
    }

    /// Writes the accumulator to a new timestamped batch file. Runs on every
    /// exit path of the loop; a partial session still leaves its items on
    /// disk for the catalog to pick up.
    fn persist(&self, items: &[Value]) -> Result<PathBuf> {
        create_dir_all(&self.metadata_dir).with_context(|| {
            format!(
                "Failed to create metadata directory: {}",
                self.metadata_dir.display()
            )
        })?;

        let timestamp = Utc::now().timestamp();
        let path = self.metadata_dir.join(format!("data_{timestamp}.json"));
        write(&path, serde_json::to_string_pretty(items)?)
            .with_context(|| format!("Failed to write batch file: {}", path.display()))?;

        Ok(path)
    }
}
