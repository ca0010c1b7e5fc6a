use std::collections::{BTreeMap, BTreeSet};
use std::fs::read_to_string;
use std::path::Path;

use anyhow::{Context, Result};
use prettytable::{Cell, Row, Table, format};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::unsplash::error::Error;

/// Longest cell rendered in the table view before truncation.
const TABLE_CELL_WIDTH: usize = 40;

/// One photo record as returned by the API. Fields beyond `id` and `urls`
/// are kept verbatim for the table view.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct CatalogItem {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) urls: BTreeMap<String, String>,
    #[serde(flatten)]
    pub(crate) extra: serde_json::Map<String, Value>,
}

impl CatalogItem {
    /// Resolves the binary URL for a quality tier; a missing tier is a hard
    /// failure rather than a skip.
    pub(crate) fn url_for(&self, quality: &str) -> Result<&str> {
        self.urls
            .get(quality)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::MissingQuality {
                    id: self.id.clone(),
                    quality: quality.to_string(),
                }
                .into()
            })
    }
}

/// The combined view over every metadata batch file on disk. Reloaded from
/// scratch on each use; nothing is cached across operations.
#[derive(Debug, Clone)]
pub(crate) struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Concatenates all `data*.json` files in the metadata directory in
    /// filename order. Duplicate ids across batches are retained. A file that
    /// fails to parse aborts the load; corrupt metadata means the directory
    /// needs manual repair.
    pub(crate) fn load(metadata_dir: &Path) -> Result<Self> {
        let mut items = Vec::new();

        for path in Self::batch_files(metadata_dir)? {
            let contents = read_to_string(&path)
                .with_context(|| format!("Failed to read metadata file: {}", path.display()))?;
            let mut batch: Vec<CatalogItem> =
                serde_json::from_str(&contents).map_err(|source| Error::CorruptMetadata {
                    path: path.clone(),
                    source,
                })?;
            items.append(&mut batch);
        }

        trace!("Loaded {} catalog items from disk", items.len());
        Ok(Catalog { items })
    }

    fn batch_files(metadata_dir: &Path) -> Result<Vec<std::path::PathBuf>> {
        if !metadata_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<_> = metadata_dir
            .read_dir()
            .with_context(|| {
                format!(
                    "Failed to list metadata directory: {}",
                    metadata_dir.display()
                )
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("data") && name.ends_with(".json"))
            })
            .collect();

        // Filename order doubles as embedded-timestamp order.
        files.sort();
        Ok(files)
    }

    pub(crate) fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tabular view for ad-hoc inspection: one row per item, columns are the
    /// union of fields observed across all items. Not used by the pipeline.
    pub(crate) fn as_table(&self) -> Table {
        let mut columns: BTreeSet<&str> = BTreeSet::new();
        for item in &self.items {
            columns.extend(item.extra.keys().map(String::as_str));
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let mut header = vec![Cell::new("id"), Cell::new("urls")];
        header.extend(columns.iter().map(|column| Cell::new(column)));
        table.add_row(Row::new(header));

        for item in &self.items {
            let tiers: Vec<&str> = item.urls.keys().map(String::as_str).collect();
            let mut row = vec![
                Cell::new(&item.id),
                Cell::new(&truncate(&tiers.join(", "))),
            ];
            row.extend(columns.iter().map(|column| {
                let rendered = item
                    .extra
                    .get(*column)
                    .map(render_value)
                    .unwrap_or_default();
                Cell::new(&truncate(&rendered))
            }));
            table.add_row(Row::new(row));
        }

        table
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= TABLE_CELL_WIDTH {
        text.to_string()
    } else {
        let head: String = text.chars().take(TABLE_CELL_WIDTH - 1).collect();
        format!("{head}…")
    }
}
