//! Grouped news record collections
//!
//! The scraping and formatting stages upstream of the archive produce one
//! JSON document per run: an object mapping a site's display name to the
//! articles collected from that site. This module defines the in-memory
//! shape of that document and its load/save primitives.
//!
//! Two records are the same article when their `(topic, url, article)`
//! triple matches exactly. The `images` list deliberately stays out of the
//! identity; when duplicates collide the first occurrence wins, images and
//! all.

use crate::error::{ArchiveError, Result};
use crate::utils::{atomic_write, to_pretty_json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Mapping of site display name to the articles collected for that site
///
/// A sorted map keeps serialization deterministic; group order carries no
/// meaning. Order *within* a group does: it is append order, and the merge
/// engine preserves first occurrence.
pub type GroupedRecords = BTreeMap<String, Vec<ArticleRecord>>;

/// One scraped article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Headline as extracted upstream
    pub topic: String,
    /// Original un-normalized article URL
    pub url: String,
    /// Full body text
    pub article: String,
    /// Image filenames collected for this article
    #[serde(default)]
    pub images: Vec<String>,
}

impl ArticleRecord {
    /// The deduplication key: exact string equality on all three fields
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.topic, &self.url, &self.article)
    }
}

/// Total number of records across all groups
pub fn record_count(records: &GroupedRecords) -> usize {
    records.values().map(Vec::len).sum()
}

/// Load a grouped record document from disk
///
/// # Errors
///
/// - [`ArchiveError::MissingSource`] if the file does not exist
/// - [`ArchiveError::Parse`] if the file is not a valid grouped document
pub fn load_records(path: &Path) -> Result<GroupedRecords> {
    if !path.exists() {
        return Err(ArchiveError::MissingSource(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| ArchiveError::parse(path, e))
}

/// Write a grouped record document, replacing any existing file atomically
pub fn save_records(path: &Path, records: &GroupedRecords) -> Result<()> {
    atomic_write(path, &to_pretty_json(records)?)
}
