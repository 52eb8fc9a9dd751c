//! Record merge engine
//!
//! Folds one day's freshly scraped document into the persisted archive
//! document for the same day. The operation is a set-like union per group:
//! old records first, then new, with duplicates dropped on the identity
//! triple while preserving first-occurrence order. Because that is the only
//! operation, repeated merges of the same data are idempotent and merging
//! is associative across runs.

use crate::error::Result;
use crate::records::{load_records, record_count, save_records, ArticleRecord, GroupedRecords};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

/// Statistics from one merge operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of groups in the merged document
    pub groups: usize,
    /// Number of records in the merged document
    pub total_records: usize,
    /// Records discarded because their identity was already present
    pub duplicates_dropped: usize,
}

/// Merge two grouped record collections
///
/// The result's key set is the union of both inputs. Per group, `old`
/// records come first, then `new`, deduplicated on
/// [`ArticleRecord::identity`]. When a duplicate collides, the first
/// occurrence is kept in full and the loser is discarded, including its
/// image list. A group missing on either side behaves as an empty list.
pub fn merge(old: &GroupedRecords, new: &GroupedRecords) -> GroupedRecords {
    let empty: Vec<ArticleRecord> = Vec::new();
    let groups: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    let mut merged = GroupedRecords::new();
    for group in groups {
        let mut seen = HashSet::new();
        let mut deduped = Vec::new();

        let combined = old
            .get(group)
            .unwrap_or(&empty)
            .iter()
            .chain(new.get(group).unwrap_or(&empty).iter());
        for record in combined {
            if seen.insert(record.identity()) {
                deduped.push(record.clone());
            }
        }
        merged.insert(group.clone(), deduped);
    }
    merged
}

/// Merge the document at `incoming` into the document at `existing`
///
/// Both files must exist and parse; the merged result replaces `existing`
/// wholesale (merge-then-overwrite, not append). `incoming` is left
/// untouched, so a caller can safely delete it only after this returns Ok.
///
/// # Errors
///
/// - [`crate::ArchiveError::MissingSource`] if either input is absent
/// - [`crate::ArchiveError::Parse`] if either input is not valid JSON
pub fn merge_into_file(existing: &Path, incoming: &Path) -> Result<MergeStats> {
    let old = load_records(existing)?;
    let new = load_records(incoming)?;

    let merged = merge(&old, &new);
    let stats = MergeStats {
        groups: merged.len(),
        total_records: record_count(&merged),
        duplicates_dropped: record_count(&old) + record_count(&new) - record_count(&merged),
    };

    save_records(existing, &merged)?;
    info!(
        "Merged {:?} into {:?}: {} groups, {} records, {} duplicates dropped",
        incoming, existing, stats.groups, stats.total_records, stats.duplicates_dropped
    );
    Ok(stats)
}
