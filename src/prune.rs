//! Retention pruner
//!
//! Walks the manifest, computes each asset's age from the `_YYMMDD` stamp
//! in its name, deletes expired assets from disk and drops their entries.
//! The bias is conservative: anything without a parseable stamp is kept
//! forever. Deletion failures are logged and the entry is dropped anyway,
//! so the manifest cannot grow without bound on undeletable assets; the
//! orphaned file stays on disk.

use crate::error::Result;
use crate::manifest::{AssetKind, Manifest};
use crate::stamp::{find_raw_stamp, DateStamp};
use chrono::Duration;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one prune pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Entries examined
    pub examined: usize,
    /// Entries dropped from the manifest
    pub removed: usize,
    /// Json assets deleted from disk
    pub deleted_files: usize,
    /// Image bundles deleted from disk
    pub deleted_dirs: usize,
    /// On-disk deletions that failed (entry dropped regardless)
    pub delete_failures: usize,
    /// Entries kept because their name has no parseable stamp
    pub kept_unstamped: usize,
    /// Expired entries kept because the on-disk shape did not match
    pub kept_mismatched: usize,
}

impl PruneReport {
    /// Whether the manifest was modified and rewritten
    pub fn changed(&self) -> bool {
        self.removed > 0
    }
}

/// Delete assets older than the retention window
///
/// `today` is the run's shared date stamp; the cutoff is
/// `today - retention_days` at date granularity, and expiry is strict:
/// an asset dated exactly at the cutoff survives.
///
/// Absent `version.json` is a no-op. The manifest file is only rewritten
/// when at least one entry was dropped.
///
/// # Errors
///
/// - [`crate::ArchiveError::Parse`] if the manifest exists but is malformed
/// - [`crate::ArchiveError::Io`] if the rewritten manifest cannot be saved
pub fn prune(dir: &Path, retention_days: u32, today: DateStamp) -> Result<PruneReport> {
    let manifest_path = Manifest::path_in(dir);
    if !manifest_path.exists() {
        info!("No manifest at {:?}, nothing to prune", manifest_path);
        return Ok(PruneReport::default());
    }

    let mut manifest = Manifest::load_or_init(dir)?;
    let cutoff = today.date() - Duration::days(i64::from(retention_days));
    info!(
        "Pruning assets older than {} days (cutoff {})",
        retention_days, cutoff
    );

    let mut report = PruneReport {
        examined: manifest.files.len(),
        ..Default::default()
    };
    let mut kept = Vec::with_capacity(manifest.files.len());

    for entry in manifest.files.drain(..) {
        let raw = match find_raw_stamp(&entry.name) {
            Some(raw) => raw,
            None => {
                warn!("'{}' has no date stamp, keeping", entry.name);
                report.kept_unstamped += 1;
                kept.push(entry);
                continue;
            }
        };
        let stamp = match DateStamp::parse(raw) {
            Some(stamp) => stamp,
            None => {
                warn!(
                    "'{}' has a malformed date stamp '{}', keeping",
                    entry.name, raw
                );
                report.kept_unstamped += 1;
                kept.push(entry);
                continue;
            }
        };

        if stamp.date() >= cutoff {
            kept.push(entry);
            continue;
        }

        info!("Expired asset: {} (dated {})", entry.name, stamp.date());
        let path = dir.join(&entry.name);

        if !path.exists() {
            warn!(
                "Asset already absent on disk, dropping manifest entry: {}",
                entry.name
            );
            report.removed += 1;
            continue;
        }

        match entry.kind {
            AssetKind::Json if path.is_file() => match fs::remove_file(&path) {
                Ok(()) => {
                    info!("Deleted file: {:?}", path);
                    report.deleted_files += 1;
                }
                Err(e) => {
                    warn!("Failed to delete {:?}: {}", path, e);
                    report.delete_failures += 1;
                }
            },
            AssetKind::Images if path.is_dir() => match fs::remove_dir_all(&path) {
                Ok(()) => {
                    info!("Deleted directory: {:?}", path);
                    report.deleted_dirs += 1;
                }
                Err(e) => {
                    warn!("Failed to delete {:?}: {}", path, e);
                    report.delete_failures += 1;
                }
            },
            _ => {
                warn!(
                    "On-disk shape of {:?} does not match manifest type '{}', leaving asset and entry alone",
                    path, entry.kind
                );
                report.kept_mismatched += 1;
                kept.push(entry);
                continue;
            }
        }

        // The entry goes away even when the disk deletion failed
        report.removed += 1;
    }

    if report.changed() {
        manifest.files = kept;
        manifest.save(dir)?;
        info!("Manifest updated, removed {} expired entries", report.removed);
    } else {
        info!("No expired assets found");
    }

    Ok(report)
}
