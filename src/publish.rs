//! Daily publish flow
//!
//! One run per day lands two staged artifacts next to the archive: the
//! formatter's grouped record document and a directory of scraped images.
//! Publishing folds both into the dated archive under the local server
//! root, mirrors them to the secondary locations, and records them in the
//! manifest.
//!
//! Ordering is a correctness requirement, not a nicety: a staged source is
//! deleted only after its copy or merge into the archive is confirmed
//! written, so a mid-run failure can lose no data. Asset-level failures
//! (a mirror copy, a cleanup) are logged and collected as warnings; a
//! failed merge or manifest save aborts the run and surfaces in the exit
//! code.

use crate::config::ArchiveConfig;
use crate::error::Result;
use crate::manifest::{AssetEntry, Manifest};
use crate::merge::{merge_into_file, MergeStats};
use crate::utils::{compute_md5, copy_dir_all};
use std::fs;
use tracing::{debug, error, info, warn};

/// Outcome of one publish run
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Files copied while consolidating the staged image directory;
    /// `None` when there was nothing staged
    pub images_copied: Option<usize>,
    /// Merge statistics when this was a same-day rerun
    pub merge: Option<MergeStats>,
    /// Whether the dated record document exists after this run
    pub document_published: bool,
    /// Digests refreshed during the manifest update
    pub checksums_refreshed: usize,
    /// Manifest entries newly appended
    pub entries_added: usize,
    /// Non-fatal problems encountered along the way
    pub warnings: Vec<String>,
}

/// Run the daily consolidation flow
///
/// Steps, in order: consolidate staged images into the dated bundle,
/// mirror the bundle, publish or merge the staged record document, copy
/// the document to the done directory, then update and save the manifest.
/// Missing staged inputs are skipped silently; that is the normal state
/// on a rerun.
///
/// # Errors
///
/// Returns an error only for core failures: the archive root cannot be
/// created, a merge source is corrupt, the dated document cannot be
/// written, or the manifest cannot be loaded or saved.
pub fn publish(config: &ArchiveConfig) -> Result<PublishReport> {
    fs::create_dir_all(&config.local_server_dir)?;

    let mut report = PublishReport::default();
    consolidate_images(config, &mut report);
    mirror_images(config, &mut report);
    publish_document(config, &mut report)?;
    copy_to_done(config, &mut report);
    update_manifest(config, &mut report)?;
    Ok(report)
}

/// Fold the staged image directory into the dated archive bundle
fn consolidate_images(config: &ArchiveConfig, report: &mut PublishReport) {
    let staged = &config.image_dir;
    if !staged.is_dir() {
        info!("No staged image directory at {:?}, skipping", staged);
        return;
    }

    let target = config.images_target();
    match copy_dir_all(staged, &target) {
        Ok(copied) => {
            info!("Consolidated {} images into {:?}", copied, target);
            report.images_copied = Some(copied);
            // The staging directory goes away only now that the copy is
            // confirmed on disk
            if let Err(e) = fs::remove_dir_all(staged) {
                warn!("Could not remove staged images {:?}: {}", staged, e);
                report
                    .warnings
                    .push(format!("could not remove staged images {:?}: {}", staged, e));
            }
        }
        Err(e) => {
            error!("Failed to consolidate images from {:?}: {}", staged, e);
            report
                .warnings
                .push(format!("image consolidation failed: {}", e));
        }
    }
}

/// Mirror the dated image bundle into the backup directory, wholesale
fn mirror_images(config: &ArchiveConfig, report: &mut PublishReport) {
    let target = config.images_target();
    if !target.is_dir() {
        debug!("No consolidated bundle at {:?}, nothing to mirror", target);
        return;
    }

    let mirror = config.backup_dir.join(config.images_asset_name());
    if mirror.exists() {
        if let Err(e) = fs::remove_dir_all(&mirror) {
            warn!("Could not clear old mirror {:?}: {}", mirror, e);
            report
                .warnings
                .push(format!("could not clear old mirror {:?}: {}", mirror, e));
            return;
        }
    }
    match copy_dir_all(&target, &mirror) {
        Ok(copied) => info!("Mirrored {} images to {:?}", copied, mirror),
        Err(e) => {
            warn!("Failed to mirror images to {:?}: {}", mirror, e);
            report.warnings.push(format!("image mirror failed: {}", e));
        }
    }
}

/// Publish the staged record document into the dated archive slot
///
/// First run of the day copies it; a same-day rerun merges it into the
/// existing document instead of replacing it.
fn publish_document(config: &ArchiveConfig, report: &mut PublishReport) -> Result<()> {
    let staged = config.staged_json();
    if !staged.is_file() {
        info!("No staged document at {:?}, skipping", staged);
        return Ok(());
    }

    let target = config.json_target();
    if target.exists() {
        let stats = merge_into_file(&target, &staged)?;
        info!("Same-day rerun: merged staged document into {:?}", target);
        report.merge = Some(stats);
    } else {
        fs::copy(&staged, &target)?;
        info!("Published {:?}", target);
    }
    report.document_published = true;

    // Only remove the staged source once the archive write is confirmed
    if let Err(e) = fs::remove_file(&staged) {
        warn!("Could not remove staged document {:?}: {}", staged, e);
        report
            .warnings
            .push(format!("could not remove staged document {:?}: {}", staged, e));
    }
    Ok(())
}

/// Copy the dated document into the done directory as a secondary backup
fn copy_to_done(config: &ArchiveConfig, report: &mut PublishReport) {
    let target = config.json_target();
    if !target.is_file() {
        return;
    }
    if let Err(e) = fs::create_dir_all(&config.done_dir) {
        warn!("Could not create done directory {:?}: {}", config.done_dir, e);
        report
            .warnings
            .push(format!("could not create done directory: {}", e));
        return;
    }
    let dest = config.done_dir.join(config.json_asset_name());
    match fs::copy(&target, &dest) {
        Ok(_) => info!("Copied document to {:?}", dest),
        Err(e) => {
            warn!("Failed to copy document to {:?}: {}", dest, e);
            report.warnings.push(format!("done copy failed: {}", e));
        }
    }
}

/// Refresh digests, record the day's assets, save
///
/// The images entry is appended even when no bundle landed today; the
/// entry simply ages out through the pruner. The json entry is only
/// appended when the dated document actually exists.
fn update_manifest(config: &ArchiveConfig, report: &mut PublishReport) -> Result<()> {
    let mut manifest = Manifest::load_or_init(&config.local_server_dir)?;
    report.checksums_refreshed = manifest.refresh_checksums(&config.local_server_dir);

    let mut entries = Vec::new();
    let json_target = config.json_target();
    if json_target.is_file() {
        entries.push(AssetEntry::json(
            config.json_asset_name(),
            compute_md5(&json_target)?,
        ));
    }
    entries.push(AssetEntry::images(config.images_asset_name()));

    report.entries_added = manifest.append_entries(entries);
    manifest.save(&config.local_server_dir)
}
