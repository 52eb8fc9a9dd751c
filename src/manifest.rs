//! The `version.json` asset manifest
//!
//! The manifest is the archive's registry: an ordered list of dated asset
//! entries, one per published bundle, consumed by the downstream file
//! server to decide what to fetch. Two invariants hold:
//!
//! - entry names are unique, enforced by skip-on-insert rather than a set
//!   type so that insertion order is preserved;
//! - the in-memory manifest is the single source of truth during a run,
//!   and [`Manifest::save`] is the last step of any mutating operation.
//!
//! Saves go through a temp file in the same directory followed by an
//! atomic rename, so a crash mid-write can never truncate the registry.

use crate::error::{ArchiveError, Result};
use crate::utils::{atomic_write, compute_md5, to_pretty_json};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the persisted manifest
pub const MANIFEST_FILE: &str = "version.json";

/// Schema version written into fresh manifests
pub const MANIFEST_VERSION: &str = "1.0";

/// What kind of on-disk asset an entry names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// A merged grouped-record document (a single file)
    Json,
    /// A dated image bundle (a directory tree)
    Images,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Json => write!(f, "json"),
            AssetKind::Images => write!(f, "images"),
        }
    }
}

/// One record in the manifest describing a dated file or directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetEntry {
    /// Asset name, carrying the `_YYMMDD` date stamp used for retention
    pub name: String,
    /// On-disk shape of the asset
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Content digest, present only for json assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

impl AssetEntry {
    /// Entry for a merged record document with its content digest
    pub fn json(name: impl Into<String>, md5: impl Into<String>) -> Self {
        AssetEntry {
            name: name.into(),
            kind: AssetKind::Json,
            md5: Some(md5.into()),
        }
    }

    /// Entry for an image bundle (no digest; directories age out by stamp)
    pub fn images(name: impl Into<String>) -> Self {
        AssetEntry {
            name: name.into(),
            kind: AssetKind::Images,
            md5: None,
        }
    }
}

/// The persisted asset registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Schema version string
    pub version: String,
    /// Ordered list of asset entries
    pub files: Vec<AssetEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            version: MANIFEST_VERSION.to_string(),
            files: Vec::new(),
        }
    }
}

impl Manifest {
    /// Fresh, empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the manifest file inside an archive directory
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Load the manifest from `dir`, or return a fresh one if absent
    ///
    /// A missing file is the normal first-run state. A file that exists but
    /// does not parse is corruption and aborts the run.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::Parse`] if `version.json` exists but is malformed
    pub fn load_or_init(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !path.exists() {
            debug!("No manifest at {:?}, starting fresh", path);
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| ArchiveError::parse(path, e))
    }

    /// Whether an entry with this name already exists
    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|entry| entry.name == name)
    }

    /// Append entries whose names are not yet present
    ///
    /// This is the sole uniqueness enforcement for the manifest. Candidates
    /// are considered in argument order, which fixes the final order of the
    /// newly added names. Returns how many entries were actually appended.
    pub fn append_entries(&mut self, entries: impl IntoIterator<Item = AssetEntry>) -> usize {
        let mut added = 0;
        for entry in entries {
            if self.contains(&entry.name) {
                info!("Already present in manifest, skipping: {}", entry.name);
            } else {
                info!("Added to manifest: {}", entry.name);
                self.files.push(entry);
                added += 1;
            }
        }
        added
    }

    /// Recompute digests for json entries whose file exists under `dir`
    ///
    /// Changed digests are updated in place and logged. Entries whose file
    /// is missing are left untouched, as are entries whose file cannot be
    /// read (hashing trouble is logged, never fatal here). Returns the
    /// number of digests that changed.
    pub fn refresh_checksums(&mut self, dir: &Path) -> usize {
        let mut changed = 0;
        for entry in self.files.iter_mut() {
            if entry.kind != AssetKind::Json {
                continue;
            }
            let path = dir.join(&entry.name);
            if !path.is_file() {
                continue;
            }
            match compute_md5(&path) {
                Ok(digest) => {
                    if entry.md5.as_deref() != Some(digest.as_str()) {
                        info!(
                            "Updating md5 for {}: {} -> {}",
                            entry.name,
                            entry.md5.as_deref().unwrap_or("<none>"),
                            digest
                        );
                        entry.md5 = Some(digest);
                        changed += 1;
                    }
                }
                Err(e) => {
                    warn!("Could not hash {:?}, leaving digest untouched: {}", path, e);
                }
            }
        }
        changed
    }

    /// Persist the manifest into `dir`, atomically replacing `version.json`
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        atomic_write(&path, &to_pretty_json(self)?)?;
        info!("Manifest saved: {:?}", path);
        Ok(())
    }
}
