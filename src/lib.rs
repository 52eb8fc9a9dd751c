//! # newsvault - Merge-and-versioning archive for a news pipeline
//!
//! A small library that maintains the published asset archive of a personal
//! news-aggregation pipeline: it folds each day's scraped record document
//! and image bundle into a dated archive, keeps a `version.json` manifest
//! with checksum-based change detection, and prunes assets past a retention
//! window.
//!
//! ## Overview
//!
//! The upstream stages (browser scraping, article collection, PDF
//! rendering) are external collaborators. What reaches this crate is a
//! grouped JSON document, mapping each site's display name to the articles
//! collected from it, plus a directory of images. This crate owns the parts
//! with real invariants:
//!
//! - **Idempotent merge**: re-running a day folds new records into the
//!   existing dated document, deduplicating on the `(topic, url, article)`
//!   identity triple with stable first-occurrence order
//! - **Consistent manifest**: `version.json` lists every published asset
//!   exactly once, with an MD5 digest for record documents, and is written
//!   atomically
//! - **Time-windowed retention**: assets age out by the six-digit `YYMMDD`
//!   stamp embedded in their names; anything without a parseable stamp is
//!   kept forever
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newsvault::{publish, prune, ArchiveConfig};
//!
//! # fn main() -> newsvault::Result<()> {
//! let config = ArchiveConfig::builder()
//!     .news_dir("/home/me/News")
//!     .image_dir("/home/me/Downloads/news_images")
//!     .backup_dir("/home/me/Downloads/backup")
//!     .retention_days(3)
//!     .build("/home/me/LocalServer/Resources/ONews")?;
//!
//! let report = publish(&config)?;
//! println!("published: {} new manifest entries", report.entries_added);
//!
//! let pruned = prune(&config.local_server_dir, config.retention_days, config.stamp)?;
//! println!("pruned: {} entries removed", pruned.removed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Policy
//!
//! Errors split into two classes, and the split is deliberate rather than
//! incidental: corrupt required state (a manifest or merge source that does
//! not parse) aborts the run, while asset-level I/O trouble is logged at the
//! operation boundary and the run continues. See
//! [`ArchiveError::is_fatal`].
//!
//! ## Module Organization
//!
//! - [`config`]: run configuration and the builder
//! - [`records`]: grouped record collections and their JSON documents
//! - [`merge`]: the record merge engine
//! - [`manifest`]: the `version.json` asset registry
//! - [`prune`]: age-based retention
//! - [`publish`]: the daily consolidation flow
//! - [`stamp`]: `YYMMDD` date stamps in asset names
//! - [`error`]: error types and the fatal/degrade split

pub mod config;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod prune;
pub mod publish;
pub mod records;
pub mod stamp;

mod utils;

// Re-export main types for convenience
pub use config::{ArchiveConfig, ArchiveConfigBuilder, DEFAULT_RETENTION_DAYS};
pub use error::{ArchiveError, Result};
pub use manifest::{AssetEntry, AssetKind, Manifest, MANIFEST_FILE};
pub use merge::{merge, merge_into_file, MergeStats};
pub use prune::{prune, PruneReport};
pub use publish::{publish, PublishReport};
pub use records::{load_records, save_records, ArticleRecord, GroupedRecords};
pub use stamp::DateStamp;
pub use utils::compute_md5;
