//! Run configuration
//!
//! Everything a run needs is constructed once at process start and passed
//! down explicitly. No component reads ambient global state, and none of
//! them consult the clock on their own: the date stamp is fixed here so a
//! run that straddles midnight still names all of its assets consistently.

use crate::error::{ArchiveError, Result};
use crate::stamp::DateStamp;
use std::path::PathBuf;

/// File name of the staged document the upstream formatter writes
pub const SOURCE_DOCUMENT: &str = "onews.json";

/// Name prefix of dated record documents (`onews_<YYMMDD>.json`)
pub const JSON_PREFIX: &str = "onews";

/// Name prefix of dated image bundles (`news_images_<YYMMDD>`)
pub const IMAGES_PREFIX: &str = "news_images";

/// Days an asset is kept before the pruner deletes it
pub const DEFAULT_RETENTION_DAYS: u32 = 3;

/// All paths and knobs for one pipeline run
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Staging directory the upstream formatter writes `onews.json` into
    pub news_dir: PathBuf,
    /// Staging directory holding the day's scraped images
    pub image_dir: PathBuf,
    /// Archive root published by the local file server; holds the dated
    /// assets and `version.json`
    pub local_server_dir: PathBuf,
    /// Secondary mirror for the day's image bundle
    pub backup_dir: PathBuf,
    /// Secondary copy location for the day's record document
    pub done_dir: PathBuf,
    /// Retention window in days
    pub retention_days: u32,
    /// The run's date stamp, computed once
    pub stamp: DateStamp,
}

impl ArchiveConfig {
    /// Start building a configuration
    pub fn builder() -> ArchiveConfigBuilder {
        ArchiveConfigBuilder::default()
    }

    /// Path of the staged record document
    pub fn staged_json(&self) -> PathBuf {
        self.news_dir.join(SOURCE_DOCUMENT)
    }

    /// Name of the day's dated record document
    pub fn json_asset_name(&self) -> String {
        format!("{}_{}.json", JSON_PREFIX, self.stamp)
    }

    /// Name of the day's dated image bundle
    pub fn images_asset_name(&self) -> String {
        format!("{}_{}", IMAGES_PREFIX, self.stamp)
    }

    /// Archive path of the day's record document
    pub fn json_target(&self) -> PathBuf {
        self.local_server_dir.join(self.json_asset_name())
    }

    /// Archive path of the day's image bundle
    pub fn images_target(&self) -> PathBuf {
        self.local_server_dir.join(self.images_asset_name())
    }
}

/// Builder for [`ArchiveConfig`]
///
/// `news_dir`, `image_dir` and `backup_dir` are required; the rest have
/// sensible defaults (`done_dir` under the staging directory, today's
/// stamp, a three-day retention window).
#[derive(Debug, Default)]
pub struct ArchiveConfigBuilder {
    news_dir: Option<PathBuf>,
    image_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    done_dir: Option<PathBuf>,
    retention_days: Option<u32>,
    stamp: Option<DateStamp>,
}

impl ArchiveConfigBuilder {
    /// Create a builder with no paths set
    pub fn new() -> Self {
        Self::default()
    }

    /// Staging directory containing the source document
    pub fn news_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.news_dir = Some(path.into());
        self
    }

    /// Staging directory containing the day's images
    pub fn image_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(path.into());
        self
    }

    /// Mirror directory for image bundles
    pub fn backup_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(path.into());
        self
    }

    /// Secondary copy directory for record documents
    pub fn done_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.done_dir = Some(path.into());
        self
    }

    /// Retention window in days (must be at least 1)
    pub fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }

    /// Override the run's date stamp (tests, backfills)
    pub fn stamp(mut self, stamp: DateStamp) -> Self {
        self.stamp = Some(stamp);
        self
    }

    /// Finalize the configuration for the archive rooted at `local_server_dir`
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::InvalidConfiguration`] if a required directory is
    ///   missing or the retention window is zero
    pub fn build(self, local_server_dir: impl Into<PathBuf>) -> Result<ArchiveConfig> {
        let news_dir = self
            .news_dir
            .ok_or_else(|| ArchiveError::config("news_dir is required"))?;
        let image_dir = self
            .image_dir
            .ok_or_else(|| ArchiveError::config("image_dir is required"))?;
        let backup_dir = self
            .backup_dir
            .ok_or_else(|| ArchiveError::config("backup_dir is required"))?;

        let retention_days = self.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS);
        if retention_days == 0 {
            return Err(ArchiveError::config("retention_days must be at least 1"));
        }

        let done_dir = self.done_dir.unwrap_or_else(|| news_dir.join("done"));

        Ok(ArchiveConfig {
            news_dir,
            image_dir,
            local_server_dir: local_server_dir.into(),
            backup_dir,
            done_dir,
            retention_days,
            stamp: self.stamp.unwrap_or_else(DateStamp::today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> ArchiveConfigBuilder {
        ArchiveConfig::builder()
            .news_dir("/tmp/news")
            .image_dir("/tmp/images")
            .backup_dir("/tmp/backup")
    }

    #[test]
    fn test_defaults() {
        let config = base_builder()
            .stamp(DateStamp::parse("250413").unwrap())
            .build("/tmp/archive")
            .unwrap();
        assert_eq!(config.retention_days, DEFAULT_RETENTION_DAYS);
        assert_eq!(config.done_dir, PathBuf::from("/tmp/news/done"));
        assert_eq!(config.staged_json(), PathBuf::from("/tmp/news/onews.json"));
        assert_eq!(config.json_asset_name(), "onews_250413.json");
        assert_eq!(config.images_asset_name(), "news_images_250413");
        assert_eq!(
            config.json_target(),
            PathBuf::from("/tmp/archive/onews_250413.json")
        );
    }

    #[test]
    fn test_required_paths_enforced() {
        let err = ArchiveConfig::builder()
            .image_dir("/tmp/images")
            .backup_dir("/tmp/backup")
            .build("/tmp/archive")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_retention_rejected() {
        let err = base_builder()
            .retention_days(0)
            .build("/tmp/archive")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidConfiguration(_)));
    }
}
