//! End-to-end tests for the archive lifecycle
//!
//! Drives the library the way the daily pipeline does: stage assets,
//! publish, rerun, and finally prune, verifying disk and manifest agree
//! at every step.

use newsvault::{
    load_records, merge_into_file, prune, publish, save_records, ArchiveConfig, ArticleRecord,
    AssetEntry, AssetKind, DateStamp, GroupedRecords, Manifest,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn record(topic: &str, images: &[&str]) -> ArticleRecord {
    ArticleRecord {
        topic: topic.to_string(),
        url: format!("https://example.com/{topic}"),
        article: format!("Body of {topic}"),
        images: images.iter().map(|s| s.to_string()).collect(),
    }
}

fn config_for(root: &Path, stamp: &str) -> ArchiveConfig {
    ArchiveConfig::builder()
        .news_dir(root.join("news"))
        .image_dir(root.join("staged_images"))
        .backup_dir(root.join("backup"))
        .retention_days(3)
        .stamp(DateStamp::parse(stamp).unwrap())
        .build(root.join("archive"))
        .unwrap()
}

fn stage_day(config: &ArchiveConfig, topics: &[&str], images: &[&str]) {
    fs::create_dir_all(&config.news_dir).unwrap();
    let mut records = GroupedRecords::new();
    records.insert(
        "Reuters".to_string(),
        topics.iter().map(|t| record(t, &[])).collect(),
    );
    save_records(&config.staged_json(), &records).unwrap();

    fs::create_dir_all(&config.image_dir).unwrap();
    for name in images {
        fs::write(config.image_dir.join(name), b"jpeg").unwrap();
    }
}

#[test]
fn test_multi_day_lifecycle_with_pruning() {
    let root = TempDir::new().unwrap();
    let archive = root.path().join("archive");

    // Three daily runs land three dated bundles
    for (stamp, topic) in [("250409", "old"), ("250412", "mid"), ("250413", "new")] {
        let config = config_for(root.path(), stamp);
        stage_day(&config, &[topic], &["pic.jpg"]);
        let report = publish(&config).unwrap();
        assert!(report.document_published);
        assert_eq!(report.entries_added, 2);
    }

    let manifest = Manifest::load_or_init(&archive).unwrap();
    assert_eq!(manifest.files.len(), 6);

    // Retention 3 as of 250413: cutoff is 250410, so only 250409 expires
    let report = prune(&archive, 3, DateStamp::parse("250413").unwrap()).unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(report.deleted_files, 1);
    assert_eq!(report.deleted_dirs, 1);

    assert!(!archive.join("onews_250409.json").exists());
    assert!(!archive.join("news_images_250409").exists());
    assert!(archive.join("onews_250412.json").exists());
    assert!(archive.join("onews_250413.json").exists());

    let manifest = Manifest::load_or_init(&archive).unwrap();
    let names: Vec<&str> = manifest.files.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "onews_250412.json",
            "news_images_250412",
            "onews_250413.json",
            "news_images_250413",
        ]
    );

    // A second prune pass finds nothing new
    let report = prune(&archive, 3, DateStamp::parse("250413").unwrap()).unwrap();
    assert!(!report.changed());
}

#[test]
fn test_same_day_rerun_is_idempotent() {
    let root = TempDir::new().unwrap();
    let config = config_for(root.path(), "250413");

    stage_day(&config, &["alpha", "beta"], &[]);
    publish(&config).unwrap();
    let after_first = load_records(&config.json_target()).unwrap();

    // Rerun with the identical document: nothing may change
    stage_day(&config, &["alpha", "beta"], &[]);
    let report = publish(&config).unwrap();
    let stats = report.merge.expect("rerun must merge");
    assert_eq!(stats.duplicates_dropped, 2);
    assert_eq!(load_records(&config.json_target()).unwrap(), after_first);

    // And the manifest still has exactly one entry per asset
    let manifest = Manifest::load_or_init(&config.local_server_dir).unwrap();
    assert_eq!(manifest.files.len(), 2);
}

#[test]
fn test_rerun_merge_keeps_first_occurrence_images() {
    let root = TempDir::new().unwrap();
    let config = config_for(root.path(), "250413");

    fs::create_dir_all(&config.news_dir).unwrap();
    let mut first = GroupedRecords::new();
    first.insert("Reuters".to_string(), vec![record("shared", &["a.jpg"])]);
    save_records(&config.staged_json(), &first).unwrap();
    publish(&config).unwrap();

    // Same identity, different image list: the original record wins
    let mut second = GroupedRecords::new();
    second.insert("Reuters".to_string(), vec![record("shared", &["b.jpg"])]);
    save_records(&config.staged_json(), &second).unwrap();
    publish(&config).unwrap();

    let merged = load_records(&config.json_target()).unwrap();
    assert_eq!(merged["Reuters"].len(), 1);
    assert_eq!(merged["Reuters"][0].images, vec!["a.jpg".to_string()]);
}

#[test]
fn test_manifest_round_trip_end_to_end() {
    let temp_dir = TempDir::new().unwrap();

    let mut manifest = Manifest::new();
    manifest.append_entries([
        AssetEntry::json("onews_250101.json", "abc"),
        AssetEntry::images("news_images_250101"),
    ]);
    manifest.save(temp_dir.path()).unwrap();

    let reloaded = Manifest::load_or_init(temp_dir.path()).unwrap();
    assert_eq!(reloaded.version, "1.0");
    assert_eq!(reloaded.files.len(), 2);
    assert_eq!(reloaded.files[0].name, "onews_250101.json");
    assert_eq!(reloaded.files[0].kind, AssetKind::Json);
    assert_eq!(reloaded.files[0].md5.as_deref(), Some("abc"));
    assert_eq!(reloaded.files[1].name, "news_images_250101");
    assert_eq!(reloaded.files[1].kind, AssetKind::Images);
    assert_eq!(reloaded.files[1].md5, None);
    assert_eq!(reloaded, manifest);
}

#[test]
fn test_standalone_merge_is_stable_across_repeats() {
    let temp_dir = TempDir::new().unwrap();
    let existing = temp_dir.path().join("archive.json");
    let incoming = temp_dir.path().join("fresh.json");

    let mut old = GroupedRecords::new();
    old.insert("Nikkei".to_string(), vec![record("yen", &[])]);
    save_records(&existing, &old).unwrap();

    let mut new = GroupedRecords::new();
    new.insert("Nikkei".to_string(), vec![record("yen", &[]), record("chips", &[])]);
    new.insert("Reuters".to_string(), vec![record("markets", &[])]);
    save_records(&incoming, &new).unwrap();

    let first = merge_into_file(&existing, &incoming).unwrap();
    let snapshot = load_records(&existing).unwrap();

    // Merging the same incoming document again changes nothing
    let second = merge_into_file(&existing, &incoming).unwrap();
    assert_eq!(load_records(&existing).unwrap(), snapshot);
    assert_eq!(first.total_records, second.total_records);
    assert_eq!(second.duplicates_dropped, 3);
}
