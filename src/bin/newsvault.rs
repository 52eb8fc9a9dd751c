//! # newsvault CLI
//!
//! Command-line surface for the news asset archive.
//!
//! ## Usage
//! ```bash
//! # Daily run: consolidate staged assets, update version.json, prune
//! newsvault --archive ~/LocalServer/Resources/ONews publish \
//!     --news-dir ~/News --image-dir ~/Downloads/news_images \
//!     --backup-dir ~/Downloads/backup
//!
//! # Merge two grouped record documents by hand
//! newsvault merge onews_250413.json onews.json
//!
//! # Show what the manifest currently tracks
//! newsvault --archive ~/LocalServer/Resources/ONews status
//! ```
//!
//! Exit code is 0 on full success and 1 when any core step (merge,
//! manifest save) failed.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use newsvault::stamp::stamp_of;
use newsvault::{
    merge_into_file, prune, publish, ArchiveConfig, AssetKind, DateStamp, Manifest,
    DEFAULT_RETENTION_DAYS,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Maintain the versioned asset archive of a personal news pipeline
#[derive(Parser)]
#[command(name = "newsvault")]
#[command(version)]
#[command(about = "Merge, version and prune the published news asset archive")]
struct Cli {
    /// Archive root holding the dated assets and version.json
    #[arg(short, long, global = true, default_value = ".")]
    archive: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily consolidation flow, then prune
    Publish {
        /// Staging directory the formatter writes onews.json into
        #[arg(long)]
        news_dir: PathBuf,

        /// Staged image directory
        #[arg(long)]
        image_dir: PathBuf,

        /// Mirror directory for image bundles
        #[arg(long)]
        backup_dir: PathBuf,

        /// Secondary copy directory for documents (defaults to <news-dir>/done)
        #[arg(long)]
        done_dir: Option<PathBuf>,

        /// Retention window in days
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,

        /// Override the run's date stamp (YYMMDD)
        #[arg(long)]
        stamp: Option<String>,

        /// Skip the retention pass
        #[arg(long)]
        no_prune: bool,
    },

    /// Merge one grouped record document into another
    Merge {
        /// Document merged into (overwritten with the result)
        existing: PathBuf,

        /// Document merged from (left untouched)
        incoming: PathBuf,
    },

    /// Recompute manifest digests for documents that changed on disk
    Refresh,

    /// Delete assets older than the retention window
    Prune {
        /// Retention window in days
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,
    },

    /// Show the manifest entries and their ages
    Status {
        /// Show digests as well
        #[arg(short, long)]
        detailed: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // Run command
    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main command runner
fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Publish {
            news_dir,
            image_dir,
            backup_dir,
            done_dir,
            retention_days,
            stamp,
            no_prune,
        } => cmd_publish(
            cli.archive,
            news_dir,
            image_dir,
            backup_dir,
            done_dir,
            retention_days,
            stamp,
            no_prune,
        ),
        Commands::Merge { existing, incoming } => cmd_merge(existing, incoming),
        Commands::Refresh => cmd_refresh(cli.archive),
        Commands::Prune { retention_days } => cmd_prune(cli.archive, retention_days),
        Commands::Status { detailed } => cmd_status(cli.archive, detailed),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_publish(
    archive: PathBuf,
    news_dir: PathBuf,
    image_dir: PathBuf,
    backup_dir: PathBuf,
    done_dir: Option<PathBuf>,
    retention_days: u32,
    stamp: Option<String>,
    no_prune: bool,
) -> anyhow::Result<()> {
    let mut builder = ArchiveConfig::builder()
        .news_dir(news_dir)
        .image_dir(image_dir)
        .backup_dir(backup_dir)
        .retention_days(retention_days);
    if let Some(dir) = done_dir {
        builder = builder.done_dir(dir);
    }
    if let Some(raw) = stamp {
        let stamp = DateStamp::parse(&raw)
            .with_context(|| format!("'{}' is not a valid YYMMDD stamp", raw))?;
        builder = builder.stamp(stamp);
    }
    let config = builder.build(archive)?;

    let report = publish(&config).context("publish failed")?;

    println!(
        "{} Published assets for {}",
        "✓".green().bold(),
        config.stamp.to_string().cyan()
    );
    if let Some(copied) = report.images_copied {
        println!("  images consolidated: {}", copied);
    }
    if let Some(stats) = &report.merge {
        println!(
            "  same-day merge: {} records, {} duplicates dropped",
            stats.total_records, stats.duplicates_dropped
        );
    }
    println!(
        "  manifest: {} entries added, {} digests refreshed",
        report.entries_added, report.checksums_refreshed
    );
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }

    if no_prune {
        return Ok(());
    }
    let pruned = prune(&config.local_server_dir, config.retention_days, config.stamp)
        .context("prune failed")?;
    if pruned.changed() {
        println!(
            "{} Pruned {} expired entries ({} files, {} directories)",
            "✓".green().bold(),
            pruned.removed,
            pruned.deleted_files,
            pruned.deleted_dirs
        );
    } else {
        println!("{} Nothing to prune", "✓".green().bold());
    }
    Ok(())
}

fn cmd_merge(existing: PathBuf, incoming: PathBuf) -> anyhow::Result<()> {
    let stats = merge_into_file(&existing, &incoming)
        .with_context(|| format!("failed to merge {:?} into {:?}", incoming, existing))?;
    println!(
        "{} Merged: {} groups, {} records, {} duplicates dropped",
        "✓".green().bold(),
        stats.groups,
        stats.total_records,
        stats.duplicates_dropped
    );
    Ok(())
}

fn cmd_refresh(archive: PathBuf) -> anyhow::Result<()> {
    let manifest_path = Manifest::path_in(&archive);
    if !manifest_path.exists() {
        println!("No manifest at {:?}, nothing to refresh", manifest_path);
        return Ok(());
    }
    let mut manifest = Manifest::load_or_init(&archive)?;
    let changed = manifest.refresh_checksums(&archive);
    if changed > 0 {
        manifest.save(&archive).context("manifest save failed")?;
    }
    println!("{} {} digests refreshed", "✓".green().bold(), changed);
    Ok(())
}

fn cmd_prune(archive: PathBuf, retention_days: u32) -> anyhow::Result<()> {
    let report = prune(&archive, retention_days, DateStamp::today()).context("prune failed")?;
    println!(
        "{} Examined {} entries: {} removed, {} kept without a stamp, {} deletions failed",
        "✓".green().bold(),
        report.examined,
        report.removed,
        report.kept_unstamped,
        report.delete_failures
    );
    Ok(())
}

fn cmd_status(archive: PathBuf, detailed: bool) -> anyhow::Result<()> {
    let manifest = Manifest::load_or_init(&archive)?;
    if manifest.files.is_empty() {
        println!("Manifest is empty");
        return Ok(());
    }

    let today = DateStamp::today();
    println!(
        "{} (version {}, {} entries)",
        "Archive manifest".bold(),
        manifest.version,
        manifest.files.len()
    );
    for entry in &manifest.files {
        let age = match stamp_of(&entry.name) {
            Some(stamp) => match stamp.age_days(today) {
                d if d < 0 => "future".to_string(),
                0 => "today".to_string(),
                days => {
                    let dur = Duration::from_secs(days as u64 * 86_400);
                    format!("{} old", humantime::format_duration(dur))
                }
            },
            None => "no stamp".to_string(),
        };
        let kind = match entry.kind {
            AssetKind::Json => "json  ".blue(),
            AssetKind::Images => "images".magenta(),
        };
        if detailed {
            println!(
                "  {} {} {} {}",
                kind,
                entry.name.bold(),
                age.dimmed(),
                entry.md5.as_deref().unwrap_or("-").dimmed()
            );
        } else {
            println!("  {} {} {}", kind, entry.name.bold(), age.dimmed());
        }
    }
    Ok(())
}
