use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use video_catalog_sync::store::CatalogStore;
use video_catalog_sync::{BunnyClient, Config, InMemoryStore, RunStatus, SupabaseStore, SyncRunner};

const DEFAULT_FILTER: &str = "video_catalog_sync=info,warn";
const VERBOSE_FILTER: &str = "video_catalog_sync=debug,info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = Command::new("Video Catalog Sync")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Import a video library into the course catalog")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (default: video-catalog-sync.toml)")
                .value_parser(value_parser!(PathBuf))
        )
        .arg(
            Arg::new("collection")
                .long("collection")
                .value_name("ID_OR_NAME")
                .help("Only import this collection (repeatable)")
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Fetch and classify, writing to an in-memory catalog only")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("no-auto-organize")
                .long("no-auto-organize")
                .help("Drop videos without module/lesson numbers instead of bucketing them")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("videos-per-module")
                .long("videos-per-module")
                .value_name("NUM")
                .help("Lessons per auto-organized module")
                .value_parser(value_parser!(usize))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
        .get_matches();

    let config_path = matches.get_one::<PathBuf>("config").cloned();
    let dry_run = matches.get_flag("dry-run");
    let verbose = matches.get_flag("verbose");

    let loaded = Config::load(config_path.as_deref());

    // RUST_LOG wins, then --verbose, then the configured level
    let fallback_filter = if verbose {
        VERBOSE_FILTER.to_string()
    } else {
        loaded
            .as_ref()
            .ok()
            .and_then(|c| c.log_level.clone())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter)),
        )
        .init();

    let mut config = loaded.context("Failed to load configuration")?;

    if let Some(collections) = matches.get_many::<String>("collection") {
        config.import.collections_to_process = collections.cloned().collect();
    }
    if matches.get_flag("no-auto-organize") {
        config.import.auto_organize = false;
    }
    if let Some(count) = matches.get_one::<usize>("videos-per-module") {
        config.import.videos_per_module = *count;
    }

    if let Err(e) = config.validate(dry_run) {
        error!("❌ {}", e);
        return Err(anyhow!(e).context("Configuration is incomplete"));
    }

    info!("🚀 Video Catalog Sync starting...");
    info!("{}", config.summary());
    if dry_run {
        warn!("🧪 Dry run: nothing will be written to the catalog");
    }

    let source = Arc::new(BunnyClient::new(&config.source)?);
    let store: Arc<dyn CatalogStore> = if dry_run {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(SupabaseStore::new(&config.store)?)
    };

    let mut runner = SyncRunner::from_config(&config, source, store)?;
    let report = runner.run().await;

    for line in report.summary().lines() {
        info!("{}", line);
    }

    match report.status() {
        RunStatus::Success => {
            info!("🎉 Sync completed");
            Ok(())
        }
        RunStatus::PartialSuccess => {
            warn!("⚠️ Sync completed with skipped batches or failed lessons");
            Ok(())
        }
        RunStatus::Failed => Err(anyhow!(
            "sync failed: {}",
            report.fatal_error.as_deref().unwrap_or("unknown error")
        )),
    }
}
