use crate::catalog::{Asset, Category, Collection, Descriptor, SourceAsset};
use crate::classify::{CollectionResolver, JsonRuleFile, ManualRuleEngine, TitleParser};
use crate::config::{Config, ImportConfig};
use crate::error::{Result, SyncError};
use crate::organize::{self, Organizer};
use crate::source::{fetch_collection_assets, AssetCache, AssetSource};
use crate::store::CatalogStore;
use crate::sync::importer::Importer;
use crate::sync::report::{BatchOutcome, RunReport};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Which batch claimed each category first during a run.
/// Only that batch may carry the course preview lesson.
#[derive(Debug, Clone, Default)]
pub struct FirstBatchLedger {
    claimed: BTreeMap<Category, String>,
}

impl FirstBatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `batch_name` for `category`; true when it is the first batch seen
    pub fn claim(&mut self, category: Category, batch_name: &str) -> bool {
        if self.claimed.contains_key(&category) {
            return false;
        }
        self.claimed.insert(category, batch_name.to_string());
        true
    }

    pub fn first_batch(&self, category: Category) -> Option<&str> {
        self.claimed.get(&category).map(String::as_str)
    }
}

/// Collection selection from `collections_to_process`
#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    terms: Vec<String>,
}

impl CollectionFilter {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Case-insensitive equality or substring match against name or identifier
    pub fn matches(&self, collection: &Collection) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let id = collection.id.to_lowercase();
        let name = collection.name.to_lowercase();
        self.terms
            .iter()
            .any(|term| id == *term || name == *term || id.contains(term) || name.contains(term))
    }
}

/// Drives a whole synchronization run, one batch at a time
pub struct SyncRunner {
    source: Arc<dyn AssetSource>,
    importer: Importer,
    parser: TitleParser,
    resolver: CollectionResolver,
    organizer: Organizer,
    cache: AssetCache,
    options: ImportConfig,
}

impl SyncRunner {
    pub fn new(
        source: Arc<dyn AssetSource>,
        importer: Importer,
        parser: TitleParser,
        resolver: CollectionResolver,
        options: ImportConfig,
    ) -> Self {
        let organizer = Organizer::new(options.auto_organize, options.videos_per_module);
        Self {
            source,
            importer,
            parser,
            resolver,
            organizer,
            cache: AssetCache::new(),
            options,
        }
    }

    /// Wire parser, resolver and importer from configuration
    pub fn from_config(
        config: &Config,
        source: Arc<dyn AssetSource>,
        store: Arc<dyn CatalogStore>,
    ) -> Result<Self> {
        let rules = match &config.classification.rules_file {
            Some(path) => ManualRuleEngine::from_source(&JsonRuleFile::new(path)),
            None => ManualRuleEngine::empty(),
        };
        let parser = TitleParser::with_extensions(rules, config.import.video_extensions.clone())?;
        let resolver = CollectionResolver::new(&config.classification.tables(), parser.clone());
        let importer = Importer::new(store, config.source.library_id.clone())?;

        Ok(Self::new(source, importer, parser, resolver, config.import.clone()))
    }

    /// Run to completion. Errors never escape: they are folded into the report.
    pub async fn run(&mut self) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::new(Utc::now());
        let mut ledger = FirstBatchLedger::new();

        self.cache.reset();
        info!("🚀 Starting video catalog sync");

        match self.collections().await {
            Ok(None) => {
                info!("📼 No collections found, importing by title classification");
                if let Err(e) = self.run_without_collections(&mut ledger, &mut report).await {
                    error!("❌ Could not fetch videos: {}", e);
                    report.fail(e);
                }
            }
            Ok(Some(collections)) if collections.is_empty() => {
                let configured = self.options.collections_to_process.join(", ");
                warn!("⚠️ None of the configured collections were found: {}", configured);
                report.record(
                    "collection filter",
                    BatchOutcome::Skipped {
                        reason: format!("no collection matched: {}", configured),
                    },
                );
            }
            Ok(Some(collections)) => {
                info!("📁 Processing {} collections", collections.len());
                for collection in &collections {
                    self.process_collection(collection, &mut ledger, &mut report).await;
                }
            }
            Err(e) => {
                error!("❌ Could not list collections: {}", e);
                report.fail(e);
            }
        }

        report.elapsed = started.elapsed();
        report
    }

    /// Collections to import, after the configured filter.
    /// `None` when the library has no collections and none are configured.
    async fn collections(&self) -> Result<Option<Vec<Collection>>> {
        let configured = &self.options.collections_to_process;

        let listed = match self.source.list_collections().await {
            Ok(listed) => listed,
            Err(e) if !configured.is_empty() => {
                warn!("⚠️ Could not list collections ({}), using configured identifiers", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let filter = CollectionFilter::new(configured);
        if listed.is_empty() {
            if filter.is_empty() {
                return Ok(None);
            }
            return Ok(Some(configured.iter().map(|id| synthesized(id)).collect()));
        }

        Ok(Some(listed.into_iter().filter(|c| filter.matches(c)).collect()))
    }

    async fn process_collection(
        &mut self,
        collection: &Collection,
        ledger: &mut FirstBatchLedger,
        report: &mut RunReport,
    ) {
        info!("📂 Collection '{}' ({})", collection.name, collection.id);
        let early = self.resolver.resolve_category(&collection.id, &collection.name, None);

        let fetched =
            match fetch_collection_assets(self.source.as_ref(), &mut self.cache, collection).await {
                Ok(assets) => assets,
                Err(e) => {
                    warn!("⚠️ Skipping '{}': could not fetch videos: {}", collection.name, e);
                    report.record(
                        &collection.name,
                        BatchOutcome::Skipped {
                            reason: format!("fetch failed: {}", e),
                        },
                    );
                    return;
                }
            };

        if fetched.is_empty() {
            warn!("⚠️ Skipping '{}': no videos", collection.name);
            report.record(
                &collection.name,
                BatchOutcome::Skipped {
                    reason: "no videos".to_string(),
                },
            );
            return;
        }

        let category = early.or_else(|| {
            let samples: Vec<String> = fetched.iter().map(|a| a.title.clone()).collect();
            self.resolver
                .resolve_category(&collection.id, &collection.name, Some(samples.as_slice()))
        });
        // unreachable while detect_category always yields a category
        let Some(category) = category else {
            let err = SyncError::ClassificationUnresolved(collection.name.clone());
            warn!("⚠️ Skipping collection: {}", err);
            report.record(
                &collection.name,
                BatchOutcome::Skipped {
                    reason: err.to_string(),
                },
            );
            return;
        };

        let assets = valid_assets(fetched, report);
        if assets.is_empty() {
            report.record(
                &collection.name,
                BatchOutcome::Skipped {
                    reason: "no videos with an identifier".to_string(),
                },
            );
            return;
        }

        let mut descriptors: Vec<Descriptor> = assets
            .iter()
            .map(|asset| self.parser.parse(asset, Some(category)))
            .collect();
        organize::order_by_title_number(&mut descriptors);

        let is_first = claim(ledger, category, &collection.name);
        self.import(category, &collection.name, &collection.name, &descriptors, is_first, report)
            .await;
    }

    /// Classify every asset by title and import each category as a single module
    async fn run_without_collections(
        &mut self,
        ledger: &mut FirstBatchLedger,
        report: &mut RunReport,
    ) -> Result<()> {
        let all = self.cache.all(self.source.as_ref()).await?.to_vec();
        if all.is_empty() {
            warn!("⚠️ The library has no videos");
            return Ok(());
        }

        let prefix_titles = self.options.legacy_title_prefix;
        let descriptors: Vec<Descriptor> = valid_assets(all, report)
            .iter()
            .map(|asset| {
                let mut descriptor = self.parser.parse(asset, None);
                if prefix_titles {
                    let title = format!(
                        "{} - {}",
                        descriptor.category.display_name(),
                        descriptor.lesson_title()
                    );
                    descriptor.slug = title;
                }
                descriptor
            })
            .collect();

        let module_title = self.options.fallback_module_title.clone();
        for (category, modules) in self.organizer.organize_by_category(descriptors) {
            let lessons = organize::flatten(modules);
            let batch_name = format!("{} / {}", category.display_name(), module_title);
            let is_first = claim(ledger, category, &batch_name);
            self.import(category, &batch_name, &module_title, &lessons, is_first, report)
                .await;
        }
        Ok(())
    }

    async fn import(
        &self,
        category: Category,
        batch_name: &str,
        module_title: &str,
        descriptors: &[Descriptor],
        is_first: bool,
        report: &mut RunReport,
    ) {
        debug!(
            "Importing {} lessons into {} / {} (first batch: {})",
            descriptors.len(),
            category,
            module_title,
            is_first
        );

        let outcome = match self
            .importer
            .import_batch(category, module_title, descriptors, is_first)
            .await
        {
            Ok(counts) => BatchOutcome::Imported { category, counts },
            Err(e) => {
                error!("❌ Batch '{}' failed: {}", batch_name, e);
                BatchOutcome::Failed {
                    category: Some(category),
                    error: e.to_string(),
                }
            }
        };
        report.record(batch_name, outcome);
    }
}

fn claim(ledger: &mut FirstBatchLedger, category: Category, batch_name: &str) -> bool {
    let first = ledger.claim(category, batch_name);
    if !first {
        if let Some(owner) = ledger.first_batch(category) {
            debug!("{} preview already claimed by '{}'", category, owner);
        }
    }
    first
}

/// Stand-in for a configured collection the source could not list
fn synthesized(id: &str) -> Collection {
    let prefix: String = id.chars().take(8).collect();
    Collection {
        id: id.to_string(),
        name: format!("Collection {}...", prefix),
    }
}

/// Promote source assets, dropping (and counting) those without an identifier
fn valid_assets(assets: Vec<SourceAsset>, report: &mut RunReport) -> Vec<Asset> {
    assets
        .into_iter()
        .filter_map(|source| match Asset::from_source(source) {
            Ok(asset) => Some(asset),
            Err(e) => {
                warn!("⚠️ Dropping video: {}", e);
                report.dropped_assets += 1;
                None
            }
        })
        .collect()
}
