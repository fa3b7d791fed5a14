use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use video_catalog_sync::sync::BatchOutcome;
use video_catalog_sync::{
    AssetSource, Category, Collection, ConfigBuilder, InMemoryStore, RunStatus, SourceAsset,
    SyncError, SyncRunner,
};

/// Replays a fixed library; collection-filtered listings can be switched off
#[derive(Default)]
struct ScriptedSource {
    collections: Vec<Collection>,
    assets: Vec<SourceAsset>,
    supports_filter: bool,
    collections_fail: bool,
    full_listings: AtomicUsize,
}

#[async_trait]
impl AssetSource for ScriptedSource {
    async fn list_collections(&self) -> Result<Vec<Collection>, SyncError> {
        if self.collections_fail {
            return Err(SyncError::Api { status: 503, body: "unavailable".into() });
        }
        Ok(self.collections.clone())
    }

    async fn list_assets(&self, collection_filter: Option<&str>) -> Result<Vec<SourceAsset>, SyncError> {
        match collection_filter {
            Some(_) if !self.supports_filter => {
                Err(SyncError::Api { status: 400, body: "unknown parameter".into() })
            }
            Some(id) => Ok(self
                .assets
                .iter()
                .filter(|a| a.collection_id.as_deref() == Some(id))
                .cloned()
                .collect()),
            None => {
                self.full_listings.fetch_add(1, Ordering::SeqCst);
                Ok(self.assets.clone())
            }
        }
    }
}

fn collection(id: &str, name: &str) -> Collection {
    Collection { id: id.to_string(), name: name.to_string() }
}

fn asset(id: Option<&str>, title: &str, collection: Option<&str>) -> SourceAsset {
    SourceAsset {
        external_id: id.map(str::to_string),
        title: title.to_string(),
        duration_seconds: 300,
        collection_id: collection.map(str::to_string),
    }
}

fn build_runner(source: ScriptedSource, builder: ConfigBuilder) -> (SyncRunner, InMemoryStore, Arc<ScriptedSource>) {
    let config = builder
        .with_source_credentials("lib-1", "key")
        .with_rules_file(None)
        .build();
    let store = InMemoryStore::new();
    let source = Arc::new(source);
    let runner = SyncRunner::from_config(&config, source.clone(), Arc::new(store.clone())).unwrap();
    (runner, store, source)
}

fn imported(outcome: &BatchOutcome) -> Option<(Category, usize)> {
    match outcome {
        BatchOutcome::Imported { category, counts } => Some((*category, counts.inserted)),
        _ => None,
    }
}

#[tokio::test]
async fn test_collections_become_modules() {
    let source = ScriptedSource {
        collections: vec![collection("c-lathe", "Lathe Basic"), collection("c-mill", "Mill - Setup")],
        assets: vec![
            asset(Some("l2"), "Part 10 Threading.mp4", Some("c-lathe")),
            asset(Some("l1"), "Part 2 Facing.mp4", Some("c-lathe")),
            asset(Some("m1"), "Vise alignment.mp4", Some("c-mill")),
        ],
        supports_filter: true,
        ..Default::default()
    };
    let (mut runner, store, _) = build_runner(source, ConfigBuilder::new());

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.totals().inserted, 3);

    let modules = store.modules().await;
    let names: Vec<_> = modules.iter().map(|m| m.title_vi.as_str()).collect();
    assert_eq!(names, vec!["Lathe Basic", "Mill - Setup"]);

    // lessons ordered by the number in their title, not by listing order
    let lathe_module = &modules[0].id;
    let lathe: Vec<_> = store
        .lessons()
        .await
        .into_iter()
        .filter(|l| &l.module_id == lathe_module)
        .map(|l| (l.video_id, l.order_index, l.is_preview))
        .collect();
    assert_eq!(
        lathe,
        vec![("l1".to_string(), 1, true), ("l2".to_string(), 2, false)]
    );
}

#[tokio::test]
async fn test_identifier_table_beats_name() {
    let source = ScriptedSource {
        collections: vec![collection("abc-123", "Mill - Setup")],
        assets: vec![asset(Some("v1"), "Part 1.mp4", Some("abc-123"))],
        supports_filter: true,
        ..Default::default()
    };
    let builder = ConfigBuilder::new().map_collection_id("ABC-123", Category::Lathe);
    let (mut runner, store, _) = build_runner(source, builder);

    let report = runner.run().await;
    assert_eq!(imported(&report.batches[0].outcome), Some((Category::Lathe, 1)));
    assert_eq!(store.courses().await[0].slug, Category::Lathe.course_spec().slug);
}

#[tokio::test]
async fn test_unresolved_collection_and_missing_ids() {
    let source = ScriptedSource {
        collections: vec![collection("c1", "Bonus footage"), collection("c2", "Lathe Basic")],
        assets: vec![
            asset(Some("b1"), "Shop tour", Some("c1")),
            asset(None, "Part 1 Orphan", Some("c2")),
            asset(Some("l1"), "Part 2 Facing", Some("c2")),
        ],
        supports_filter: true,
        ..Default::default()
    };
    let (mut runner, store, _) = build_runner(source, ConfigBuilder::new());

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::PartialSuccess);
    assert_eq!(report.dropped_assets, 1);
    assert_eq!(report.batches.len(), 2);

    // "Shop tour" falls through every step, but the sample title default still yields Mill
    assert_eq!(imported(&report.batches[0].outcome), Some((Category::Mill, 1)));
    assert_eq!(imported(&report.batches[1].outcome), Some((Category::Lathe, 1)));
    assert_eq!(store.lessons().await.len(), 2);
}

#[tokio::test]
async fn test_empty_collection_is_skipped() {
    let source = ScriptedSource {
        collections: vec![collection("c1", "Mill 3D")],
        assets: Vec::new(),
        supports_filter: true,
        ..Default::default()
    };
    let (mut runner, _, _) = build_runner(source, ConfigBuilder::new());

    let report = runner.run().await;
    assert!(matches!(report.batches[0].outcome, BatchOutcome::Skipped { .. }));
    assert_eq!(report.status(), RunStatus::PartialSuccess);
}

#[tokio::test]
async fn test_filter_fallback_fetches_full_listing_once() {
    let source = ScriptedSource {
        collections: vec![collection("c1", "Mill 3D"), collection("c2", "Multi-Axis")],
        assets: vec![
            asset(Some("a"), "Part 1 Surfacing", Some("c1")),
            asset(Some("b"), "Part 1 Tilt", Some("c2")),
        ],
        supports_filter: false,
        ..Default::default()
    };
    let (mut runner, _, source) = build_runner(source, ConfigBuilder::new());

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(source.full_listings.load(Ordering::SeqCst), 1);

    // a new run starts from an empty cache
    runner.run().await;
    assert_eq!(source.full_listings.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_configured_collections_filter_and_synthesis() {
    let source = ScriptedSource {
        collections: vec![collection("c1", "Mill - Setup"), collection("c2", "Lathe Basic")],
        assets: vec![
            asset(Some("a"), "Part 1", Some("c1")),
            asset(Some("b"), "Part 1", Some("c2")),
        ],
        supports_filter: true,
        ..Default::default()
    };
    let (mut runner, store, _) = build_runner(source, ConfigBuilder::new().with_collection("lathe"));
    let report = runner.run().await;
    assert_eq!(report.batches.len(), 1);
    assert_eq!(store.modules().await[0].title_vi, "Lathe Basic");

    // listing fails: configured identifiers stand in for the collections
    let source = ScriptedSource {
        assets: vec![asset(Some("a"), "Part 1", Some("deadbeef42"))],
        supports_filter: true,
        collections_fail: true,
        ..Default::default()
    };
    let builder = ConfigBuilder::new()
        .with_collection("deadbeef42")
        .map_collection_id("deadbeef42", Category::Mill3D);
    let (mut runner, store, _) = build_runner(source, builder);
    let report = runner.run().await;
    assert_eq!(report.batches[0].batch_name, "Collection deadbeef...");
    assert_eq!(imported(&report.batches[0].outcome), Some((Category::Mill3D, 1)));
    assert_eq!(store.lessons().await.len(), 1);
}

#[tokio::test]
async fn test_collection_listing_failure_is_fatal_without_configuration() {
    let source = ScriptedSource {
        collections_fail: true,
        ..Default::default()
    };
    let (mut runner, store, _) = build_runner(source, ConfigBuilder::new());

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::Failed);
    assert!(report.fatal_error.is_some());
    assert!(store.courses().await.is_empty());
}

#[tokio::test]
async fn test_legacy_mode_groups_by_title_category() {
    let source = ScriptedSource {
        assets: vec![
            asset(Some("t1"), "Lathe Part 2.mp4", None),
            asset(Some("m1"), "m01-l01-vise_setup.mp4", None),
            asset(Some("t0"), "Lathe Part 1.mp4", None),
            asset(Some("x1"), "5-axis tilt demo.mov", None),
        ],
        ..Default::default()
    };
    let (mut runner, store, _) = build_runner(source, ConfigBuilder::new());

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::Success);

    let categories: Vec<_> = report
        .batches
        .iter()
        .filter_map(|b| imported(&b.outcome).map(|(c, _)| c))
        .collect();
    assert_eq!(categories, vec![Category::Lathe, Category::Mill, Category::MultiAxis]);

    let modules = store.modules().await;
    assert!(modules.iter().all(|m| m.title_vi == "Lessons"));

    let by_video: HashMap<_, _> = store
        .lessons()
        .await
        .into_iter()
        .map(|l| (l.video_id.clone(), l))
        .collect();
    assert_eq!(by_video["t0"].order_index, 1);
    assert_eq!(by_video["t1"].order_index, 2);
    assert_eq!(by_video["m1"].title_vi, "vise setup");
    assert!(by_video["t0"].is_preview && by_video["m1"].is_preview && by_video["x1"].is_preview);
}

#[tokio::test]
async fn test_unmatched_filter_never_imports_whole_library() {
    let source = ScriptedSource {
        collections: vec![collection("c1", "Mill - Setup")],
        assets: vec![
            asset(Some("a"), "Part 1", Some("c1")),
            asset(Some("u"), "Unrelated upload", None),
        ],
        supports_filter: true,
        ..Default::default()
    };
    let (mut runner, store, source) = build_runner(source, ConfigBuilder::new().with_collection("lathe-typo"));

    let report = runner.run().await;
    assert_ne!(report.status(), RunStatus::Success);
    assert!(report.fatal_error.is_none());
    assert_eq!(report.batches.len(), 1);
    assert!(matches!(&report.batches[0].outcome, BatchOutcome::Skipped { reason } if reason.contains("lathe-typo")));

    assert!(store.modules().await.is_empty());
    assert!(store.lessons().await.is_empty());
    assert_eq!(source.full_listings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_filter_with_empty_listing_synthesizes_instead_of_title_mode() {
    let source = ScriptedSource {
        assets: vec![
            asset(Some("a"), "Part 1", Some("deadbeef42")),
            asset(Some("u"), "Lathe Part 1.mp4", None),
        ],
        supports_filter: true,
        ..Default::default()
    };
    let builder = ConfigBuilder::new()
        .with_collection("deadbeef42")
        .map_collection_id("deadbeef42", Category::Mill3D);
    let (mut runner, store, source) = build_runner(source, builder);

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.batches.len(), 1);
    assert_eq!(imported(&report.batches[0].outcome), Some((Category::Mill3D, 1)));

    let lessons = store.lessons().await;
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].video_id, "a");
    assert_eq!(source.full_listings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_legacy_mode_title_prefix_toggle() {
    let source = ScriptedSource {
        assets: vec![asset(Some("m1"), "m01-l01-vise_setup.mp4", None)],
        ..Default::default()
    };
    let (mut runner, store, _) = build_runner(source, ConfigBuilder::new().legacy_title_prefix(true));

    let report = runner.run().await;
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(store.lessons().await[0].title_vi, "Mill - vise setup");
}
