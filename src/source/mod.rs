/// Remote asset source and the per-run asset cache

pub mod bunny;

pub use bunny::{BunnyClient, MAX_PAGE_SIZE};

use crate::catalog::{Collection, SourceAsset};
use crate::error::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Where videos and their collections come from
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<Collection>>;

    /// Every asset, or only those of one collection when a filter is given
    async fn list_assets(&self, collection_filter: Option<&str>) -> Result<Vec<SourceAsset>>;
}

/// Full asset listing fetched at most once per run and filtered locally
#[derive(Debug, Default)]
pub struct AssetCache {
    assets: Option<Vec<SourceAsset>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any listing from a previous run
    pub fn reset(&mut self) {
        self.assets = None;
    }

    pub fn is_populated(&self) -> bool {
        self.assets.is_some()
    }

    /// Full listing, fetching it on first use
    pub async fn all(&mut self, source: &dyn AssetSource) -> Result<&[SourceAsset]> {
        if !self.is_populated() {
            info!("📥 Fetching all videos for collection filtering...");
            let assets = source.list_assets(None).await?;
            info!("📊 Total videos in library: {}", assets.len());
            self.assets = Some(assets);
        }
        Ok(self.assets.as_deref().unwrap_or_default())
    }

    /// Assets whose collection field equals `collection_id`
    pub async fn in_collection(
        &mut self,
        source: &dyn AssetSource,
        collection_id: &str,
    ) -> Result<Vec<SourceAsset>> {
        let all = self.all(source).await?;
        Ok(all
            .iter()
            .filter(|asset| asset.collection_id.as_deref() == Some(collection_id))
            .cloned()
            .collect())
    }
}

/// Assets of one collection: the filtered listing when the source supports it,
/// the cached full listing otherwise. Assets reporting another collection are dropped.
pub async fn fetch_collection_assets(
    source: &dyn AssetSource,
    cache: &mut AssetCache,
    collection: &Collection,
) -> Result<Vec<SourceAsset>> {
    let fetched = match source.list_assets(Some(&collection.id)).await {
        Ok(assets) => assets,
        Err(e) => {
            warn!(
                "⚠️ Collection filtering not supported ({}), filtering the full listing for '{}'",
                e, collection.name
            );
            cache.in_collection(source, &collection.id).await?
        }
    };

    let total = fetched.len();
    let verified: Vec<SourceAsset> = fetched
        .into_iter()
        .filter(|asset| match asset.collection_id.as_deref() {
            Some(other) if other != collection.id => {
                warn!(
                    "⚠️ Video '{}' belongs to collection {}, expected {}",
                    asset.title, other, collection.id
                );
                false
            }
            _ => true,
        })
        .collect();

    if verified.len() != total {
        warn!("⚠️ Only {}/{} videos match collection '{}'", verified.len(), total, collection.name);
    }
    debug!("Collection '{}' has {} videos", collection.name, verified.len());

    Ok(verified)
}
