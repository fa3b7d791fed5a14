use super::AssetSource;
use crate::catalog::{Collection, SourceAsset};
use crate::config::SourceConfig;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Largest `itemsPerPage` the video API honors; larger requests come back capped
pub const MAX_PAGE_SIZE: usize = 1000;

/// Video library REST client
pub struct BunnyClient {
    client: reqwest::Client,
    api_base: String,
    library_id: String,
    api_key: String,
    page_size: usize,
}

/// Listing payloads come either bare or wrapped in `items` / `data`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
    Data { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(v) | Listing::Items { items: v } | Listing::Data { data: v } => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BunnyCollection {
    guid: Option<String>,
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BunnyVideo {
    guid: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(rename = "collectionId", default)]
    collection_id: Option<String>,
}

impl From<BunnyVideo> for SourceAsset {
    fn from(video: BunnyVideo) -> Self {
        SourceAsset {
            external_id: video.guid,
            title: video.title.unwrap_or_default(),
            duration_seconds: video.length.map(|l| l.max(0.0).round() as u64).unwrap_or(0),
            collection_id: video.collection_id.filter(|c| !c.is_empty()),
        }
    }
}

impl BunnyCollection {
    fn into_collection(self) -> Option<Collection> {
        let id = self.guid.filter(|g| !g.is_empty()).or_else(|| {
            self.id.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
        })?;
        Some(Collection {
            id,
            name: self.name.unwrap_or_default(),
        })
    }
}

impl BunnyClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let library_id = config
            .library_id
            .clone()
            .ok_or_else(|| SyncError::ConfigurationMissing("BUNNY_LIBRARY_ID".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| SyncError::ConfigurationMissing("BUNNY_API_KEY".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            library_id,
            api_key,
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    fn library_url(&self, path: &str) -> String {
        format!("{}/library/{}/{}", self.api_base, self.library_id, path)
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .client
            .get(url)
            .header("AccessKey", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let listing: Listing<T> = response.json().await?;
        Ok(listing.into_vec())
    }
}

#[async_trait]
impl AssetSource for BunnyClient {
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        info!("📁 Fetching collections for library {}", self.library_id);

        let mut last_error = None;
        for path in ["collections", "folders"] {
            let url = self.library_url(path);
            debug!("Trying endpoint: {}", url);

            match self.get_listing::<BunnyCollection>(&url, &[]).await {
                Ok(raw) => {
                    let collections: Vec<Collection> =
                        raw.into_iter().filter_map(BunnyCollection::into_collection).collect();
                    info!("✅ Found {} collections", collections.len());
                    return Ok(collections);
                }
                Err(e) => {
                    warn!("⚠️ Endpoint {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SyncError::Api {
            status: 0,
            body: "no collection endpoint answered".to_string(),
        }))
    }

    async fn list_assets(&self, collection_filter: Option<&str>) -> Result<Vec<SourceAsset>> {
        let url = self.library_url("videos");
        let mut assets = Vec::new();
        let mut page = 1usize;

        loop {
            let mut query = vec![
                ("page", page.to_string()),
                ("itemsPerPage", self.page_size.to_string()),
                ("orderBy", "title".to_string()),
            ];
            if let Some(collection) = collection_filter {
                query.push(("collectionId", collection.to_string()));
            }

            let videos: Vec<BunnyVideo> = self.get_listing(&url, &query).await?;
            let count = videos.len();
            assets.extend(videos.into_iter().map(SourceAsset::from));
            debug!("Fetched page {}: {} videos", page, count);

            if count < self.page_size {
                break;
            }
            page += 1;
        }

        info!(
            "✅ Fetched {} videos{}",
            assets.len(),
            collection_filter
                .map(|c| format!(" from collection {}", c))
                .unwrap_or_default()
        );
        Ok(assets)
    }
}
