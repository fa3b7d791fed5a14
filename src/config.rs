use crate::catalog::Category;
use crate::classify::{CategoryTables, DEFAULT_VIDEO_EXTENSIONS};
use crate::error::{Result, SyncError};
use crate::organize::DEFAULT_VIDEOS_PER_MODULE;
use crate::source::MAX_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration for the video catalog sync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote video library
    pub source: SourceConfig,

    /// Catalog database
    pub store: StoreConfig,

    /// Collection -> category mapping
    pub classification: ClassificationConfig,

    /// What to import and how to group it
    pub import: ImportConfig,

    /// Log filter used when RUST_LOG is unset
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Video API base URL
    pub api_base: String,

    /// Video library identifier
    pub library_id: Option<String>,

    /// Library access key
    pub api_key: Option<String>,

    /// Videos requested per page
    pub page_size: usize,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://<project>.supabase.co`
    pub url: Option<String>,

    /// Service role key
    pub service_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Collection identifier -> category
    pub collection_ids: BTreeMap<String, Category>,

    /// Collection name -> category
    pub collection_names: BTreeMap<String, Category>,

    /// Manual override rules (JSON); a missing file means no rules
    pub rules_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Collection identifiers or names to import; empty imports every collection
    pub collections_to_process: Vec<String>,

    /// Bucket videos without module/lesson numbers instead of dropping them
    pub auto_organize: bool,

    /// Lessons per auto-organized module
    pub videos_per_module: usize,

    /// Module title used when importing without collections
    pub fallback_module_title: String,

    /// Prefix lesson titles with the category name when importing without collections
    pub legacy_title_prefix: bool,

    /// Extensions stripped from video titles
    pub video_extensions: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://video.bunnycdn.com".to_string(),
            library_id: None,
            api_key: None,
            page_size: 100,
            timeout_seconds: 30,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            collection_ids: BTreeMap::new(),
            collection_names: CategoryTables::default_names(),
            rules_file: Some(PathBuf::from("video_mapping.json")),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            collections_to_process: Vec::new(),
            auto_organize: true,
            videos_per_module: DEFAULT_VIDEOS_PER_MODULE,
            fallback_module_title: "Lessons".to_string(),
            legacy_title_prefix: false,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ClassificationConfig {
    pub fn tables(&self) -> CategoryTables {
        CategoryTables {
            collection_ids: self.collection_ids.clone(),
            collection_names: self.collection_names.clone(),
        }
    }
}

impl Config {
    /// Default locations searched when no path is given
    pub const SEARCH_PATHS: [&'static str; 2] =
        ["video-catalog-sync.toml", "config/video-catalog-sync.toml"];

    /// Load from `path`, or the first existing search path, or defaults; then overlay
    /// the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::SEARCH_PATHS.iter().map(Path::new).find(|p| p.exists()) {
                Some(found) => Self::from_file(found)?,
                None => {
                    tracing::debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Overlay credentials and log level from `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = get("BUNNY_API_KEY") {
            self.source.api_key = Some(api_key);
        }
        if let Some(library_id) = get("BUNNY_LIBRARY_ID") {
            self.source.library_id = Some(library_id);
        }
        if let Some(url) = get("SUPABASE_URL") {
            self.store.url = Some(url);
        }

        if let Some(key) = get("SUPABASE_SERVICE_ROLE_KEY") {
            self.store.service_key = Some(key);
        } else if let Some(key) = get("SUPABASE_KEY") {
            tracing::warn!("⚠️ SUPABASE_SERVICE_ROLE_KEY not set, falling back to SUPABASE_KEY");
            self.store.service_key = Some(key);
        }

        if let Some(level) = get("VIDEO_SYNC_LOG_LEVEL") {
            self.log_level = Some(level);
        }
    }

    /// Check that everything a run needs is present. A dry run never touches the store,
    /// so only source credentials are required.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        require(&self.source.library_id, "BUNNY_LIBRARY_ID")?;
        require(&self.source.api_key, "BUNNY_API_KEY")?;

        Url::parse(&self.source.api_base).map_err(|e| {
            SyncError::InvalidConfig(format!("source.api_base '{}': {}", self.source.api_base, e))
        })?;

        if !dry_run {
            require(&self.store.url, "SUPABASE_URL")?;
            require(&self.store.service_key, "SUPABASE_SERVICE_ROLE_KEY")?;
        }

        if self.source.page_size == 0 || self.source.page_size > MAX_PAGE_SIZE {
            return Err(SyncError::InvalidConfig(format!(
                "source.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if self.import.videos_per_module == 0 {
            return Err(SyncError::InvalidConfig(
                "import.videos_per_module must be greater than 0".to_string(),
            ));
        }

        if self.import.fallback_module_title.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "import.fallback_module_title must not be empty".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Catalog Sync Configuration:\n\
            - Library: {}\n\
            - Store: {}\n\
            - Collections: {}\n\
            - Auto-organize: {} ({} per module)\n\
            - Mapped collection ids: {}\n\
            - Mapped collection names: {}\n\
            - Rules file: {}",
            self.source.library_id.as_deref().unwrap_or("<unset>"),
            self.store.url.as_deref().unwrap_or("<unset>"),
            if self.import.collections_to_process.is_empty() {
                "all".to_string()
            } else {
                self.import.collections_to_process.join(", ")
            },
            self.import.auto_organize,
            self.import.videos_per_module,
            self.classification.collection_ids.len(),
            self.classification.collection_names.len(),
            self.classification
                .rules_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string()),
        )
    }
}

fn require(value: &Option<String>, name: &str) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(SyncError::ConfigurationMissing(name.to_string())),
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_source_credentials(mut self, library_id: &str, api_key: &str) -> Self {
        self.config.source.library_id = Some(library_id.to_string());
        self.config.source.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_store(mut self, url: &str, service_key: &str) -> Self {
        self.config.store.url = Some(url.to_string());
        self.config.store.service_key = Some(service_key.to_string());
        self
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.config.import.collections_to_process.push(collection.to_string());
        self
    }

    pub fn map_collection_id(mut self, id: &str, category: Category) -> Self {
        self.config.classification.collection_ids.insert(id.to_string(), category);
        self
    }

    pub fn map_collection_name(mut self, name: &str, category: Category) -> Self {
        self.config.classification.collection_names.insert(name.to_string(), category);
        self
    }

    pub fn with_rules_file(mut self, path: Option<PathBuf>) -> Self {
        self.config.classification.rules_file = path;
        self
    }

    pub fn auto_organize(mut self, enable: bool) -> Self {
        self.config.import.auto_organize = enable;
        self
    }

    pub fn with_videos_per_module(mut self, count: usize) -> Self {
        self.config.import.videos_per_module = count;
        self
    }

    pub fn legacy_title_prefix(mut self, enable: bool) -> Self {
        self.config.import.legacy_title_prefix = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
