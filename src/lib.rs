/// Video Catalog Sync - Rust Implementation
/// 
/// Synchronizes a remote video library into a course -> module -> lesson catalog.
/// Collections are classified into course categories, titles are parsed into
/// module/lesson positions, and lessons are upserted idempotently.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod normalize;
pub mod organize;
pub mod source;
pub mod store;
pub mod sync;

// Re-export main types for easy access
pub use crate::catalog::{Asset, Category, Collection, Descriptor, Placement, SourceAsset};
pub use crate::classify::{CategoryTables, CollectionResolver, ManualRuleEngine, TitleParser};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Result, SyncError};
pub use crate::normalize::NumberNormalizer;
pub use crate::organize::{ModuleMap, Organizer};
pub use crate::source::{AssetCache, AssetSource, BunnyClient};
pub use crate::store::{CatalogStore, InMemoryStore, SupabaseStore};
pub use crate::sync::{BatchReport, Importer, RunReport, RunStatus, SyncRunner};
