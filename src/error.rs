//! Error types for catalog synchronization

/// Result type for catalog sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error types for catalog sync operations
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// Required credentials or identifiers are absent; fatal before any processing
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    /// A collection or batch could not be mapped to a category
    #[error("Could not classify '{0}' into a course category")]
    ClassificationUnresolved(String),

    /// An asset lacks a field the catalog cannot do without
    #[error("Asset '{title}' is missing required field '{field}'")]
    RequiredFieldMissing { field: &'static str, title: String },

    #[error("Failed to persist {entity}: {message}")]
    Persistence { entity: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl SyncError {
    pub fn persistence(entity: &'static str, err: impl std::fmt::Display) -> Self {
        SyncError::Persistence {
            entity,
            message: err.to_string(),
        }
    }
}
