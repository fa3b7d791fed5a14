use super::Category;
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};

/// Remote grouping of assets; one collection becomes one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

/// Asset as reported by the source, before required fields are checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAsset {
    pub external_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub collection_id: Option<String>,
}

/// Remotely hosted video with a guaranteed external identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub external_id: String,
    pub title: String,
    pub duration_seconds: u64,
}

impl Asset {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            duration_seconds,
        }
    }

    /// Promote a source asset, rejecting one without an external identifier
    pub fn from_source(source: SourceAsset) -> Result<Self> {
        match source.external_id.filter(|id| !id.trim().is_empty()) {
            Some(external_id) => Ok(Self {
                external_id,
                title: source.title.trim().to_string(),
                duration_seconds: source.duration_seconds,
            }),
            None => Err(SyncError::RequiredFieldMissing {
                field: "external_id",
                title: source.title,
            }),
        }
    }
}

/// Module and lesson position recovered from a title or assigned by the organizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub module: u32,
    pub lesson: u32,
}

impl Placement {
    pub fn new(module: u32, lesson: u32) -> Self {
        Self { module, lesson }
    }
}

/// Parsed, structured form of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub video_id: String,
    /// Title as reported by the source
    pub title: String,
    pub duration_seconds: u64,
    pub category: Category,
    /// Both numbers are known, or neither is
    pub placement: Option<Placement>,
    /// Display-ready name derived from the title
    pub slug: String,
}

impl Descriptor {
    pub fn module_number(&self) -> Option<u32> {
        self.placement.map(|p| p.module)
    }

    pub fn lesson_number(&self) -> Option<u32> {
        self.placement.map(|p| p.lesson)
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// Title shown on the lesson: the slug, or the raw title when the slug is blank
    pub fn lesson_title(&self) -> &str {
        if self.slug.trim().is_empty() {
            &self.title
        } else {
            &self.slug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_requires_external_id() {
        let missing = SourceAsset {
            external_id: None,
            title: "Part 1".to_string(),
            ..Default::default()
        };
        match Asset::from_source(missing) {
            Err(SyncError::RequiredFieldMissing { field, title }) => {
                assert_eq!(field, "external_id");
                assert_eq!(title, "Part 1");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let blank = SourceAsset {
            external_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(Asset::from_source(blank).is_err());
    }

    #[test]
    fn test_from_source_trims_title() {
        let asset = Asset::from_source(SourceAsset {
            external_id: Some("abc".to_string()),
            title: "  Facing.mp4 ".to_string(),
            duration_seconds: 42,
            collection_id: None,
        })
        .unwrap();
        assert_eq!(asset, Asset::new("abc", "Facing.mp4", 42));
    }

    #[test]
    fn test_lesson_title_falls_back_to_raw_title() {
        let mut descriptor = Descriptor {
            video_id: "v1".to_string(),
            title: "raw.mp4".to_string(),
            duration_seconds: 0,
            category: Category::Mill,
            placement: None,
            slug: String::new(),
        };
        assert_eq!(descriptor.lesson_title(), "raw.mp4");
        descriptor.slug = "Clean".to_string();
        assert_eq!(descriptor.lesson_title(), "Clean");
    }
}
