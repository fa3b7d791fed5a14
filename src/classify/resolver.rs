use super::keywords::KeywordLadder;
use super::parser::TitleParser;
use crate::catalog::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Deployment-supplied lookup tables mapping collections to categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTables {
    /// Collection identifier -> category; consulted before any name lookup
    #[serde(default)]
    pub collection_ids: BTreeMap<String, Category>,
    /// Collection name -> category
    #[serde(default)]
    pub collection_names: BTreeMap<String, Category>,
}

impl CategoryTables {
    /// Name table covering the usual spellings of the four course families
    pub fn default_names() -> BTreeMap<String, Category> {
        [
            ("mill", Category::Mill),
            ("lathe", Category::Lathe),
            ("lathe- c axis", Category::Lathe),
            ("lathe c axis", Category::Lathe),
            ("lathe basic", Category::Lathe),
            ("mill-3d", Category::Mill3D),
            ("mill 3d", Category::Mill3D),
            ("mill3d", Category::Mill3D),
            ("mill - setup", Category::Mill),
            ("mill setup", Category::Mill),
            ("mill-design basic", Category::Mill),
            ("mill design basic", Category::Mill),
            ("multi-axis", Category::MultiAxis),
            ("multi axis", Category::MultiAxis),
            ("multiaxis", Category::MultiAxis),
            ("multi-axis training vids", Category::MultiAxis),
            ("multi axis training vids", Category::MultiAxis),
            ("5-axis", Category::MultiAxis),
            ("5axis", Category::MultiAxis),
            ("5 axis", Category::MultiAxis),
        ]
        .into_iter()
        .map(|(name, category)| (name.to_string(), category))
        .collect()
    }
}

/// Which resolution step produced the category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStep {
    CollectionId,
    ExactName,
    PartialName { key: String },
    NameKeywords,
    SampleTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub category: Category,
    pub step: ResolutionStep,
}

/// Maps a collection to a category, trying identifier, name and title evidence in turn
#[derive(Debug, Clone)]
pub struct CollectionResolver {
    by_id: BTreeMap<String, Category>,
    by_name: BTreeMap<String, Category>,
    name_keywords: KeywordLadder,
    parser: TitleParser,
}

impl CollectionResolver {
    pub fn new(tables: &CategoryTables, parser: TitleParser) -> Self {
        let normalize = |table: &BTreeMap<String, Category>| {
            table
                .iter()
                .map(|(key, category)| (key.trim().to_lowercase(), *category))
                .filter(|(key, _)| !key.is_empty())
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            by_id: normalize(&tables.collection_ids),
            by_name: normalize(&tables.collection_names),
            name_keywords: KeywordLadder::for_collection_names(),
            parser,
        }
    }

    /// Category for a collection, or `None` when every step fails
    pub fn resolve_category(
        &self,
        collection_id: &str,
        collection_name: &str,
        sample_titles: Option<&[String]>,
    ) -> Option<Category> {
        self.explain(collection_id, collection_name, sample_titles)
            .map(|resolution| resolution.category)
    }

    /// Like [`resolve_category`](Self::resolve_category), also reporting the deciding step
    pub fn explain(
        &self,
        collection_id: &str,
        collection_name: &str,
        sample_titles: Option<&[String]>,
    ) -> Option<Resolution> {
        let resolution = self
            .from_identifier(collection_id)
            .or_else(|| self.from_name(collection_name))
            .or_else(|| self.from_samples(sample_titles));

        match &resolution {
            Some(r) => info!(
                "✅ Collection '{}' ({}) mapped to {} via {:?}",
                collection_name, collection_id, r.category, r.step
            ),
            None => debug!(
                "Collection '{}' ({}) did not match any category",
                collection_name, collection_id
            ),
        }

        resolution
    }

    fn from_identifier(&self, collection_id: &str) -> Option<Resolution> {
        let id = collection_id.trim().to_lowercase();
        if id.is_empty() {
            return None;
        }
        self.by_id.get(&id).map(|category| Resolution {
            category: *category,
            step: ResolutionStep::CollectionId,
        })
    }

    fn from_name(&self, collection_name: &str) -> Option<Resolution> {
        let name = collection_name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }

        if let Some(category) = self.by_name.get(&name) {
            return Some(Resolution {
                category: *category,
                step: ResolutionStep::ExactName,
            });
        }

        if let Some((key, category)) = self.partial_name_match(&name) {
            return Some(Resolution {
                category,
                step: ResolutionStep::PartialName { key },
            });
        }

        self.name_keywords.classify(&name).map(|category| Resolution {
            category,
            step: ResolutionStep::NameKeywords,
        })
    }

    /// Keys contained in the name, or containing it. The longest key wins;
    /// equal lengths fall back to alphabetical order.
    fn partial_name_match(&self, name: &str) -> Option<(String, Category)> {
        self.by_name
            .iter()
            .filter(|(key, _)| name.contains(key.as_str()) || key.contains(name))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(key, category)| (key.clone(), *category))
    }

    fn from_samples(&self, sample_titles: Option<&[String]>) -> Option<Resolution> {
        let first = sample_titles?.first()?;
        Some(Resolution {
            category: self.parser.detect_category(first),
            step: ResolutionStep::SampleTitle,
        })
    }
}
