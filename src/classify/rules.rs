use crate::catalog::Category;
use crate::error::Result;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Rule as written by an operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    #[serde(alias = "category")]
    pub course_type: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Supplier of the ordered override rules
pub trait RuleSource {
    /// Ordered rules; an unconfigured source yields an empty list
    fn load_rules(&self) -> Result<Vec<RuleSpec>>;
}

/// Rules stored as `{"rules": [{"pattern", "course_type", "case_sensitive"}]}`
#[derive(Debug, Clone)]
pub struct JsonRuleFile {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RuleFileContents {
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

impl JsonRuleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleSource for JsonRuleFile {
    fn load_rules(&self) -> Result<Vec<RuleSpec>> {
        if !self.path.exists() {
            debug!("No manual mapping file at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let contents: RuleFileContents = serde_json::from_str(&content)?;
        Ok(contents.rules)
    }
}

impl RuleSource for Vec<RuleSpec> {
    fn load_rules(&self) -> Result<Vec<RuleSpec>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
struct ManualRule {
    regex: Regex,
    category: Category,
}

/// Operator-supplied overrides consulted before keyword classification.
/// Conflicts are settled purely by list order.
#[derive(Debug, Clone, Default)]
pub struct ManualRuleEngine {
    rules: Vec<ManualRule>,
}

impl ManualRuleEngine {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and compile rules; an unreadable source leaves the engine empty
    pub fn from_source(source: &dyn RuleSource) -> Self {
        match source.load_rules() {
            Ok(specs) => {
                let engine = Self::from_specs(specs);
                if !engine.is_empty() {
                    info!("📝 Loaded {} manual mapping rules", engine.len());
                }
                engine
            }
            Err(e) => {
                warn!("Failed to load manual mapping rules, continuing without them: {}", e);
                Self::empty()
            }
        }
    }

    /// Compile rule specs, skipping blank, unknown-category or invalid entries
    pub fn from_specs(specs: Vec<RuleSpec>) -> Self {
        let mut rules = Vec::with_capacity(specs.len());

        for spec in specs {
            if spec.pattern.is_empty() || spec.course_type.is_empty() {
                continue;
            }

            let category = match spec.course_type.parse::<Category>() {
                Ok(category) => category,
                Err(e) => {
                    warn!("Skipping manual rule '{}': {}", spec.pattern, e);
                    continue;
                }
            };

            match RegexBuilder::new(&spec.pattern)
                .case_insensitive(!spec.case_sensitive)
                .build()
            {
                Ok(regex) => rules.push(ManualRule { regex, category }),
                Err(e) => warn!("Skipping manual rule with invalid pattern '{}': {}", spec.pattern, e),
            }
        }

        Self { rules }
    }

    /// Category of the first rule whose pattern occurs in `title`
    pub fn match_title(&self, title: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(title))
            .map(|rule| rule.category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
