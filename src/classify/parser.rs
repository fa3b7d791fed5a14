use super::keywords::KeywordLadder;
use super::rules::ManualRuleEngine;
use crate::catalog::{Asset, Category, Descriptor, Placement};
use crate::error::Result;
use regex::{Captures, Regex};
use tracing::debug;

/// Extensions stripped from titles when none are configured
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "avi", "mov", "webm", "m4v"];

/// Turns raw video titles into structured descriptors
#[derive(Debug, Clone)]
pub struct TitleParser {
    rules: ManualRuleEngine,
    ladder: KeywordLadder,
    extensions: Vec<String>,
    /// `m01-l02-title`
    short_code: Regex,
    /// `module-1-lesson-2-title`
    long_code: Regex,
    /// `01-02-title`
    numeric_pair: Regex,
    /// `... Part 3 ...`
    part: Regex,
    module_hint: Regex,
}

impl TitleParser {
    pub fn new(rules: ManualRuleEngine) -> Result<Self> {
        let extensions = DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        Self::with_extensions(rules, extensions)
    }

    pub fn with_extensions(rules: ManualRuleEngine, extensions: Vec<String>) -> Result<Self> {
        Ok(Self {
            rules,
            ladder: KeywordLadder::for_titles(),
            extensions: extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            short_code: Regex::new(r"(?i)^m(\d+)-l(\d+)[-_](.+)$")?,
            long_code: Regex::new(r"(?i)^module[-_](\d+)[-_]lesson[-_](\d+)[-_](.+)$")?,
            numeric_pair: Regex::new(r"^(\d+)[-_](\d+)[-_](.+)$")?,
            part: Regex::new(r"(?i)part[-_\s](\d+)")?,
            module_hint: Regex::new(r"(?i)module[-_\s]?(\d+)")?,
        })
    }

    /// Manual rules first, then the keyword ladder, defaulting to generic milling
    pub fn detect_category(&self, title: &str) -> Category {
        self.rules
            .match_title(title)
            .or_else(|| self.ladder.classify(title))
            .unwrap_or(Category::Mill)
    }

    /// Parse one asset; `category_override` replaces title-based detection
    pub fn parse(&self, asset: &Asset, category_override: Option<Category>) -> Descriptor {
        let category = category_override.unwrap_or_else(|| self.detect_category(&asset.title));
        let cleaned = self.strip_extension(&asset.title).trim().to_string();

        let (placement, slug) = match self.parse_structure(&cleaned) {
            Some((placement, slug)) => (Some(placement), slug),
            None => (None, cleaned.clone()),
        };

        debug!(
            "Parsed '{}' -> {:?} ({:?}, slug '{}')",
            asset.title, category, placement, slug
        );

        Descriptor {
            video_id: asset.external_id.clone(),
            title: asset.title.clone(),
            duration_seconds: asset.duration_seconds,
            category,
            placement,
            slug,
        }
    }

    /// Placement and slug from the first structural pattern that matches
    fn parse_structure(&self, cleaned: &str) -> Option<(Placement, String)> {
        for pattern in [&self.short_code, &self.long_code, &self.numeric_pair] {
            if let Some(caps) = pattern.captures(cleaned) {
                if let Some(placement) = placement_from(&caps) {
                    return Some((placement, separators_to_spaces(&caps[3])));
                }
            }
        }

        let lesson = self
            .part
            .captures(cleaned)
            .and_then(|caps| positive_number(&caps[1]))?;
        let module = self
            .module_hint
            .captures(cleaned)
            .and_then(|caps| positive_number(&caps[1]))
            .unwrap_or(1);

        Some((Placement::new(module, lesson), cleaned.to_string()))
    }

    /// Remove one trailing recognised video extension, ignoring case
    pub fn strip_extension<'a>(&self, title: &'a str) -> &'a str {
        let trimmed = title.trim_end();
        for ext in &self.extensions {
            let suffix_len = ext.len() + 1;
            if trimmed.len() <= suffix_len {
                continue;
            }
            let cut = trimmed.len() - suffix_len;
            if !trimmed.is_char_boundary(cut) {
                continue;
            }
            let suffix = &trimmed[cut..];
            if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(ext) {
                return &trimmed[..cut];
            }
        }
        trimmed
    }
}

fn placement_from(caps: &Captures<'_>) -> Option<Placement> {
    let module = positive_number(&caps[1])?;
    let lesson = positive_number(&caps[2])?;
    Some(Placement::new(module, lesson))
}

/// Numbers are 1-based; zero or out-of-range values do not count as a match
fn positive_number(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

fn separators_to_spaces(rest: &str) -> String {
    rest.replace(['-', '_'], " ").trim().to_string()
}
