use crate::catalog::Category;

/// Ordered keyword tests; the first rung with a hit decides the category.
///
/// Multi-axis terms are checked before lathe terms, 3D-milling terms before
/// generic milling, so more specific vocabulary always wins.
#[derive(Debug, Clone)]
pub struct KeywordLadder {
    rungs: Vec<(Category, Vec<&'static str>)>,
}

impl KeywordLadder {
    /// Vocabulary used on individual video titles
    pub fn for_titles() -> Self {
        Self {
            rungs: vec![
                (
                    Category::MultiAxis,
                    vec![
                        "multi-axis",
                        "multi axis",
                        "multiaxis",
                        "5-axis",
                        "5 axis",
                        "5axis",
                        "4-axis",
                        "4 axis",
                        "4axis",
                        "simultaneous",
                    ],
                ),
                (Category::Lathe, vec!["lathe", "turning", "turn", "turned"]),
                (
                    Category::Mill3D,
                    vec![
                        "3d",
                        "3-d",
                        "three dimensional",
                        "3 dimensional",
                        "surface",
                        "surfacing",
                        "solid",
                        "solids",
                    ],
                ),
                (Category::Mill, vec!["mill", "milling", "cnc", "mastercam"]),
            ],
        }
    }

    /// Narrower vocabulary used on collection names
    pub fn for_collection_names() -> Self {
        Self {
            rungs: vec![
                (
                    Category::MultiAxis,
                    vec!["5-axis", "5 axis", "5axis", "multi-axis", "multi axis", "multiaxis"],
                ),
                (Category::Lathe, vec!["lathe", "turning"]),
                (Category::Mill3D, vec!["3d", "3-d"]),
                (Category::Mill, vec!["mill"]),
            ],
        }
    }

    /// Category of the first rung with a keyword contained in `text`
    pub fn classify(&self, text: &str) -> Option<Category> {
        let lowered = text.to_lowercase();
        self.rungs
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(category, _)| *category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_ladder_priority() {
        let ladder = KeywordLadder::for_titles();
        // "5-axis" outranks "lathe" and "mill"
        assert_eq!(ladder.classify("5-Axis Lathe Mill"), Some(Category::MultiAxis));
        assert_eq!(ladder.classify("Lathe 3D profile"), Some(Category::Lathe));
        assert_eq!(ladder.classify("Mill surfacing"), Some(Category::Mill3D));
        assert_eq!(ladder.classify("Mastercam basics"), Some(Category::Mill));
        assert_eq!(ladder.classify("Welcome"), None);
    }

    #[test]
    fn test_collection_ladder_is_narrower() {
        let ladder = KeywordLadder::for_collection_names();
        assert_eq!(ladder.classify("Surface finishing"), None);
        assert_eq!(ladder.classify("Turning Center"), Some(Category::Lathe));
        assert_eq!(ladder.classify("MILL-3D advanced"), Some(Category::Mill3D));
    }
}
