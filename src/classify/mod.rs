/// Classification of videos and collections into course categories
///
/// Titles are parsed into module/lesson descriptors by [`TitleParser`];
/// operator rules in [`ManualRuleEngine`] override keyword detection, and
/// [`CollectionResolver`] decides the category of a whole collection.

pub mod keywords;
pub mod parser;
pub mod resolver;
pub mod rules;

pub use keywords::KeywordLadder;
pub use parser::{TitleParser, DEFAULT_VIDEO_EXTENSIONS};
pub use resolver::{CategoryTables, CollectionResolver, Resolution, ResolutionStep};
pub use rules::{JsonRuleFile, ManualRuleEngine, RuleSource, RuleSpec};
