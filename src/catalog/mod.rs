/// Catalog data model
///
/// Courses are keyed by a fixed per-category natural key, modules by
/// (course, title) and lessons by (module, external video identifier).

pub mod asset;
pub mod records;

pub use asset::{Asset, Collection, Descriptor, Placement, SourceAsset};
pub use records::{CourseRecord, LessonRecord, ModuleRecord, NewCourse, NewLesson, NewModule};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level classification of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Mill,
    Lathe,
    Mill3D,
    MultiAxis,
}

/// Static display fields for the course backing a category
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSpec {
    pub slug: &'static str,
    pub title_vi: &'static str,
    pub title_en: &'static str,
    pub description_vi: &'static str,
    pub order_index: u32,
}

impl Category {
    /// Every category, in the order batches are grouped during a title-only run
    pub const ALL: [Category; 4] = [
        Category::Lathe,
        Category::Mill,
        Category::Mill3D,
        Category::MultiAxis,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Mill => "Mill",
            Category::Lathe => "Lathe",
            Category::Mill3D => "Mill 3D",
            Category::MultiAxis => "Multi-Axis",
        }
    }

    /// Natural key and display fields of the course for this category
    pub fn course_spec(&self) -> CourseSpec {
        match self {
            Category::Lathe => CourseSpec {
                slug: "lathe-operations",
                title_vi: "Lập trình Lathe",
                title_en: "Lathe Operations",
                description_vi: "Khóa học lập trình máy tiện CNC",
                order_index: 2,
            },
            Category::Mill => CourseSpec {
                slug: "mill-operations",
                title_vi: "Lập trình Mill",
                title_en: "Mill Operations",
                description_vi: "Khóa học lập trình máy phay CNC",
                order_index: 1,
            },
            Category::Mill3D => CourseSpec {
                slug: "mill-3d-operations",
                title_vi: "Lập trình Mill 3D",
                title_en: "Mill 3D Operations",
                description_vi: "Khóa học lập trình phay 3D",
                order_index: 3,
            },
            Category::MultiAxis => CourseSpec {
                slug: "multi-axis-operations",
                title_vi: "Lập trình Multi-Axis",
                title_en: "Multi-Axis Operations",
                description_vi: "Khóa học lập trình đa trục",
                order_index: 4,
            },
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        match normalized.as_str() {
            "mill" => Ok(Category::Mill),
            "lathe" => Ok(Category::Lathe),
            "mill3d" => Ok(Category::Mill3D),
            "multiaxis" => Ok(Category::MultiAxis),
            _ => Err(format!("unknown course category: {}", s)),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.display_name().to_string()
    }
}
