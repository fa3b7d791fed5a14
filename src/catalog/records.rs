use serde::{Deserialize, Serialize};

/// Persisted course row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub title_vi: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCourse {
    pub slug: String,
    pub title_vi: String,
    pub title_en: String,
    pub description_vi: String,
    pub is_published: bool,
    pub order_index: u32,
}

/// Persisted module row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    pub course_id: String,
    pub title_vi: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModule {
    pub course_id: String,
    pub title_vi: String,
    pub title_en: String,
    pub order_index: u32,
}

/// Persisted lesson row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: String,
    pub module_id: String,
    #[serde(rename = "bunny_video_id")]
    pub video_id: String,
    #[serde(default)]
    pub title_vi: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLesson {
    pub module_id: String,
    pub title_vi: String,
    pub title_en: String,
    #[serde(rename = "bunny_video_id")]
    pub video_id: String,
    #[serde(rename = "bunny_library_id")]
    pub library_id: Option<String>,
    pub duration_seconds: u64,
    pub is_preview: bool,
    pub order_index: u32,
}
