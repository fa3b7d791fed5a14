use super::CatalogStore;
use crate::catalog::{CourseRecord, LessonRecord, ModuleRecord, NewCourse, NewLesson, NewModule};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    courses: Vec<CourseRecord>,
    modules: Vec<ModuleRecord>,
    lessons: Vec<LessonRecord>,
    next_id: u64,
}

impl Tables {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// Process-local catalog, used for dry runs and tests.
/// Enforces the same natural-key uniqueness as the real schema.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn courses(&self) -> Vec<CourseRecord> {
        self.tables.read().await.courses.clone()
    }

    pub async fn modules(&self) -> Vec<ModuleRecord> {
        self.tables.read().await.modules.clone()
    }

    pub async fn lessons(&self) -> Vec<LessonRecord> {
        self.tables.read().await.lessons.clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_course(&self, slug: &str) -> Result<Option<CourseRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.slug == slug).cloned())
    }

    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord> {
        let mut tables = self.tables.write().await;
        if tables.courses.iter().any(|c| c.slug == course.slug) {
            return Err(SyncError::persistence(
                "course",
                format!("duplicate slug {}", course.slug),
            ));
        }

        let record = CourseRecord {
            id: tables.allocate_id("course"),
            slug: course.slug,
            title_vi: course.title_vi,
            title_en: course.title_en,
            order_index: course.order_index,
        };
        tables.courses.push(record.clone());
        debug!("Stored course {}", record.id);
        Ok(record)
    }

    async fn find_module(&self, course_id: &str, title: &str) -> Result<Option<ModuleRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .modules
            .iter()
            .find(|m| m.course_id == course_id && m.title_vi == title)
            .cloned())
    }

    async fn create_module(&self, module: NewModule) -> Result<ModuleRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .modules
            .iter()
            .any(|m| m.course_id == module.course_id && m.title_vi == module.title_vi)
        {
            return Err(SyncError::persistence(
                "module",
                format!("duplicate title {}", module.title_vi),
            ));
        }

        let record = ModuleRecord {
            id: tables.allocate_id("module"),
            course_id: module.course_id,
            title_vi: module.title_vi,
            title_en: module.title_en,
            order_index: module.order_index,
        };
        tables.modules.push(record.clone());
        Ok(record)
    }

    async fn list_modules(&self, course_id: &str) -> Result<Vec<ModuleRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .modules
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn find_lesson(&self, module_id: &str, video_id: &str) -> Result<Option<LessonRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .lessons
            .iter()
            .find(|l| l.module_id == module_id && l.video_id == video_id)
            .cloned())
    }

    async fn create_lesson(&self, lesson: NewLesson) -> Result<LessonRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .lessons
            .iter()
            .any(|l| l.module_id == lesson.module_id && l.video_id == lesson.video_id)
        {
            return Err(SyncError::persistence(
                "lesson",
                format!("duplicate video {}", lesson.video_id),
            ));
        }

        let record = LessonRecord {
            id: tables.allocate_id("lesson"),
            module_id: lesson.module_id,
            video_id: lesson.video_id,
            title_vi: lesson.title_vi,
            title_en: lesson.title_en,
            order_index: lesson.order_index,
            is_preview: lesson.is_preview,
        };
        tables.lessons.push(record.clone());
        Ok(record)
    }

    async fn list_lessons(&self, module_id: &str) -> Result<Vec<LessonRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .lessons
            .iter()
            .filter(|l| l.module_id == module_id)
            .cloned()
            .collect())
    }
}
