/// Persistent catalog store and its implementations

pub mod memory;
pub mod supabase;

pub use memory::InMemoryStore;
pub use supabase::SupabaseStore;

use crate::catalog::{CourseRecord, LessonRecord, ModuleRecord, NewCourse, NewLesson, NewModule};
use crate::error::Result;
use async_trait::async_trait;

/// Course/module/lesson persistence used by the importer
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_course(&self, slug: &str) -> Result<Option<CourseRecord>>;
    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord>;

    async fn find_module(&self, course_id: &str, title: &str) -> Result<Option<ModuleRecord>>;
    async fn create_module(&self, module: NewModule) -> Result<ModuleRecord>;
    async fn list_modules(&self, course_id: &str) -> Result<Vec<ModuleRecord>>;

    async fn find_lesson(&self, module_id: &str, video_id: &str) -> Result<Option<LessonRecord>>;
    async fn create_lesson(&self, lesson: NewLesson) -> Result<LessonRecord>;
    async fn list_lessons(&self, module_id: &str) -> Result<Vec<LessonRecord>>;
}
