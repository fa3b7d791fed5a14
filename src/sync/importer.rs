use crate::catalog::{Category, CourseRecord, Descriptor, ModuleRecord, NewCourse, NewLesson, NewModule};
use crate::error::Result;
use crate::normalize::NumberNormalizer;
use crate::store::CatalogStore;
use crate::sync::report::BatchReport;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Idempotent course/module/lesson upserts for one batch at a time
pub struct Importer {
    store: Arc<dyn CatalogStore>,
    normalizer: NumberNormalizer,
    library_id: Option<String>,
}

impl Importer {
    pub fn new(store: Arc<dyn CatalogStore>, library_id: Option<String>) -> Result<Self> {
        Ok(Self {
            store,
            normalizer: NumberNormalizer::new()?,
            library_id,
        })
    }

    /// Import `descriptors` as one module named `batch_name` under the course for `category`.
    ///
    /// Descriptors must already be in their final order: position in the slice becomes the
    /// lesson order index. An error is returned only when the course or module cannot be
    /// resolved; individual lesson failures are counted in the report.
    pub async fn import_batch(
        &self,
        category: Category,
        batch_name: &str,
        descriptors: &[Descriptor],
        is_first_batch: bool,
    ) -> Result<BatchReport> {
        let course = self.ensure_course(category).await?;
        let module = self.ensure_module(&course, batch_name).await?;
        let first_of_course = is_first_batch && self.course_is_empty(&course).await;

        let titles: Vec<&str> = descriptors.iter().map(Descriptor::lesson_title).collect();
        let display_titles = self.normalizer.normalize_batch(&titles);

        let mut report = BatchReport {
            total: descriptors.len(),
            ..Default::default()
        };

        for (index, (descriptor, title)) in descriptors.iter().zip(display_titles).enumerate() {
            let position = index as u32 + 1;

            match self.store.find_lesson(&module.id, &descriptor.video_id).await {
                Ok(Some(_)) => {
                    debug!("Lesson for video {} already exists, skipping", descriptor.video_id);
                    report.skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("❌ Lookup failed for '{}': {}", title, e);
                    report.failed += 1;
                    continue;
                }
            }

            let is_preview = first_of_course && position == 1;
            let lesson = NewLesson {
                module_id: module.id.clone(),
                title_vi: title.clone(),
                title_en: title.clone(),
                video_id: descriptor.video_id.clone(),
                library_id: self.library_id.clone(),
                duration_seconds: descriptor.duration_seconds,
                is_preview,
                order_index: position,
            };

            match self.store.create_lesson(lesson).await {
                Ok(_) => {
                    debug!(
                        "Created lesson {} '{}'{}",
                        position,
                        title,
                        if is_preview { " (preview)" } else { "" }
                    );
                    report.inserted += 1;
                }
                Err(e) => {
                    error!("❌ Failed to create lesson '{}': {}", title, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "✅ {} / {}: {} inserted, {} existing, {} failed",
            category, batch_name, report.inserted, report.skipped, report.failed
        );
        Ok(report)
    }

    async fn ensure_course(&self, category: Category) -> Result<CourseRecord> {
        let spec = category.course_spec();
        if let Some(course) = self.store.find_course(spec.slug).await? {
            return Ok(course);
        }

        info!("📚 Creating course: {}", spec.title_en);
        self.store
            .create_course(NewCourse {
                slug: spec.slug.to_string(),
                title_vi: spec.title_vi.to_string(),
                title_en: spec.title_en.to_string(),
                description_vi: spec.description_vi.to_string(),
                is_published: true,
                order_index: spec.order_index,
            })
            .await
    }

    async fn ensure_module(&self, course: &CourseRecord, title: &str) -> Result<ModuleRecord> {
        if let Some(module) = self.store.find_module(&course.id, title).await? {
            debug!("Reusing module '{}' (order {})", title, module.order_index);
            return Ok(module);
        }

        let next_order = self
            .store
            .list_modules(&course.id)
            .await?
            .iter()
            .map(|m| m.order_index)
            .max()
            .unwrap_or(0)
            + 1;

        info!("📂 Creating module '{}' (order {})", title, next_order);
        self.store
            .create_module(NewModule {
                course_id: course.id.clone(),
                title_vi: title.to_string(),
                title_en: title.to_string(),
                order_index: next_order,
            })
            .await
    }

    /// No lesson under any module of the course, this batch's module included.
    /// A lookup failure counts as non-empty so a preview is never granted twice.
    async fn course_is_empty(&self, course: &CourseRecord) -> bool {
        let modules = match self.store.list_modules(&course.id).await {
            Ok(modules) => modules,
            Err(e) => {
                warn!("⚠️ Could not list modules of {}: {}", course.slug, e);
                return false;
            }
        };

        for module in modules {
            match self.store.list_lessons(&module.id).await {
                Ok(lessons) if lessons.is_empty() => {}
                Ok(_) => return false,
                Err(e) => {
                    warn!("⚠️ Could not list lessons of module '{}': {}", module.title_vi, e);
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Placement;
    use crate::store::InMemoryStore;

    fn descriptor(id: &str, slug: &str) -> Descriptor {
        Descriptor {
            video_id: id.to_string(),
            title: format!("{}.mp4", slug),
            duration_seconds: 60,
            category: Category::Lathe,
            placement: Some(Placement::new(1, 1)),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_titles_normalized_with_batch_context() {
        let store = InMemoryStore::new();
        let importer = Importer::new(Arc::new(store.clone()), Some("lib".into())).unwrap();
        let batch = vec![descriptor("a", "Part 07"), descriptor("b", "Part 8")];

        let report = importer.import_batch(Category::Lathe, "Basics", &batch, true).await.unwrap();
        assert_eq!(report, BatchReport { inserted: 2, skipped: 0, failed: 0, total: 2 });

        let lessons = store.lessons().await;
        let titles: Vec<_> = lessons.iter().map(|l| l.title_vi.as_str()).collect();
        assert_eq!(titles, vec!["Part 07", "Part 08"]);
        assert_eq!(lessons[0].order_index, 1);
        assert_eq!(lessons[1].order_index, 2);
        assert!(lessons[0].is_preview);
        assert!(!lessons[1].is_preview);
    }

    #[tokio::test]
    async fn test_course_created_from_static_fields() {
        let store = InMemoryStore::new();
        let importer = Importer::new(Arc::new(store.clone()), None).unwrap();
        importer
            .import_batch(Category::MultiAxis, "Intro", &[descriptor("a", "Setup")], false)
            .await
            .unwrap();

        let courses = store.courses().await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].slug, Category::MultiAxis.course_spec().slug);
        assert!(!store.lessons().await[0].is_preview);
    }
}
