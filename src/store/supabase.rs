use super::CatalogStore;
use crate::catalog::{CourseRecord, LessonRecord, ModuleRecord, NewCourse, NewLesson, NewModule};
use crate::config::StoreConfig;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Catalog store backed by a PostgREST endpoint
pub struct SupabaseStore {
    client: reqwest::Client,
    rest_base: Url,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| SyncError::ConfigurationMissing("SUPABASE_URL".to_string()))?;
        let service_key = config
            .service_key
            .clone()
            .ok_or_else(|| SyncError::ConfigurationMissing("SUPABASE_SERVICE_ROLE_KEY".to_string()))?;

        let rest_base = rest_base(url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            rest_base,
            service_key,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.rest_base
            .join(table)
            .map_err(|e| SyncError::InvalidConfig(format!("bad table path {}: {}", table, e)))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend(filters.iter().map(|(k, v)| (*k, format!("eq.{}", v))));

        let response = self
            .authorized(self.client.get(self.table_url(table)?))
            .query(&query)
            .send()
            .await
            .map_err(|e| SyncError::persistence(table, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::persistence(
                table,
                format!("select failed with {}: {}", status, truncate(&body)),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::persistence(table, e))
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &'static str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>> {
        Ok(self.select(table, filters).await?.into_iter().next())
    }

    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &'static str,
        row: &B,
    ) -> Result<T> {
        let response = self
            .authorized(self.client.post(self.table_url(table)?))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| SyncError::persistence(table, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::persistence(
                table,
                format!("insert failed with {}: {}", status, truncate(&body)),
            ));
        }

        let rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| SyncError::persistence(table, e))?;
        debug!("Inserted into {}", table);

        rows.into_iter()
            .next()
            .ok_or_else(|| SyncError::persistence(table, "insert returned no row"))
    }
}

#[async_trait]
impl CatalogStore for SupabaseStore {
    async fn find_course(&self, slug: &str) -> Result<Option<CourseRecord>> {
        self.select_one("courses", &[("slug", slug.to_string())]).await
    }

    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord> {
        self.insert("courses", &course).await
    }

    async fn find_module(&self, course_id: &str, title: &str) -> Result<Option<ModuleRecord>> {
        self.select_one(
            "modules",
            &[("course_id", course_id.to_string()), ("title_vi", title.to_string())],
        )
        .await
    }

    async fn create_module(&self, module: NewModule) -> Result<ModuleRecord> {
        self.insert("modules", &module).await
    }

    async fn list_modules(&self, course_id: &str) -> Result<Vec<ModuleRecord>> {
        self.select("modules", &[("course_id", course_id.to_string())]).await
    }

    async fn find_lesson(&self, module_id: &str, video_id: &str) -> Result<Option<LessonRecord>> {
        self.select_one(
            "lessons",
            &[("module_id", module_id.to_string()), ("bunny_video_id", video_id.to_string())],
        )
        .await
    }

    async fn create_lesson(&self, lesson: NewLesson) -> Result<LessonRecord> {
        self.insert("lessons", &lesson).await
    }

    async fn list_lessons(&self, module_id: &str) -> Result<Vec<LessonRecord>> {
        self.select("lessons", &[("module_id", module_id.to_string())]).await
    }
}

/// `https://x.supabase.co` -> `https://x.supabase.co/rest/v1/`
fn rest_base(project_url: &str) -> Result<Url> {
    let mut base = Url::parse(project_url.trim())
        .map_err(|e| SyncError::InvalidConfig(format!("invalid store url {}: {}", project_url, e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("rest/v1/")
        .map_err(|e| SyncError::InvalidConfig(format!("invalid store url {}: {}", project_url, e)))
}

fn truncate(body: &str) -> String {
    body.chars().take(300).collect()
}
