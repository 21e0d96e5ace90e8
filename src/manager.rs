//! Public facade over the labeling data-plane.
//!
//! [`ProjectManager`] holds the injected blob store and pre-tagging
//! client and exposes the operations the request layer consumes. The
//! store is a capability passed in at construction, never resolved from
//! ambient or global state, so alternative backends (local, S3,
//! in-memory) drop in without touching the engines.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::layout::layout_for;
use crate::models::{DataFormat, DataRow, Project, ProjectType, Status, UploadFile};
use crate::pretag::PreTagClient;
use crate::store::BlobStore;
use crate::store_fs::LocalStore;
use crate::store_s3::S3Store;
use crate::tags;

/// Entry point for all project data-plane operations.
pub struct ProjectManager {
    store: Arc<dyn BlobStore>,
    pretagger: PreTagClient,
}

impl ProjectManager {
    pub fn new(store: Arc<dyn BlobStore>, pretagger: PreTagClient) -> Self {
        Self { store, pretagger }
    }

    /// Build a manager with the backend selected by the configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn BlobStore> = match config.store.backend.as_str() {
            "local" => {
                let local = config
                    .store
                    .local
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("[store.local] section missing"))?;
                Arc::new(LocalStore::new(local.root.clone()))
            }
            "s3" => {
                let s3 = config
                    .store
                    .s3
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("[store.s3] section missing"))?;
                Arc::new(S3Store::new(s3)?)
            }
            other => anyhow::bail!("Unknown store backend: {}", other),
        };
        let pretagger = PreTagClient::new(&config.pretagger)?;
        Ok(Self::new(store, pretagger))
    }

    /// Construct a fresh project. Pure: no I/O, no store interaction.
    ///
    /// Generates the project uuid; locations and row counts stay empty
    /// until [`set_project_files`](Self::set_project_files) runs.
    pub fn initialize_project(
        name: impl Into<String>,
        owner_id: impl Into<String>,
        description: impl Into<String>,
        project_type: ProjectType,
        data_format: DataFormat,
        tag_vocabulary: Vec<String>,
    ) -> Project {
        Project {
            name: name.into(),
            owner_id: owner_id.into(),
            description: description.into(),
            uuid: Uuid::new_v4().to_string(),
            project_type,
            data_format,
            tag_vocabulary,
            status: Status::NotTagged,
            data_location: String::new(),
            tags_location: String::new(),
            pretags_location: String::new(),
            num_total_rows: 0,
            num_tagged_rows: 0,
        }
    }

    /// Create the project's backing files from the uploaded input.
    ///
    /// On failure, storage may be partially written; the project must not
    /// be persisted and [`delete_project_files`](Self::delete_project_files)
    /// is the cleanup path before retrying.
    pub async fn set_project_files(
        &self,
        project: &mut Project,
        files: &[UploadFile],
    ) -> Result<()> {
        layout_for(project.data_format)
            .initialize(self.store.as_ref(), project, files)
            .await
    }

    /// Delete everything under the project's storage root.
    pub async fn delete_project_files(&self, project: &Project) -> Result<()> {
        self.store.delete_prefix(&project.root()).await?;
        info!(project = %project.uuid, "deleted project files");
        Ok(())
    }

    /// Fetch the row-level tagging view for a window of rows.
    ///
    /// Rows serialize as a JSON array for the request layer. A window
    /// starting past the last row is empty, not an error.
    pub async fn get_data_batch(
        &self,
        project: &Project,
        batch_start: usize,
        batch_size: usize,
    ) -> Result<Vec<DataRow>> {
        layout_for(project.data_format)
            .fetch_batch(self.store.as_ref(), project, batch_start, batch_size)
            .await
    }

    /// Commit one row's final tag and recompute completion counters.
    pub async fn update_tag(
        &self,
        project: &mut Project,
        row_id: usize,
        tag: &str,
    ) -> Result<()> {
        tags::update_tag(self.store.as_ref(), project, row_id, tag).await
    }

    /// Ask the external service to pre-tag the project.
    pub async fn generate_pretags(&self, project: &mut Project) -> Result<()> {
        self.pretagger.generate(project).await
    }

    /// Serialize the project's committed tags for download.
    pub async fn export_project(&self, project: &Project) -> Result<String> {
        layout_for(project.data_format)
            .export(self.store.as_ref(), project)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_project_is_pure_construction() {
        let project = ProjectManager::initialize_project(
            "reviews",
            "42",
            "movie review sentiment",
            ProjectType::SentimentAnalysis,
            DataFormat::SingleFile,
            vec!["pos".into(), "neg".into()],
        );
        assert_eq!(project.name, "reviews");
        assert_eq!(project.owner_id, "42");
        assert_eq!(project.status, Status::NotTagged);
        assert_eq!(project.num_total_rows, 0);
        assert_eq!(project.num_tagged_rows, 0);
        assert!(project.data_location.is_empty());
        assert!(!project.uuid.is_empty());
    }

    #[test]
    fn each_project_gets_a_distinct_uuid() {
        let a = ProjectManager::initialize_project(
            "a",
            "1",
            "",
            ProjectType::PosTagging,
            DataFormat::MultiFile,
            vec![],
        );
        let b = ProjectManager::initialize_project(
            "b",
            "1",
            "",
            ProjectType::PosTagging,
            DataFormat::MultiFile,
            vec![],
        );
        assert_ne!(a.uuid, b.uuid);
    }
}
