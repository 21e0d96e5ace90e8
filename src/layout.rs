//! Storage layout strategies for the two project formats.
//!
//! A [`FormatLayout`] bundles the format-dependent operations
//! (initialization, batch fetching, export) behind one trait so the
//! format is resolved to a strategy once per project instead of being
//! re-dispatched in every method. [`layout_for`] selects the strategy.
//!
//! Both layouts write the same three-file shape under the project root:
//! the data file (or generated name index), a final-tags file, and a
//! pre-tags file, all with exactly `num_total_rows` aligned lines. Tag
//! columns are written joined by `\n` with no trailing newline.

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::batch::{clamp_window, derive_status, ensure_row_count};
use crate::error::{Error, Result};
use crate::export::multi_file_table;
use crate::models::{
    DataFormat, DataRow, Project, UploadFile, FILE_DATA_INDEX, FILE_PRETAGS, FILE_TAGS, NO_LABEL,
};
use crate::store::{split_lines, BlobStore};

/// Format-dependent behavior of a project's storage.
#[async_trait]
pub trait FormatLayout: Send + Sync {
    /// Create the project's backing files from the uploaded input and
    /// record locations and row counts on the project.
    ///
    /// On a partial failure the storage is left as-is (no rollback) and
    /// the project must not be persisted; callers clean up with
    /// `delete_project_files` before retrying.
    async fn initialize(
        &self,
        store: &dyn BlobStore,
        project: &mut Project,
        files: &[UploadFile],
    ) -> Result<()>;

    /// Produce the row-level tagging view for a window of rows.
    async fn fetch_batch(
        &self,
        store: &dyn BlobStore,
        project: &Project,
        batch_start: usize,
        batch_size: usize,
    ) -> Result<Vec<DataRow>>;

    /// Serialize the project's committed tags for download.
    async fn export(&self, store: &dyn BlobStore, project: &Project) -> Result<String>;
}

/// Strategy for a format, selected once per project.
pub fn layout_for(format: DataFormat) -> &'static dyn FormatLayout {
    match format {
        DataFormat::SingleFile => &SingleFileLayout,
        DataFormat::MultiFile => &MultiFileLayout,
    }
}

/// A tag-file column of `rows` sentinel lines.
fn sentinel_column(rows: usize) -> String {
    vec![NO_LABEL; rows].join("\n")
}

/// Write the two tag files (final and pre) and record their locations.
async fn write_tag_files(
    store: &dyn BlobStore,
    project: &mut Project,
    rows: usize,
) -> Result<()> {
    let column = sentinel_column(rows);

    store
        .upload(&project.file_path(FILE_TAGS), column.as_bytes())
        .await?;
    project.tags_location = FILE_TAGS.to_string();

    store
        .upload(&project.file_path(FILE_PRETAGS), column.as_bytes())
        .await?;
    project.pretags_location = FILE_PRETAGS.to_string();

    Ok(())
}

/// One delimited data file; rows are its lines.
pub struct SingleFileLayout;

#[async_trait]
impl FormatLayout for SingleFileLayout {
    async fn initialize(
        &self,
        store: &dyn BlobStore,
        project: &mut Project,
        files: &[UploadFile],
    ) -> Result<()> {
        let file = files.first().ok_or(Error::EmptyUpload)?;

        // Leading/trailing whitespace never counts as rows; a final
        // newline must not create a phantom empty row.
        let content = file.content.trim();
        let rows = split_lines(content).len();
        if rows == 0 {
            return Err(Error::EmptyUpload);
        }

        store
            .upload(&project.file_path(&file.name), content.as_bytes())
            .await?;
        project.data_location = file.name.clone();

        write_tag_files(store, project, rows).await?;

        project.num_tagged_rows = 0;
        project.num_total_rows = rows;
        info!(project = %project.uuid, rows, "initialized single-file project");
        Ok(())
    }

    async fn fetch_batch(
        &self,
        store: &dyn BlobStore,
        project: &Project,
        batch_start: usize,
        batch_size: usize,
    ) -> Result<Vec<DataRow>> {
        let total = project.num_total_rows;
        let data_path = project.data_path();
        let tags_path = project.tags_path();
        let pretags_path = project.pretags_path();

        let data = ensure_row_count(store.download_lines(&data_path).await?, total, &data_path)?;
        let tags = ensure_row_count(store.download_lines(&tags_path).await?, total, &tags_path)?;
        let pres = ensure_row_count(
            store.download_lines(&pretags_path).await?,
            total,
            &pretags_path,
        )?;

        let window = clamp_window(batch_start, batch_size, total);
        debug!(project = %project.uuid, start = window.start, end = window.end, "assembling batch");

        let mut rows = Vec::with_capacity(window.len());
        for idx in window {
            let (status, tag) = derive_status(&tags[idx], &pres[idx]);
            rows.push(DataRow {
                name: format!("Data Row {}", idx),
                row_id: idx,
                content: data[idx].clone(),
                status,
                tag,
            });
        }
        Ok(rows)
    }

    async fn export(&self, store: &dyn BlobStore, project: &Project) -> Result<String> {
        // The tags file already is the export artifact: one tag per line,
        // aligned to data rows.
        store.download_string(&project.tags_path()).await
    }
}

/// Many discrete files plus a generated name index; rows are files.
pub struct MultiFileLayout;

#[async_trait]
impl FormatLayout for MultiFileLayout {
    async fn initialize(
        &self,
        store: &dyn BlobStore,
        project: &mut Project,
        files: &[UploadFile],
    ) -> Result<()> {
        if files.is_empty() {
            return Err(Error::EmptyUpload);
        }

        // Concurrent uploads, but success is only reported after every
        // write is confirmed.
        let uploads = files.iter().map(|file| {
            let path = project.file_path(&file.name);
            async move { store.upload(&path, file.content.as_bytes()).await }
        });
        try_join_all(uploads).await?;

        // Input order defines the canonical row ids for the project's
        // lifetime.
        let index = files
            .iter()
            .map(|file| file.name.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        store
            .upload(&project.file_path(FILE_DATA_INDEX), index.as_bytes())
            .await?;
        project.data_location = FILE_DATA_INDEX.to_string();

        write_tag_files(store, project, files.len()).await?;

        project.num_tagged_rows = 0;
        project.num_total_rows = files.len();
        info!(project = %project.uuid, rows = files.len(), "initialized multi-file project");
        Ok(())
    }

    async fn fetch_batch(
        &self,
        store: &dyn BlobStore,
        project: &Project,
        batch_start: usize,
        batch_size: usize,
    ) -> Result<Vec<DataRow>> {
        let total = project.num_total_rows;
        let index_path = project.data_path();
        let tags_path = project.tags_path();
        let pretags_path = project.pretags_path();

        let names = ensure_row_count(store.download_lines(&index_path).await?, total, &index_path)?;
        let tags = ensure_row_count(store.download_lines(&tags_path).await?, total, &tags_path)?;
        let pres = ensure_row_count(
            store.download_lines(&pretags_path).await?,
            total,
            &pretags_path,
        )?;

        let window = clamp_window(batch_start, batch_size, total);
        debug!(project = %project.uuid, start = window.start, end = window.end, "assembling batch");

        let mut rows = Vec::with_capacity(window.len());
        for idx in window {
            let name = names[idx].clone();
            let content = store.download_string(&project.file_path(&name)).await?;
            let (status, tag) = derive_status(&tags[idx], &pres[idx]);
            rows.push(DataRow {
                name,
                row_id: idx,
                content,
                status,
                tag,
            });
        }
        Ok(rows)
    }

    async fn export(&self, store: &dyn BlobStore, project: &Project) -> Result<String> {
        let total = project.num_total_rows;
        let index_path = project.data_path();
        let tags_path = project.tags_path();

        let names = ensure_row_count(store.download_lines(&index_path).await?, total, &index_path)?;
        let tags = ensure_row_count(store.download_lines(&tags_path).await?, total, &tags_path)?;

        Ok(multi_file_table(&names[..total], &tags[..total]))
    }
}
