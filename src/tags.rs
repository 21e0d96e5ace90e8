//! Tag mutation engine.
//!
//! A tag edit is a whole-file read-modify-write: the final-tags list is
//! downloaded, one line replaced, and the file re-uploaded in full (no
//! partial or append update exists). The read-modify-write is not guarded
//! against concurrent edits of the same project: the design assumes at
//! most one in-flight mutation per project; multi-writer deployments need
//! a per-project single-writer queue in front of this engine.

use tracing::info;

use crate::batch::ensure_row_count;
use crate::error::{Error, Result};
use crate::models::{Project, Status, NO_LABEL};
use crate::store::BlobStore;

/// Overwrite the final tag of one row and recompute project completion.
///
/// Rejects `row_id >= num_total_rows` with [`Error::OutOfRange`] and tag
/// values spanning more than one line with [`Error::InvalidTag`] (a
/// multi-line value would desynchronize the tag file from the data file).
/// On upload failure the error propagates and the in-memory project must
/// be discarded by the caller.
///
/// Idempotent: re-applying the same `(row_id, tag)` produces identical
/// file content and counters. Writing the sentinel un-tags a row; the
/// project-level status is never downgraded by this path.
pub async fn update_tag(
    store: &dyn BlobStore,
    project: &mut Project,
    row_id: usize,
    tag: &str,
) -> Result<()> {
    if row_id >= project.num_total_rows {
        return Err(Error::OutOfRange {
            row_id,
            num_total_rows: project.num_total_rows,
        });
    }
    if tag.contains('\n') || tag.contains('\r') {
        return Err(Error::InvalidTag(tag.to_string()));
    }

    let path = project.tags_path();
    let mut lines = ensure_row_count(
        store.download_lines(&path).await?,
        project.num_total_rows,
        &path,
    )?;
    lines[row_id] = tag.to_string();

    let contents = lines.join("\n");
    store.upload(&path, contents.as_bytes()).await?;

    let tagged = lines.iter().filter(|line| line.as_str() != NO_LABEL).count();
    project.num_tagged_rows = tagged;
    if tagged == lines.len() {
        project.status = Status::Tagged;
    }

    info!(
        project = %project.uuid,
        row_id,
        tagged,
        total = project.num_total_rows,
        "updated tag"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataFormat, ProjectType};
    use crate::store_mem::MemoryStore;

    fn tagged_project(total: usize) -> Project {
        Project {
            name: "test".into(),
            owner_id: "1".into(),
            description: String::new(),
            uuid: "p".into(),
            project_type: ProjectType::SentimentAnalysis,
            data_format: DataFormat::SingleFile,
            tag_vocabulary: vec![],
            status: Status::NotTagged,
            data_location: "rows.csv".into(),
            tags_location: "tags.csv".into(),
            pretags_location: "silver_standard.csv".into(),
            num_total_rows: total,
            num_tagged_rows: 0,
        }
    }

    async fn seed_tags(store: &MemoryStore, column: &str) {
        store.upload("1/p/tags.csv", column.as_bytes()).await.unwrap();
    }

    #[tokio::test]
    async fn rewrites_only_the_requested_row() {
        let store = MemoryStore::new();
        seed_tags(&store, "NO_LABEL\nNO_LABEL\nNO_LABEL").await;
        let mut p = tagged_project(3);

        update_tag(&store, &mut p, 1, "pos").await.unwrap();

        assert_eq!(
            store.download_string("1/p/tags.csv").await.unwrap(),
            "NO_LABEL\npos\nNO_LABEL"
        );
        assert_eq!(p.num_tagged_rows, 1);
        assert_eq!(p.status, Status::NotTagged);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let store = MemoryStore::new();
        seed_tags(&store, "NO_LABEL\nNO_LABEL\nNO_LABEL").await;
        let mut p = tagged_project(3);

        update_tag(&store, &mut p, 1, "pos").await.unwrap();
        let first = store.download_string("1/p/tags.csv").await.unwrap();
        let first_count = p.num_tagged_rows;

        update_tag(&store, &mut p, 1, "pos").await.unwrap();
        assert_eq!(store.download_string("1/p/tags.csv").await.unwrap(), first);
        assert_eq!(p.num_tagged_rows, first_count);
    }

    #[tokio::test]
    async fn completing_every_row_marks_the_project_tagged() {
        let store = MemoryStore::new();
        seed_tags(&store, "NO_LABEL\nNO_LABEL").await;
        let mut p = tagged_project(2);

        update_tag(&store, &mut p, 0, "pos").await.unwrap();
        assert_eq!(p.status, Status::NotTagged);

        update_tag(&store, &mut p, 1, "neg").await.unwrap();
        assert_eq!(p.status, Status::Tagged);
        assert_eq!(p.num_tagged_rows, 2);
    }

    #[tokio::test]
    async fn status_is_never_downgraded_by_untagging() {
        let store = MemoryStore::new();
        seed_tags(&store, "pos\nneg").await;
        let mut p = tagged_project(2);
        p.status = Status::Tagged;
        p.num_tagged_rows = 2;

        update_tag(&store, &mut p, 0, NO_LABEL).await.unwrap();
        assert_eq!(p.num_tagged_rows, 1);
        assert_eq!(p.status, Status::Tagged);
    }

    #[tokio::test]
    async fn rejects_row_one_past_the_end() {
        // The boundary is exclusive: a project of 3 rows accepts ids 0..=2.
        let store = MemoryStore::new();
        seed_tags(&store, "NO_LABEL\nNO_LABEL\nNO_LABEL").await;
        let mut p = tagged_project(3);

        let err = update_tag(&store, &mut p, 3, "pos").await.unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                row_id: 3,
                num_total_rows: 3
            }
        ));
        // Storage is untouched on the rejected path.
        assert_eq!(
            store.download_string("1/p/tags.csv").await.unwrap(),
            "NO_LABEL\nNO_LABEL\nNO_LABEL"
        );
    }

    #[tokio::test]
    async fn rejects_multi_line_tags() {
        let store = MemoryStore::new();
        seed_tags(&store, "NO_LABEL\nNO_LABEL").await;
        let mut p = tagged_project(2);

        let err = update_tag(&store, &mut p, 0, "pos\nneg").await.unwrap_err();
        assert!(matches!(err, Error::InvalidTag(_)));
    }
}
