//! Error taxonomy for the labeling data-plane.
//!
//! Engines return these typed variants instead of collapsing failures into
//! an absent result, so callers can distinguish a rejected row id from a
//! store outage. There is no automatic retry anywhere in this crate; a
//! failed upload mid-sequence leaves orphaned storage that the caller
//! cleans up via `delete_project_files` before retrying.

/// Errors produced by the storage layout, reconciliation, mutation,
/// pre-tagging, and export engines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write to the blob store was not confirmed.
    #[error("upload of '{path}' failed: {reason}")]
    Upload {
        /// Store path of the failed write.
        path: String,
        reason: String,
    },

    /// An expected file is missing, unreadable, or truncated relative to
    /// the project's row count.
    #[error("download of '{path}' failed: {reason}")]
    Download {
        /// Store path of the failed read.
        path: String,
        reason: String,
    },

    /// A row id outside the project's canonical row range.
    #[error("row {row_id} is out of range for a project of {num_total_rows} rows")]
    OutOfRange {
        row_id: usize,
        num_total_rows: usize,
    },

    /// No usable input files were supplied at initialization.
    #[error("no data was supplied for upload")]
    EmptyUpload,

    /// A tag value that would break the one-line-per-row file alignment.
    #[error("invalid tag {0:?}: tags must be a single line")]
    InvalidTag(String),

    /// Network failure, non-2xx status, or malformed JSON from the
    /// pre-tagging service.
    #[error("pre-tagging service error: {0}")]
    ExternalService(String),

    /// Recursive deletion of a project's storage root did not complete.
    #[error("failed to delete project directory '{path}': {reason}")]
    DirectoryDelete { path: String, reason: String },

    /// Invalid or incomplete store/client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
