//! # labelkit
//!
//! A blob-store-backed data-plane engine for text labeling projects.
//!
//! labelkit owns the storage layout and row-level tag state of a labeling
//! project: it initializes the aligned data / final-tags / pre-tags files,
//! reconciles them into a batched row view, applies single-row tag edits
//! with completion bookkeeping, drives the external automatic pre-tagging
//! service, and renders the final export artifact.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌─────────────┐
//! │ BlobStore   │◀──│ FormatLayout   │◀──│ Project      │
//! │ local/S3/mem│   │ single / multi │   │ Manager      │
//! └─────────────┘   └───────────────┘   └──────┬──────┘
//!                                              │
//!                        ┌─────────────────────┼──────────┐
//!                        ▼                     ▼          ▼
//!                  ┌──────────┐         ┌──────────┐ ┌─────────┐
//!                  │  batch   │         │   tags   │ │ pretag  │
//!                  │ (window) │         │ (mutate) │ │ (HTTP)  │
//!                  └──────────┘         └──────────┘ └─────────┘
//! ```
//!
//! The blob store is the single source of truth; no state is cached
//! across calls. Row `i` of the data file, the final-tags file, and the
//! pre-tags file always refers to the same logical unit.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration (store backend, pre-tagger endpoint) |
//! | [`error`] | Typed error taxonomy |
//! | [`models`] | Project, DataRow, enums, file-name and sentinel constants |
//! | [`store`] | Blob store trait and line splitting |
//! | [`store_fs`] | Local filesystem backend |
//! | [`store_s3`] | S3 backend (SigV4 REST) |
//! | [`store_mem`] | In-memory backend for tests |
//! | [`layout`] | Per-format storage strategies |
//! | [`batch`] | Window clamping and status precedence |
//! | [`tags`] | Single-row tag mutation |
//! | [`pretag`] | Pre-tagging service client |
//! | [`export`] | Export table rendering |
//! | [`manager`] | Public operations facade |

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod manager;
pub mod models;
pub mod pretag;
pub mod store;
pub mod store_fs;
pub mod store_mem;
pub mod store_s3;
pub mod tags;

pub use error::{Error, Result};
pub use manager::ProjectManager;
pub use models::{DataFormat, DataRow, Project, ProjectType, Status, UploadFile};
