//! Core data models for labeling projects.
//!
//! A [`Project`] names a storage root (`owner_id/uuid/`) holding three
//! row-aligned files: the data file (or generated name index), the
//! final-tags file, and the pre-tags file. Row `i` in each file refers to
//! the same logical unit; that alignment is established at initialization
//! and preserved by every mutation path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reserved literal marking an un-set data placeholder.
///
/// Not written by the current initialization paths; kept as a semantic
/// constant of the file format.
pub const NO_DATA: &str = "NO_DATA";

/// Reserved literal marking an un-set tag in either tag file.
pub const NO_LABEL: &str = "NO_LABEL";

/// Relative name of the final-tags file under the project root.
pub const FILE_TAGS: &str = "tags.csv";

/// Relative name of the pre-tags file under the project root.
pub const FILE_PRETAGS: &str = "silver_standard.csv";

/// Relative name of the generated index for multi-file projects.
pub const FILE_DATA_INDEX: &str = "data_index.csv";

/// The two supported storage layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    /// One delimited data file; rows are its lines.
    SingleFile,
    /// Many discrete files plus a generated name index; rows are files.
    MultiFile,
}

impl DataFormat {
    /// Name used on the pre-tagging wire contract.
    pub fn wire_name(&self) -> &'static str {
        match self {
            DataFormat::SingleFile => "CSV",
            DataFormat::MultiFile => "TXT",
        }
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CSV" | "csv" | "single-file" | "SingleFile" => Ok(DataFormat::SingleFile),
            "TXT" | "txt" | "multi-file" | "MultiFile" => Ok(DataFormat::MultiFile),
            other => Err(format!("unknown data format: {other}")),
        }
    }
}

/// Kind of labeling task. Opaque to this crate; passed through to the
/// pre-tagging service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    SentimentAnalysis,
    TextClassification,
    PosTagging,
    NerTagging,
}

impl ProjectType {
    /// Display form used on the pre-tagging wire contract.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ProjectType::SentimentAnalysis => "Sentiment Analysis",
            ProjectType::TextClassification => "Text Classification",
            ProjectType::PosTagging => "POS Tagging",
            ProjectType::NerTagging => "NER Tagging",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    // Accepts both the spaced display form and the compact form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sentiment Analysis" | "SentimentAnalysis" => Ok(ProjectType::SentimentAnalysis),
            "Text Classification" | "TextClassification" => Ok(ProjectType::TextClassification),
            "POS Tagging" | "POSTagging" => Ok(ProjectType::PosTagging),
            "NER Tagging" | "NERTagging" => Ok(ProjectType::NerTagging),
            other => Err(format!("unknown project type: {other}")),
        }
    }
}

/// Tagging progress of a row or a whole project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// No committed tag and no suggestion.
    NotTagged,
    /// An automatic suggestion exists but no committed tag. At the project
    /// level, set only as a side effect of a successful pre-tagging run.
    PreTagged,
    /// A committed tag exists. At the project level, every row is tagged.
    Tagged,
}

/// A labeling project's data-plane state.
///
/// Constructed by [`ProjectManager::initialize_project`] and advanced by
/// the file-setting, tag-mutation, and pre-tagging operations. Persistence
/// of this struct (database, JSON file) belongs to the caller.
///
/// [`ProjectManager::initialize_project`]: crate::manager::ProjectManager::initialize_project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub owner_id: String,
    pub description: String,
    /// Generated at construction; with `owner_id` it forms the storage root.
    pub uuid: String,
    pub project_type: ProjectType,
    pub data_format: DataFormat,
    /// Tag strings the caller configured for this project. Carried, not
    /// interpreted.
    pub tag_vocabulary: Vec<String>,
    pub status: Status,
    /// Relative path of the data file (single-file) or name index
    /// (multi-file) under the project root. Empty until files are set.
    #[serde(default)]
    pub data_location: String,
    /// Relative path of the final-tags file. Empty until files are set.
    #[serde(default)]
    pub tags_location: String,
    /// Relative path of the pre-tags file. Empty until files are set;
    /// replaced by the pre-tagging service's output location on success.
    #[serde(default)]
    pub pretags_location: String,
    /// Row count of the canonical index, fixed when files are set.
    #[serde(default)]
    pub num_total_rows: usize,
    /// Rows whose final tag is not the sentinel.
    #[serde(default)]
    pub num_tagged_rows: usize,
}

impl Project {
    /// Storage root for this project, with a trailing slash.
    pub fn root(&self) -> String {
        format!("{}/{}/", self.owner_id, self.uuid)
    }

    /// Full store path of a file under the project root.
    pub fn file_path(&self, name: &str) -> String {
        format!("{}{}", self.root(), name)
    }

    /// Full store path of the data file or name index.
    pub fn data_path(&self) -> String {
        self.file_path(&self.data_location)
    }

    /// Full store path of the final-tags file.
    pub fn tags_path(&self) -> String {
        self.file_path(&self.tags_location)
    }

    /// Full store path of the pre-tags file.
    pub fn pretags_path(&self) -> String {
        self.file_path(&self.pretags_location)
    }
}

/// One input file for project initialization.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Relative name the file is stored under.
    pub name: String,
    /// Decoded textual content.
    pub content: String,
}

/// A single row of the batched tagging view.
///
/// Ephemeral: constructed per batch request, never persisted. `tag` is
/// absent exactly when `status` is [`Status::NotTagged`].
#[derive(Debug, Clone, Serialize)]
pub struct DataRow {
    /// `Data Row {index}` for single-file projects; the file name for
    /// multi-file projects.
    pub name: String,
    /// Zero-based index into the canonical row ordering.
    pub row_id: usize,
    /// The row's text.
    pub content: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_service_contract() {
        assert_eq!(DataFormat::SingleFile.wire_name(), "CSV");
        assert_eq!(DataFormat::MultiFile.wire_name(), "TXT");
        assert_eq!(ProjectType::SentimentAnalysis.wire_name(), "Sentiment Analysis");
        assert_eq!(ProjectType::PosTagging.wire_name(), "POS Tagging");
        assert_eq!(ProjectType::NerTagging.wire_name(), "NER Tagging");
    }

    #[test]
    fn project_type_parses_both_spellings() {
        assert_eq!(
            "Text Classification".parse::<ProjectType>().unwrap(),
            ProjectType::TextClassification
        );
        assert_eq!(
            "TextClassification".parse::<ProjectType>().unwrap(),
            ProjectType::TextClassification
        );
        assert!("Image Classification".parse::<ProjectType>().is_err());
    }

    #[test]
    fn paths_are_rooted_under_owner_and_uuid() {
        let project = Project {
            name: "reviews".into(),
            owner_id: "42".into(),
            description: String::new(),
            uuid: "abcd".into(),
            project_type: ProjectType::SentimentAnalysis,
            data_format: DataFormat::SingleFile,
            tag_vocabulary: vec![],
            status: Status::NotTagged,
            data_location: "reviews.csv".into(),
            tags_location: FILE_TAGS.into(),
            pretags_location: FILE_PRETAGS.into(),
            num_total_rows: 0,
            num_tagged_rows: 0,
        };
        assert_eq!(project.root(), "42/abcd/");
        assert_eq!(project.data_path(), "42/abcd/reviews.csv");
        assert_eq!(project.tags_path(), "42/abcd/tags.csv");
        assert_eq!(project.pretags_path(), "42/abcd/silver_standard.csv");
    }

    #[test]
    fn status_serializes_as_variant_name() {
        assert_eq!(
            serde_json::to_string(&Status::PreTagged).unwrap(),
            "\"PreTagged\""
        );
    }
}
