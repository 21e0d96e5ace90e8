//! # labelkit CLI (`lk`)
//!
//! Drives the labeling data-plane from the command line: create a
//! project, upload its data files, page through rows, commit tags,
//! request pre-tags, and export the result. Project state is kept in a
//! JSON file that mutating commands rewrite; the backing store (local
//! directory or S3 bucket) comes from the TOML config.
//!
//! ## Usage
//!
//! ```bash
//! lk --config ./config/lk.toml <command>
//! ```
//!
//! ```bash
//! # Create a project description
//! lk init --name reviews --owner 42 --project-type "Sentiment Analysis" \
//!     --format CSV --tag pos --tag neg --out reviews.json
//!
//! # Upload the data file and generate the tag files
//! lk upload --project reviews.json ./reviews.csv
//!
//! # Page through rows, commit a tag, export
//! lk batch --project reviews.json --start 0 --size 10
//! lk tag --project reviews.json --row 1 --tag pos
//! lk export --project reviews.json --output tags.csv
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use labelkit::config::load_config;
use labelkit::{DataFormat, Project, ProjectManager, ProjectType, UploadFile};

/// labelkit, a blob-store-backed data-plane engine for labeling projects.
#[derive(Parser)]
#[command(
    name = "lk",
    about = "labelkit: manage the data files and tag state of labeling projects",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project description (no storage I/O).
    Init {
        #[arg(long)]
        name: String,
        /// Owner id forming the first path segment of the storage root.
        #[arg(long)]
        owner: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Labeling task kind, e.g. "Sentiment Analysis" or "POS Tagging".
        #[arg(long)]
        project_type: String,
        /// Storage format: CSV (one delimited file) or TXT (many files).
        #[arg(long)]
        format: String,
        /// Tag vocabulary entry; repeat for more.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Where to write the project JSON.
        #[arg(long, default_value = "project.json")]
        out: PathBuf,
    },

    /// Upload data files and initialize the tag files.
    Upload {
        #[arg(long)]
        project: PathBuf,
        /// Files to upload; directories are walked recursively.
        paths: Vec<PathBuf>,
    },

    /// Print a window of rows with their tagging status as JSON.
    Batch {
        #[arg(long)]
        project: PathBuf,
        #[arg(long, default_value_t = 0)]
        start: usize,
        #[arg(long, default_value_t = 10)]
        size: usize,
    },

    /// Commit one row's final tag.
    Tag {
        #[arg(long)]
        project: PathBuf,
        #[arg(long)]
        row: usize,
        #[arg(long)]
        tag: String,
    },

    /// Ask the pre-tagging service to fill the pre-tags file.
    Pretag {
        #[arg(long)]
        project: PathBuf,
    },

    /// Export committed tags (stdout or --output).
    Export {
        #[arg(long)]
        project: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Delete every stored file of the project.
    Delete {
        #[arg(long)]
        project: PathBuf,
    },
}

fn load_project(path: &Path) -> Result<Project> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| "Failed to parse project file")
}

fn save_project(path: &Path, project: &Project) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write project file: {}", path.display()))
}

/// Collect upload files from file and directory arguments.
///
/// Directories are walked recursively; entries are sorted by name for a
/// deterministic row ordering.
fn collect_files(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    entries.push(entry.into_path());
                }
            }
            entries.sort();
            for entry in entries {
                files.push(read_upload_file(&entry)?);
            }
        } else {
            files.push(read_upload_file(path)?);
        }
    }
    Ok(files)
}

fn read_upload_file(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("Not a file: {}", path.display()))?
        .to_string_lossy()
        .to_string();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    Ok(UploadFile { name, content })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init {
        name,
        owner,
        description,
        project_type,
        format,
        tags,
        out,
    } = &cli.command
    {
        let project_type: ProjectType = project_type.parse().map_err(|e: String| anyhow!(e))?;
        let data_format: DataFormat = format.parse().map_err(|e: String| anyhow!(e))?;
        let project = ProjectManager::initialize_project(
            name.as_str(),
            owner.as_str(),
            description.as_str(),
            project_type,
            data_format,
            tags.clone(),
        );
        save_project(out, &project)?;
        println!("Created project {} ({})", project.name, project.uuid);
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    let manager = ProjectManager::from_config(&config)?;

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Upload { project, paths } => {
            let mut proj = load_project(&project)?;
            let files = collect_files(&paths)?;
            if files.is_empty() {
                bail!("No input files given");
            }
            manager.set_project_files(&mut proj, &files).await?;
            save_project(&project, &proj)?;
            println!(
                "Uploaded {} rows for project {}",
                proj.num_total_rows, proj.uuid
            );
        }

        Commands::Batch {
            project,
            start,
            size,
        } => {
            let proj = load_project(&project)?;
            let rows = manager.get_data_batch(&proj, start, size).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        Commands::Tag { project, row, tag } => {
            let mut proj = load_project(&project)?;
            manager.update_tag(&mut proj, row, &tag).await?;
            save_project(&project, &proj)?;
            println!(
                "Tagged row {} ({}/{} rows tagged)",
                row, proj.num_tagged_rows, proj.num_total_rows
            );
        }

        Commands::Pretag { project } => {
            let mut proj = load_project(&project)?;
            manager.generate_pretags(&mut proj).await?;
            save_project(&project, &proj)?;
            println!("Pre-tags written to {}", proj.pretags_location);
        }

        Commands::Export { project, output } => {
            let proj = load_project(&project)?;
            let artifact = manager.export_project(&proj).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &artifact)?;
                    eprintln!("Exported {} rows to {}", proj.num_total_rows, path.display());
                }
                None => println!("{}", artifact),
            }
        }

        Commands::Delete { project } => {
            let proj = load_project(&project)?;
            manager.delete_project_files(&proj).await?;
            println!("Deleted files of project {}", proj.uuid);
        }
    }

    Ok(())
}
