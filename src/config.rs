use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub pretagger: PreTaggerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// `"local"` or `"s3"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    pub local: Option<LocalStoreConfig>,
    pub s3: Option<S3StoreConfig>,
}

fn default_backend() -> String {
    "local".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocalStoreConfig {
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3StoreConfig {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreTaggerConfig {
    /// Base URL of the pre-tagging service.
    #[serde(default = "default_pretagger_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PreTaggerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_pretagger_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_pretagger_endpoint() -> String {
    "http://localhost:8800".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    match config.store.backend.as_str() {
        "local" => {
            if config.store.local.is_none() {
                bail!("store.backend = \"local\" requires a [store.local] section");
            }
        }
        "s3" => {
            if config.store.s3.is_none() {
                bail!("store.backend = \"s3\" requires a [store.s3] section");
            }
        }
        other => bail!("Unknown store backend: {}", other),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_local_config_with_defaults() {
        let file = write_config(
            r#"
[store]
backend = "local"

[store.local]
root = "/tmp/labelkit"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.store.backend, "local");
        assert_eq!(
            config.store.local.unwrap().root,
            PathBuf::from("/tmp/labelkit")
        );
        assert_eq!(config.pretagger.timeout_secs, 30);
    }

    #[test]
    fn parses_s3_config() {
        let file = write_config(
            r#"
[store]
backend = "s3"

[store.s3]
bucket = "acme-labeling"
region = "us-east-1"
endpoint_url = "http://localhost:9000"

[pretagger]
endpoint = "https://pretagger.internal"
timeout_secs = 10
"#,
        );
        let config = load_config(file.path()).unwrap();
        let s3 = config.store.s3.unwrap();
        assert_eq!(s3.bucket, "acme-labeling");
        assert_eq!(s3.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.pretagger.endpoint, "https://pretagger.internal");
    }

    #[test]
    fn rejects_backend_without_its_section() {
        let file = write_config("[store]\nbackend = \"s3\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn rejects_unknown_backend() {
        let file = write_config("[store]\nbackend = \"ftp\"\n");
        assert!(load_config(file.path()).is_err());
    }
}
