//! Taxonomy data sources
//!
//! `JsonDirSource` reads `main/*.json` and `detailed/*.json` under a root
//! directory. `InMemorySource` serves records built in code.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::records::{DetailedRecord, MainRecord};
use super::TaxonomyError;

/// Read-only provider of raw taxonomy records
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    async fn load_main_records(&self) -> Result<Vec<MainRecord>, TaxonomyError>;

    async fn load_detailed_records(&self) -> Result<Vec<DetailedRecord>, TaxonomyError>;
}

/// Directory of JSON files, one record per file
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn main_dir(&self) -> PathBuf {
        self.root.join("main")
    }

    fn detailed_dir(&self) -> PathBuf {
        self.root.join("detailed")
    }
}

#[async_trait]
impl TaxonomySource for JsonDirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn load_main_records(&self) -> Result<Vec<MainRecord>, TaxonomyError> {
        let dir = self.main_dir();
        let files = list_json_files(&dir).await?;
        read_records(&files).await
    }

    async fn load_detailed_records(&self) -> Result<Vec<DetailedRecord>, TaxonomyError> {
        let dir = self.detailed_dir();
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            tracing::warn!(path = %dir.display(), "No detailed genre directory, skipping");
            return Ok(Vec::new());
        }
        let files = list_json_files(&dir).await?;
        read_records(&files).await
    }
}

/// `.json` files in `dir`, sorted by file name for a stable load order
async fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, TaxonomyError> {
    let read_err = |source| TaxonomyError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut reader = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut files = Vec::new();
    while let Some(item) = reader.next_entry().await.map_err(read_err)? {
        let path = item.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn read_records<T: DeserializeOwned>(files: &[PathBuf]) -> Result<Vec<T>, TaxonomyError> {
    let mut records = Vec::with_capacity(files.len());
    for path in files {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TaxonomyError::Read {
                path: path.clone(),
                source,
            })?;
        let record = serde_json::from_str(&content).map_err(|e| TaxonomyError::Malformed {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    tracing::debug!(count = records.len(), "Read genre records");
    Ok(records)
}

/// Records supplied directly, e.g. embedded data or test fixtures
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    mains: Vec<MainRecord>,
    detailed: Vec<DetailedRecord>,
}

impl InMemorySource {
    pub fn new(mains: Vec<MainRecord>, detailed: Vec<DetailedRecord>) -> Self {
        Self { mains, detailed }
    }
}

#[async_trait]
impl TaxonomySource for InMemorySource {
    fn describe(&self) -> String {
        format!(
            "in-memory ({} main, {} detailed)",
            self.mains.len(),
            self.detailed.len()
        )
    }

    async fn load_main_records(&self) -> Result<Vec<MainRecord>, TaxonomyError> {
        Ok(self.mains.clone())
    }

    async fn load_detailed_records(&self) -> Result<Vec<DetailedRecord>, TaxonomyError> {
        Ok(self.detailed.clone())
    }
}
