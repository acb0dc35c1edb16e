//! Genre taxonomy: immutable index plus the lazily-initialized store
//!
//! `Taxonomy` is the read-only index built once from a `TaxonomySource`.
//! `TaxonomyStore` owns the single-flight initialization: concurrent first
//! callers await one shared load, and a failed load leaves the store empty
//! so the next call tries again.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use thiserror::Error;
use tokio::sync::OnceCell;

use crate::types::{normalize_name, GenreEntry, GenreRef, Tier};

pub mod records;
pub mod source;

pub use records::{merge, DetailedRecord, MainRecord, RawChild, RawGenre, TaxonomyBuilder, TaxonomyRecord};
pub use source::{InMemorySource, JsonDirSource, TaxonomySource};

/// Taxonomy loading errors
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("Taxonomy source unavailable: {0}")]
    Unavailable(String),
}

/// Immutable, name-indexed genre hierarchy
#[derive(Debug)]
pub struct Taxonomy {
    entries: Vec<GenreEntry>,
    index: HashMap<String, usize>,
    by_tier: [OnceLock<Vec<usize>>; 3],
    digest: OnceLock<String>,
}

impl Taxonomy {
    pub(crate) fn from_parts(entries: Vec<GenreEntry>, index: HashMap<String, usize>) -> Self {
        Self {
            entries,
            index,
            by_tier: [OnceLock::new(), OnceLock::new(), OnceLock::new()],
            digest: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive exact lookup
    pub fn get_by_name(&self, name: &str) -> Option<&GenreEntry> {
        self.index
            .get(&normalize_name(name))
            .map(|&pos| &self.entries[pos])
    }

    /// Every entry in load order
    pub fn list_all(&self) -> &[GenreEntry] {
        &self.entries
    }

    /// Entries of one tier in load order; the position list is computed on first use
    pub fn list_by_tier(&self, tier: Tier) -> Vec<&GenreEntry> {
        self.by_tier[tier.index()]
            .get_or_init(|| {
                self.entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.tier == tier)
                    .map(|(pos, _)| pos)
                    .collect()
            })
            .iter()
            .map(|&pos| &self.entries[pos])
            .collect()
    }

    /// Substring search over names and descriptions.
    ///
    /// Ordering: exact name match, then name prefix, then any other
    /// containment, each group in load order. Truncated to `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&GenreEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(u8, &GenreEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let name = entry.name.to_lowercase();
                let rank = if name == needle {
                    0
                } else if name.starts_with(&needle) {
                    1
                } else if name.contains(&needle) || entry.description.to_lowercase().contains(&needle) {
                    2
                } else {
                    return None;
                };
                Some((rank, entry))
            })
            .collect();

        // Stable sort keeps load order inside each rank
        hits.sort_by_key(|(rank, _)| *rank);
        hits.into_iter().take(limit).map(|(_, entry)| entry).collect()
    }

    /// Embedded sub-genres of a main-tier entry; empty for unknown or non-main names
    pub fn sub_genres_of(&self, main_name: &str) -> &[GenreRef] {
        match self.get_by_name(main_name) {
            Some(entry) if entry.tier == Tier::Main => {
                entry.sub_genres.as_deref().unwrap_or(&[])
            }
            _ => &[],
        }
    }

    /// Whole-taxonomy listing, one `name: description` line per entry with
    /// indented sub-genres under main entries
    pub fn digest(&self) -> &str {
        self.digest.get_or_init(|| {
            let mut lines = Vec::with_capacity(self.entries.len());
            for entry in &self.entries {
                lines.push(format_listing_line(&entry.name, &entry.description));
                if let Some(subs) = &entry.sub_genres {
                    for sub in subs {
                        lines.push(format!("  {}", format_listing_line(&sub.name, &sub.description)));
                    }
                }
            }
            lines.join("\n")
        })
    }
}

/// `- name: description`, the listing format shared by the digest and prompts
pub fn format_listing_line(name: &str, description: &str) -> String {
    if description.is_empty() {
        format!("- {}", name)
    } else {
        format!("- {}: {}", name, description)
    }
}

/// Lazily-loaded taxonomy shared by every request
pub struct TaxonomyStore {
    source: Arc<dyn TaxonomySource>,
    loaded: OnceCell<Arc<Taxonomy>>,
}

impl TaxonomyStore {
    pub fn new(source: Arc<dyn TaxonomySource>) -> Self {
        Self {
            source,
            loaded: OnceCell::new(),
        }
    }

    /// Load the taxonomy if needed; concurrent callers share one load
    pub async fn initialize(&self) -> Result<(), TaxonomyError> {
        self.taxonomy().await.map(|_| ())
    }

    /// Loaded taxonomy, initializing on first use
    pub async fn taxonomy(&self) -> Result<Arc<Taxonomy>, TaxonomyError> {
        self.loaded
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<GenreEntry>, TaxonomyError> {
        Ok(self.taxonomy().await?.get_by_name(name).cloned())
    }

    pub async fn list_all(&self) -> Result<Vec<GenreEntry>, TaxonomyError> {
        Ok(self.taxonomy().await?.list_all().to_vec())
    }

    pub async fn list_by_tier(&self, tier: Tier) -> Result<Vec<GenreEntry>, TaxonomyError> {
        Ok(self
            .taxonomy()
            .await?
            .list_by_tier(tier)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<GenreEntry>, TaxonomyError> {
        Ok(self
            .taxonomy()
            .await?
            .search(query, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn load(&self) -> Result<Arc<Taxonomy>, TaxonomyError> {
        let started = Instant::now();
        tracing::info!(source = %self.source.describe(), "Loading genre taxonomy");

        let result = async {
            let mains = self.source.load_main_records().await?;
            let detailed = self.source.load_detailed_records().await?;
            merge(mains, detailed)
        }
        .await;

        match result {
            Ok(taxonomy) => {
                tracing::info!(
                    entries = taxonomy.len(),
                    main = taxonomy.list_by_tier(Tier::Main).len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Genre taxonomy loaded"
                );
                Ok(Arc::new(taxonomy))
            }
            Err(e) => {
                tracing::error!(error = %e, "Genre taxonomy load failed; will retry on next use");
                Err(e)
            }
        }
    }
}
