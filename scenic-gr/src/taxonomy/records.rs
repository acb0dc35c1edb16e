//! Source record shapes and the merge that folds them into one index
//!
//! Three input shapes feed the taxonomy: main records (with an embedded
//! sub-genre list), sub records implied by those lists, and detailed
//! records that may upgrade an existing entry. They are unioned into
//! `TaxonomyRecord` and applied in order by `TaxonomyBuilder`.

use serde::Deserialize;
use std::collections::HashMap;

use super::{Taxonomy, TaxonomyError};
use crate::types::{normalize_name, GenreEntry, GenreRef, GenreSummary, Tier};

/// Minimal genre record as stored in the data files
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawGenre {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl RawGenre {
    pub fn new(name: &str, description: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            url: url.to_string(),
        }
    }

    fn to_ref(&self) -> GenreRef {
        GenreRef {
            name: self.name.clone(),
            description: self.description.clone(),
            reference_url: self.url.clone(),
        }
    }
}

/// One `main/*.json` file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub sub_genres: Vec<RawGenre>,
}

impl MainRecord {
    /// The main record followed by one sub record per embedded sub-genre
    pub fn into_records(self) -> Vec<TaxonomyRecord> {
        let subs: Vec<TaxonomyRecord> = self
            .sub_genres
            .iter()
            .map(|genre| {
                TaxonomyRecord::Sub(SubRecord {
                    genre: genre.clone(),
                    parent: self.name.clone(),
                })
            })
            .collect();

        let mut records = Vec::with_capacity(subs.len() + 1);
        records.push(TaxonomyRecord::Main(self));
        records.extend(subs);
        records
    }
}

/// A sub-genre implied by its parent's embedded list
#[derive(Debug, Clone, PartialEq)]
pub struct SubRecord {
    pub genre: RawGenre,
    pub parent: String,
}

/// Child summary inside a detailed record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawChild {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub level: String,
}

/// One `detailed/*.json` file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailedRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    pub level: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<RawChild>>,
}

/// Tagged union of every input shape
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonomyRecord {
    Main(MainRecord),
    Sub(SubRecord),
    Detailed(DetailedRecord),
}

impl TaxonomyRecord {
    fn name(&self) -> &str {
        match self {
            TaxonomyRecord::Main(r) => &r.name,
            TaxonomyRecord::Sub(r) => &r.genre.name,
            TaxonomyRecord::Detailed(r) => &r.name,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TaxonomyRecord::Main(_) => "main",
            TaxonomyRecord::Sub(_) => "sub",
            TaxonomyRecord::Detailed(_) => "detailed",
        }
    }
}

/// Accumulates records into a name-unique entry list
#[derive(Debug, Default)]
pub struct TaxonomyBuilder {
    entries: Vec<GenreEntry>,
    index: HashMap<String, usize>,
}

impl TaxonomyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record.
    ///
    /// - Main: inserted, or replaces a same-named entry in place.
    /// - Sub: inserted only if the name is unused (first writer wins).
    /// - Detailed: upgrades tier/parent/children of a same-named entry in
    ///   place, otherwise inserted as a new entry.
    pub fn apply(&mut self, record: TaxonomyRecord) -> Result<(), TaxonomyError> {
        let key = normalize_name(record.name());
        if key.is_empty() {
            return Err(TaxonomyError::Malformed {
                origin: format!("{} record", record.kind()),
                reason: "genre name is blank".to_string(),
            });
        }

        match record {
            TaxonomyRecord::Main(main) => {
                let entry = GenreEntry {
                    name: main.name.trim().to_string(),
                    description: main.description,
                    reference_url: main.url,
                    tier: Tier::Main,
                    parent: None,
                    children: None,
                    sub_genres: Some(main.sub_genres.iter().map(RawGenre::to_ref).collect()),
                };
                match self.index.get(&key).copied() {
                    Some(pos) => {
                        tracing::warn!(
                            genre = %entry.name,
                            previous_tier = %self.entries[pos].tier,
                            "Main genre replaces an existing entry"
                        );
                        self.entries[pos] = entry;
                    }
                    None => self.push(key, entry),
                }
            }
            TaxonomyRecord::Sub(sub) => {
                if self.index.contains_key(&key) {
                    tracing::trace!(genre = %sub.genre.name, "Sub genre already registered, skipping");
                    return Ok(());
                }
                let entry = GenreEntry {
                    name: sub.genre.name.trim().to_string(),
                    description: sub.genre.description,
                    reference_url: sub.genre.url,
                    tier: Tier::Sub,
                    parent: Some(sub.parent),
                    children: None,
                    sub_genres: None,
                };
                self.push(key, entry);
            }
            TaxonomyRecord::Detailed(detailed) => {
                let origin = format!("detailed record '{}'", detailed.name);
                let tier = parse_level(&detailed.level, &origin)?;
                let children = detailed
                    .children
                    .map(|children| {
                        children
                            .into_iter()
                            .map(|child| {
                                Ok(GenreSummary {
                                    tier: parse_level(&child.level, &origin)?,
                                    name: child.name,
                                    description: child.description,
                                })
                            })
                            .collect::<Result<Vec<_>, TaxonomyError>>()
                    })
                    .transpose()?;

                match self.index.get(&key).copied() {
                    Some(pos) => {
                        let existing = &mut self.entries[pos];
                        existing.tier = tier;
                        existing.parent = detailed.parent;
                        existing.children = children;
                    }
                    None => {
                        let entry = GenreEntry {
                            name: detailed.name.trim().to_string(),
                            description: detailed.description,
                            reference_url: detailed.url,
                            tier,
                            parent: detailed.parent,
                            children,
                            sub_genres: None,
                        };
                        self.push(key, entry);
                    }
                }
            }
        }

        Ok(())
    }

    fn push(&mut self, key: String, entry: GenreEntry) {
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
    }

    pub fn build(self) -> Taxonomy {
        Taxonomy::from_parts(self.entries, self.index)
    }
}

fn parse_level(level: &str, origin: &str) -> Result<Tier, TaxonomyError> {
    level.parse::<Tier>().map_err(|reason| TaxonomyError::Malformed {
        origin: origin.to_string(),
        reason,
    })
}

/// Merge main records (with their implied subs) first, then detailed records
pub fn merge(
    mains: Vec<MainRecord>,
    detailed: Vec<DetailedRecord>,
) -> Result<Taxonomy, TaxonomyError> {
    let mut builder = TaxonomyBuilder::new();
    for record in mains.into_iter().flat_map(MainRecord::into_records) {
        builder.apply(record)?;
    }
    for record in detailed {
        builder.apply(TaxonomyRecord::Detailed(record))?;
    }
    Ok(builder.build())
}
