//! Genre enrichment for dataset records
//!
//! Two sources fill in missing `Genres` fields:
//! 1. **Propagation**: an artist's genres from any other record of theirs
//! 2. **Artist tags**: folksonomy tag responses (name + 0-100 weight),
//!    filtered by [`TagFilter`]
//!
//! Fetching tags is outside this crate; callers supply the responses keyed by
//! artist.

use crate::dataset::SongRecord;
use serde::Deserialize;
use serde_json::Value;
use songquiz_common::artist::primary_artist;
use songquiz_common::config::TagConfig;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

// ============================================================================
// Propagation
// ============================================================================

/// First valid genres string per artist (keyed by lowercased, trimmed artist)
pub fn known_artist_genres(records: &[SongRecord]) -> HashMap<String, String> {
    let mut known = HashMap::new();
    for record in records {
        if let Some(genres) = record.valid_genres() {
            known
                .entry(artist_key(&record.artist))
                .or_insert_with(|| genres.to_string());
        }
    }
    debug!(artists = known.len(), "Compiled known artist genres");
    known
}

/// Fill records lacking genres from `known`; returns how many were filled
pub fn apply_known_genres(records: &mut [SongRecord], known: &HashMap<String, String>) -> usize {
    let mut applied = 0;
    for record in records.iter_mut().filter(|r| r.genres_field().is_none()) {
        if let Some(genres) = known.get(&artist_key(&record.artist)) {
            record.genres = Some(genres.clone());
            applied += 1;
        }
    }
    applied
}

/// Result of a propagation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationReport {
    pub applied: usize,
    pub still_missing: usize,
}

/// Compile known genres and apply them in one pass
pub fn propagate_genres(records: &mut [SongRecord]) -> PropagationReport {
    let known = known_artist_genres(records);
    let applied = apply_known_genres(records, &known);
    let still_missing = records.iter().filter(|r| r.genres_field().is_none()).count();

    info!(applied, still_missing, "Propagated existing genres");
    PropagationReport {
        applied,
        still_missing,
    }
}

/// Distinct primary artists of records still lacking genres, sorted
pub fn artists_missing_genres(records: &[SongRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.genres_field().is_none())
        .map(|r| primary_artist(&r.artist))
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn artist_key(artist: &str) -> String {
    artist.trim().to_lowercase()
}

// ============================================================================
// Tag Filtering
// ============================================================================

/// One tag from a folksonomy tag response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTag {
    pub name: String,
    /// 0-100 relevance; APIs send it as a number or a numeric string
    #[serde(alias = "count", default)]
    pub weight: Value,
}

impl RawTag {
    pub fn new(name: impl Into<String>, weight: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            weight: weight.into(),
        }
    }

    /// Integer weight, if it parses
    pub fn weight(&self) -> Option<u32> {
        match &self.weight {
            Value::Number(n) => n.as_u64().and_then(|w| u32::try_from(w).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Weight threshold plus ignore list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    min_weight: u32,
    ignored: HashSet<String>,
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::from_config(&TagConfig::default())
    }
}

impl TagFilter {
    pub fn new<I, S>(min_weight: u32, ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            min_weight,
            ignored: ignored
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &TagConfig) -> Self {
        Self::new(config.min_weight, &config.ignored)
    }

    /// Kept tag names, lowercased and trimmed, first occurrence order
    pub fn filter(&self, tags: &[RawTag]) -> Vec<String> {
        let mut seen = HashSet::new();
        tags.iter()
            .filter(|tag| tag.weight().map_or(false, |w| w >= self.min_weight))
            .map(|tag| tag.name.trim().to_lowercase())
            .filter(|name| !name.is_empty() && !self.ignored.contains(name))
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

/// Fill records lacking genres from per-artist tag responses
///
/// `artist_tags` keys are matched by primary artist; when several keys share
/// one, the first in key order wins. Returns how many records were filled.
pub fn apply_artist_tags(
    records: &mut [SongRecord],
    artist_tags: &BTreeMap<String, Vec<RawTag>>,
    filter: &TagFilter,
) -> usize {
    let mut genres_by_artist: HashMap<String, String> = HashMap::new();
    for (artist, tags) in artist_tags {
        let kept = filter.filter(tags);
        if kept.is_empty() {
            debug!(artist = %artist, "No tags survived filtering");
            continue;
        }

        // Keys sharing a primary artist keep the first in key order
        match genres_by_artist.entry(primary_artist(artist)) {
            Entry::Occupied(existing) => {
                debug!(
                    artist = %artist,
                    primary = %existing.key(),
                    kept = %existing.get(),
                    "Tag key collides with an earlier artist, keeping the earlier tags"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(kept.join(", "));
            }
        }
    }

    let mut applied = 0;
    for record in records.iter_mut().filter(|r| r.genres_field().is_none()) {
        if let Some(genres) = genres_by_artist.get(&primary_artist(&record.artist)) {
            record.genres = Some(genres.clone());
            applied += 1;
        }
    }

    info!(applied, artists = genres_by_artist.len(), "Applied artist tags");
    applied
}
