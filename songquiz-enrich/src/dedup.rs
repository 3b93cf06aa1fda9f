//! Fuzzy duplicate removal
//!
//! Chart scrapes list the same song under slightly different titles
//! ("Umbrella" / "Umbrella (feat. Jay-Z)") and collaboration credits. A record
//! is a duplicate of an earlier kept record when both its title and its
//! primary artist satisfy the Jaccard policy against that record.
//!
//! The first record of each duplicate group is kept; input order decides.
//! Comparison is pairwise against every kept record (quadratic), which is fine
//! for chart-sized datasets.

use crate::dataset::SongRecord;
use songquiz_common::artist::primary_artist;
use songquiz_common::text::tokens;
use songquiz_common::SimilarityPolicy;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A removed record and the kept record it duplicated
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateEntry {
    pub removed: SongRecord,
    /// Index into [`DedupOutcome::kept`]
    pub kept_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    pub kept: Vec<SongRecord>,
    pub duplicates: Vec<DuplicateEntry>,
}

/// Jaccard-based duplicate detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deduplicator {
    policy: SimilarityPolicy,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(SimilarityPolicy::jaccard())
    }
}

impl Deduplicator {
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SimilarityPolicy {
        self.policy
    }

    /// Whether two records name the same song
    pub fn is_duplicate(&self, a: &SongRecord, b: &SongRecord) -> bool {
        self.same_song(&DedupKey::of(a), &DedupKey::of(b))
    }

    /// Keep the first record of every duplicate group
    pub fn dedup(&self, records: Vec<SongRecord>) -> DedupOutcome {
        let total = records.len();
        let mut outcome = DedupOutcome::default();
        let mut kept_keys: Vec<DedupKey> = Vec::new();

        for record in records {
            let key = DedupKey::of(&record);

            match kept_keys.iter().position(|kept| self.same_song(kept, &key)) {
                Some(kept_index) => {
                    debug!(
                        song = %record.song,
                        artist = %record.artist,
                        kept_song = %outcome.kept[kept_index].song,
                        "Dropping duplicate"
                    );
                    outcome.duplicates.push(DuplicateEntry {
                        removed: record,
                        kept_index,
                    });
                }
                None => {
                    kept_keys.push(key);
                    outcome.kept.push(record);
                }
            }
        }

        info!(
            input = total,
            kept = outcome.kept.len(),
            removed = outcome.duplicates.len(),
            "Deduplication complete"
        );
        outcome
    }

    fn same_song(&self, a: &DedupKey, b: &DedupKey) -> bool {
        self.policy.compare_tokens(&a.title, &b.title) && self.policy.compare_tokens(&a.artist, &b.artist)
    }
}

/// Token sets compared for one record
struct DedupKey {
    title: BTreeSet<String>,
    artist: BTreeSet<String>,
}

impl DedupKey {
    fn of(record: &SongRecord) -> Self {
        Self {
            title: tokens(&record.song),
            artist: tokens(&primary_artist(&record.artist)),
        }
    }
}
