//! Quiz song pools
//!
//! Narrows a dataset to the songs eligible for a round (parent genre, decade,
//! chart rank) and picks from it uniformly at random.

use crate::dataset::SongRecord;
use rand::seq::SliceRandom;
use rand::Rng;
use songquiz_common::{GenreMapper, ParentGenre};

/// Rank cut-off used by the quiz: only top-50 chart entries are asked
pub const DEFAULT_MAX_RANK: i64 = 50;

/// Eligibility criteria; `None` fields do not filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolFilter {
    pub genre: Option<ParentGenre>,
    /// Decade start year (1980 for the 80s)
    pub decade: Option<i64>,
    /// Records without a rank fail this filter when it is set
    pub max_rank: Option<i64>,
}

impl PoolFilter {
    pub fn matches(&self, record: &SongRecord, mapper: &GenreMapper) -> bool {
        if let Some(max_rank) = self.max_rank {
            if !record.rank.map_or(false, |rank| rank <= max_rank) {
                return false;
            }
        }

        if let Some(decade) = self.decade {
            if record.decade() != Some(decade) {
                return false;
            }
        }

        if let Some(genre) = self.genre {
            let parents = record
                .genres_field()
                .map(|g| mapper.parents_of(g))
                .unwrap_or_default();
            if !parents.contains(&genre) {
                return false;
            }
        }

        true
    }
}

/// Records passing the filter, in dataset order
pub fn filter_pool<'a>(
    records: &'a [SongRecord],
    filter: &PoolFilter,
    mapper: &GenreMapper,
) -> Vec<&'a SongRecord> {
    records.iter().filter(|r| filter.matches(r, mapper)).collect()
}

/// Up to `count` distinct songs from the pool, uniformly at random
pub fn pick<'a, R>(pool: &[&'a SongRecord], count: usize, rng: &mut R) -> Vec<&'a SongRecord>
where
    R: Rng + ?Sized,
{
    pool.choose_multiple(rng, count).copied().collect()
}
