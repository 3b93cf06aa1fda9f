//! Dataset statistics
//!
//! Summary used to judge enrichment coverage before building quiz pools.

use crate::dataset::SongRecord;
use serde::Serialize;
use songquiz_common::genre::GenreTally;
use songquiz_common::GenreMapper;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Default number of tags listed in `top_tags`
pub const DEFAULT_TOP_TAGS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub songs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub songs: usize,
    pub with_genres: usize,
    pub without_genres: usize,
    /// Distinct lowercased raw tags
    pub unique_tags: usize,
    /// Over songs that have genres; `None` when none do
    pub average_tags_per_song: Option<f64>,
    /// Most frequent raw tags, ties broken alphabetically
    pub top_tags: Vec<TagCount>,
    /// Decade -> songs; songs without a year are not counted
    pub by_decade: BTreeMap<i64, usize>,
    pub parent_genres: GenreTally,
}

impl DatasetStats {
    pub fn compute(records: &[SongRecord], mapper: &GenreMapper, top_n: usize) -> Self {
        let mut tag_counts: HashMap<String, usize> = HashMap::new();
        let mut by_decade = BTreeMap::new();
        let mut parent_genres = GenreTally::new();
        let mut with_genres = 0;
        let mut total_tags = 0;

        for record in records {
            parent_genres.record(mapper, record.genres_field());

            if let Some(decade) = record.decade() {
                *by_decade.entry(decade).or_insert(0) += 1;
            }

            let tags = record.genre_tags();
            if tags.is_empty() {
                continue;
            }
            with_genres += 1;
            total_tags += tags.len();
            for tag in tags {
                *tag_counts.entry(tag.to_lowercase()).or_insert(0) += 1;
            }
        }

        let unique_tags = tag_counts.len();
        let mut top_tags: Vec<TagCount> = tag_counts
            .into_iter()
            .map(|(tag, songs)| TagCount { tag, songs })
            .collect();
        top_tags.sort_by(|a, b| b.songs.cmp(&a.songs).then_with(|| a.tag.cmp(&b.tag)));
        top_tags.truncate(top_n);

        let average_tags_per_song = if with_genres > 0 {
            Some(total_tags as f64 / with_genres as f64)
        } else {
            None
        };

        Self {
            songs: records.len(),
            with_genres,
            without_genres: records.len() - with_genres,
            unique_tags,
            average_tags_per_song,
            top_tags,
            by_decade,
            parent_genres,
        }
    }
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Songs: {}", self.songs)?;
        writeln!(f, "Songs with genres: {}", self.with_genres)?;
        writeln!(f, "Songs without genres: {}", self.without_genres)?;
        writeln!(f, "Unique tags: {}", self.unique_tags)?;
        match self.average_tags_per_song {
            Some(avg) => writeln!(f, "Average tags per song: {:.2}", avg)?,
            None => writeln!(f, "Average tags per song: n/a")?,
        }

        writeln!(f, "\nTop tags:")?;
        for tc in &self.top_tags {
            writeln!(f, "  {:<24} {}", tc.tag, tc.songs)?;
        }

        writeln!(f, "\nSongs per decade:")?;
        for (decade, count) in &self.by_decade {
            writeln!(f, "  {}s {}", decade, count)?;
        }

        writeln!(f, "\nParent genres:")?;
        for (parent, count) in &self.parent_genres.by_parent {
            writeln!(f, "  {:<24} {}", parent.label(), count)?;
        }
        write!(f, "  {:<24} {}", "(none)", self.parent_genres.no_genre)
    }
}
