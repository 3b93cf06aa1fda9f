//! Catalog match selection
//!
//! Resolves a dataset `(song, artist)` pair to a playable catalog track.
//!
//! **Acceptance:** a candidate is accepted when its title overlaps the query
//! title, its artist overlaps the query artist, and it exposes a non-blank
//! preview URL.
//!
//! **Selection:** candidates are scanned in the order the catalog returned
//! them and the FIRST accepted candidate wins. No scoring across candidates is
//! performed, so a later, closer candidate can lose to an earlier acceptable
//! one. This keeps lookups cheap and trusts the catalog's relevance ranking.
//!
//! **Retry ladder:** because acceptance is strict, [`TrackMatcher::resolve`]
//! walks progressively looser search queries ([`QueryStrategy::ALL`]) until one
//! query's results contain an accepted candidate.

use crate::similarity::SimilarityPolicy;
use crate::text::{normalize, tokens};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace};

/// Title words kept by [`QueryStrategy::LeadingWordsAndArtist`]
const LEADING_TITLE_WORDS: usize = 3;

/// One catalog search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCandidate {
    pub title: String,
    pub artist_name: String,
    /// Playable preview; absent or blank previews are never accepted
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl TrackCandidate {
    pub fn new(title: impl Into<String>, artist_name: impl Into<String>, preview_url: Option<&str>) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
            preview_url: preview_url.map(str::to_string),
        }
    }

    /// Preview URL, if present and non-blank
    pub fn preview(&self) -> Option<&str> {
        self.preview_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// The dataset entry being resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    pub song_title: String,
    pub artist_name: String,
}

impl MatchQuery {
    pub fn new(song_title: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            song_title: song_title.into(),
            artist_name: artist_name.into(),
        }
    }
}

/// Search query builders, loosest last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    /// `track:"<title>" artist:"<artist>"`
    ExactFields,
    /// `<title> <artist>`
    Combined,
    /// `<title>`
    TitleOnly,
    /// First three title words followed by the artist
    LeadingWordsAndArtist,
    /// `<title> <first artist word>`
    TitleAndArtistFirstWord,
    /// `<artist>`
    ArtistOnly,
}

impl QueryStrategy {
    /// Ladder order
    pub const ALL: [QueryStrategy; 6] = [
        QueryStrategy::ExactFields,
        QueryStrategy::Combined,
        QueryStrategy::TitleOnly,
        QueryStrategy::LeadingWordsAndArtist,
        QueryStrategy::TitleAndArtistFirstWord,
        QueryStrategy::ArtistOnly,
    ];

    /// Build this strategy's query from already-normalized title and artist
    ///
    /// Returns `None` when the strategy has nothing to search with (e.g. an
    /// artist-only query for an empty artist).
    pub fn build(self, title: &str, artist: &str) -> Option<String> {
        let query = match self {
            Self::ExactFields => {
                if title.is_empty() || artist.is_empty() {
                    return None;
                }
                format!("track:\"{}\" artist:\"{}\"", title, artist)
            }
            Self::Combined => format!("{} {}", title, artist),
            Self::TitleOnly => title.to_string(),
            Self::LeadingWordsAndArtist => {
                let leading: Vec<&str> = title.split_whitespace().take(LEADING_TITLE_WORDS).collect();
                format!("{} {}", leading.join(" "), artist)
            }
            Self::TitleAndArtistFirstWord => {
                let first = artist.split_whitespace().next()?;
                format!("{} {}", title, first)
            }
            Self::ArtistOnly => artist.to_string(),
        };

        let query = query.trim().to_string();
        if query.is_empty() {
            None
        } else {
            Some(query)
        }
    }
}

/// The ordered, de-duplicated search queries for a match query
///
/// Title and artist are normalized first. A strategy whose query repeats an
/// earlier one verbatim is dropped, since it would return the same results.
pub fn query_ladder(query: &MatchQuery) -> Vec<(QueryStrategy, String)> {
    let title = normalize(&query.song_title);
    let artist = normalize(&query.artist_name);

    let mut seen = HashSet::new();
    QueryStrategy::ALL
        .iter()
        .filter_map(|strategy| strategy.build(&title, &artist).map(|q| (*strategy, q)))
        .filter(|(_, q)| seen.insert(q.clone()))
        .collect()
}

/// An accepted candidate plus the ladder step that found it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMatch {
    pub strategy: QueryStrategy,
    pub search_query: String,
    pub candidate: TrackCandidate,
}

/// Candidate acceptance and selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMatcher {
    title_policy: SimilarityPolicy,
    artist_policy: SimilarityPolicy,
}

impl Default for TrackMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackMatcher {
    /// Title needs `min(2, |title tokens|)` shared tokens; artist needs one
    pub fn new() -> Self {
        Self {
            title_policy: SimilarityPolicy::overlap(),
            artist_policy: SimilarityPolicy::Overlap { min_shared: 1 },
        }
    }

    pub fn with_policies(title_policy: SimilarityPolicy, artist_policy: SimilarityPolicy) -> Self {
        Self {
            title_policy,
            artist_policy,
        }
    }

    pub fn title_policy(&self) -> SimilarityPolicy {
        self.title_policy
    }

    pub fn artist_policy(&self) -> SimilarityPolicy {
        self.artist_policy
    }

    /// Whether a single candidate is acceptable for the query
    pub fn accepts(&self, query: &MatchQuery, candidate: &TrackCandidate) -> bool {
        let prepared = PreparedQuery::new(query);
        self.accepts_prepared(&prepared, candidate)
    }

    /// First acceptable candidate in supplied order, if any
    ///
    /// Absence is the ordinary "try a looser query" outcome, not an error.
    pub fn select_best_match<'a>(
        &self,
        query: &MatchQuery,
        candidates: &'a [TrackCandidate],
    ) -> Option<&'a TrackCandidate> {
        let prepared = PreparedQuery::new(query);
        candidates
            .iter()
            .find(|candidate| self.accepts_prepared(&prepared, candidate))
    }

    /// Walk the query ladder until a search yields an accepted candidate
    ///
    /// # Arguments
    /// * `query` - Dataset entry to resolve
    /// * `search` - Catalog search collaborator; returns candidates in its own
    ///   relevance order
    ///
    /// # Returns
    /// * `Ok(Some(_))` - first accepted candidate of the first productive query
    /// * `Ok(None)` - every strategy exhausted without a match
    /// * `Err(_)` - the search collaborator failed; the ladder stops there
    pub fn resolve<F, E>(&self, query: &MatchQuery, mut search: F) -> Result<Option<ResolvedMatch>, E>
    where
        F: FnMut(&str) -> Result<Vec<TrackCandidate>, E>,
    {
        for (strategy, search_query) in query_ladder(query) {
            let candidates = search(&search_query)?;

            debug!(
                strategy = ?strategy,
                query = %search_query,
                candidates = candidates.len(),
                "Catalog search returned"
            );

            if let Some(candidate) = self.select_best_match(query, &candidates) {
                debug!(
                    strategy = ?strategy,
                    title = %candidate.title,
                    artist = %candidate.artist_name,
                    "Accepted catalog candidate"
                );
                return Ok(Some(ResolvedMatch {
                    strategy,
                    search_query,
                    candidate: candidate.clone(),
                }));
            }
        }

        debug!(
            song = %query.song_title,
            artist = %query.artist_name,
            "No catalog candidate accepted by any strategy"
        );
        Ok(None)
    }

    fn accepts_prepared(&self, query: &PreparedQuery, candidate: &TrackCandidate) -> bool {
        let title_match = self
            .title_policy
            .compare_tokens(&query.title, &tokens(&candidate.title));
        let artist_match = self
            .artist_policy
            .compare_tokens(&query.artist, &tokens(&candidate.artist_name));
        let has_preview = candidate.preview().is_some();

        trace!(
            title = %candidate.title,
            artist = %candidate.artist_name,
            title_match,
            artist_match,
            has_preview,
            "Evaluated candidate"
        );

        title_match && artist_match && has_preview
    }
}

/// Query token sets, computed once per selection
struct PreparedQuery {
    title: BTreeSet<String>,
    artist: BTreeSet<String>,
}

impl PreparedQuery {
    fn new(query: &MatchQuery) -> Self {
        Self {
            title: tokens(&query.song_title),
            artist: tokens(&query.artist_name),
        }
    }
}
