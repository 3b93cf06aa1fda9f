//! # Songquiz Common Library
//!
//! Matching core shared by the songquiz tools:
//! - Text normalization for titles and artist names
//! - Token-set similarity policies (overlap, Jaccard)
//! - Catalog match selection and the query retry ladder
//! - Subgenre to parent-genre mapping
//! - Answer checking and primary-artist extraction
//! - Configuration loading

pub mod answer;
pub mod artist;
pub mod config;
pub mod error;
pub mod genre;
pub mod matcher;
pub mod similarity;
pub mod text;

pub use config::SongquizConfig;
pub use error::{Error, Result};
pub use genre::{GenreMapper, GenreTaxonomy, MappedGenre, ParentGenre};
pub use matcher::{MatchQuery, ResolvedMatch, TrackCandidate, TrackMatcher};
pub use similarity::{is_similar, SimilarityPolicy};
pub use text::{normalize, tokens};
