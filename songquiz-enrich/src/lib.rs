//! # Songquiz Dataset Enrichment
//!
//! Offline passes over a chart dataset before it feeds the quiz:
//! - Dataset model and JSON persistence
//! - Fuzzy deduplication
//! - Genre propagation and artist-tag application
//! - Coverage statistics
//! - Quiz pool filtering and random picks
//! - Replay of catalog matching against recorded responses

pub mod catalog;
pub mod dataset;
pub mod dedup;
pub mod genres;
pub mod pool;
pub mod stats;

pub use catalog::RecordedCatalog;
pub use dataset::{load_dataset, save_dataset, SongRecord};
pub use dedup::{DedupOutcome, Deduplicator};
pub use genres::{RawTag, TagFilter};
pub use pool::PoolFilter;
pub use stats::DatasetStats;
