//! Recorded catalog responses
//!
//! A JSON object mapping search query strings to the candidate lists a catalog
//! returned for them. Used to replay [`TrackMatcher::resolve`] offline.
//!
//! ```json
//! {
//!   "Bohemian Rhapsody Queen": [
//!     {"title": "Bohemian Rhapsody", "artist_name": "Queen", "preview_url": "https://..."}
//!   ]
//! }
//! ```
//!
//! [`TrackMatcher::resolve`]: songquiz_common::TrackMatcher::resolve

use songquiz_common::{MatchQuery, ResolvedMatch, Result, TrackCandidate, TrackMatcher};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedCatalog {
    responses: HashMap<String, Vec<TrackCandidate>>,
}

impl RecordedCatalog {
    pub fn new(responses: HashMap<String, Vec<TrackCandidate>>) -> Self {
        Self { responses }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let responses: HashMap<String, Vec<TrackCandidate>> = serde_json::from_str(&content)?;
        info!(path = %path.display(), queries = responses.len(), "Loaded recorded catalog");
        Ok(Self::new(responses))
    }

    /// Recorded results for a query; unrecorded queries return nothing
    pub fn search(&self, query: &str) -> Vec<TrackCandidate> {
        match self.responses.get(query) {
            Some(candidates) => candidates.clone(),
            None => {
                debug!(query = %query, "Query not recorded");
                Vec::new()
            }
        }
    }

    /// Run the matcher's query ladder against the recorded responses
    pub fn resolve(&self, matcher: &TrackMatcher, query: &MatchQuery) -> Option<ResolvedMatch> {
        matcher
            .resolve(query, |q| Ok::<_, std::convert::Infallible>(self.search(q)))
            .unwrap_or_else(|never| match never {})
    }
}
