//! Token-set similarity policies
//!
//! Two independently tuned policies coexist and are selected by the caller:
//!
//! - [`SimilarityPolicy::Overlap`]: match acceptance against catalog results.
//!   Tolerant of short titles, stricter on longer ones.
//! - [`SimilarityPolicy::Jaccard`]: dataset deduplication, where a false
//!   positive silently deletes a song.
//!
//! Both operate on [`crate::text::tokens`] (normalized, lowercased token sets).
//! Neither fails: degenerate input (empty token sets) is simply not similar.

use crate::text::tokens;
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Default shared-token requirement for the overlap policy
pub const DEFAULT_OVERLAP_MIN_SHARED: usize = 2;

/// Default intersection-over-union threshold for the Jaccard policy
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.85;

/// Named similarity rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityPolicy {
    /// `|A ∩ B| >= min(min_shared, |A|)`, where `A` is the query side
    Overlap { min_shared: usize },

    /// `|A ∩ B| / |A ∪ B| >= threshold`
    Jaccard { threshold: f64 },
}

impl SimilarityPolicy {
    /// Overlap policy with the default requirement of 2 shared tokens
    pub const fn overlap() -> Self {
        Self::Overlap {
            min_shared: DEFAULT_OVERLAP_MIN_SHARED,
        }
    }

    /// Jaccard policy with the default 0.85 threshold
    pub const fn jaccard() -> Self {
        Self::Jaccard {
            threshold: DEFAULT_JACCARD_THRESHOLD,
        }
    }

    /// Check the policy parameters
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if `min_shared` is 0 or `threshold` is
    /// outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Overlap { min_shared } if min_shared == 0 => Err(Error::InvalidInput(
                "overlap min_shared must be at least 1".to_string(),
            )),
            Self::Jaccard { threshold } if !(0.0..=1.0).contains(&threshold) => {
                Err(Error::InvalidInput(format!(
                    "jaccard threshold must be within [0, 1], got {}",
                    threshold
                )))
            }
            _ => Ok(()),
        }
    }

    /// Compare two raw strings under this policy
    ///
    /// `a` is the query side. The overlap policy is asymmetric in it.
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        self.compare_tokens(&tokens(a), &tokens(b))
    }

    /// Compare two already-tokenized strings under this policy
    pub fn compare_tokens(&self, a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
        match *self {
            Self::Overlap { min_shared } => overlap_match(a, b, min_shared),
            Self::Jaccard { threshold } => {
                jaccard_ratio(a, b).map_or(false, |ratio| ratio >= threshold)
            }
        }
    }
}

/// Pairwise similarity between two raw strings
///
/// Free-function form of [`SimilarityPolicy::is_similar`].
///
/// # Example
/// ```
/// use songquiz_common::similarity::{is_similar, SimilarityPolicy};
///
/// assert!(is_similar("Shape of You", "shape you", SimilarityPolicy::overlap()));
/// assert!(!is_similar("Yes", "No", SimilarityPolicy::overlap()));
/// ```
pub fn is_similar(a: &str, b: &str, policy: SimilarityPolicy) -> bool {
    policy.is_similar(a, b)
}

/// Number of tokens present in both sets
pub fn shared_tokens(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}

/// Intersection over union, or `None` when both sets are empty
pub fn jaccard_ratio(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    let shared = shared_tokens(a, b);
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return None;
    }
    Some(shared as f64 / union as f64)
}

fn overlap_match(a: &BTreeSet<String>, b: &BTreeSet<String>, min_shared: usize) -> bool {
    // An empty query shares nothing; min(_, 0) == 0 would otherwise accept anything
    if a.is_empty() {
        return false;
    }
    shared_tokens(a, b) >= min_shared.min(a.len())
}
