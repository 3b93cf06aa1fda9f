//! Primary artist extraction
//!
//! Chart data credits collaborations in one field ("Calvin Harris feat.
//! Rihanna", "Simon & Garfunkel"). Genre lookups and dedup key on the
//! lead artist only.

/// How an indicator is located in the artist string
#[derive(Debug, Clone, Copy)]
enum Indicator {
    /// Whole word: not preceded or followed by a letter or digit
    Word(&'static str),
    /// Literal substring, already space-delimited
    Spaced(&'static str),
}

/// Featured-artist indicators, tried in this order
const INDICATORS: &[Indicator] = &[
    Indicator::Word("featuring"),
    Indicator::Word("feat."),
    Indicator::Word("feat"),
    Indicator::Word("ft."),
    Indicator::Word("ft"),
    Indicator::Word("with"),
    Indicator::Spaced(" & "),
    Indicator::Spaced(" x "),
    Indicator::Spaced(" vs. "),
    Indicator::Spaced(" vs "),
    Indicator::Spaced(" presents "),
    Indicator::Spaced(" pres. "),
];

/// Lead artist of a possibly collaborative credit, lowercased
///
/// The first indicator in list order that occurs anywhere in the string wins;
/// everything before it is the primary artist. An indicator with nothing
/// before it is skipped.
///
/// # Example
/// ```
/// use songquiz_common::artist::primary_artist;
///
/// assert_eq!(primary_artist("Calvin Harris feat. Rihanna"), "calvin harris");
/// assert_eq!(primary_artist("Simon & Garfunkel"), "simon");
/// assert_eq!(primary_artist("Taylor Swift"), "taylor swift");
/// ```
pub fn primary_artist(raw: &str) -> String {
    let artist = raw.trim().to_lowercase();

    for indicator in INDICATORS {
        let position = match *indicator {
            Indicator::Word(word) => find_word(&artist, word),
            Indicator::Spaced(literal) => artist.find(literal),
        };

        if let Some(pos) = position {
            let lead = artist[..pos].trim();
            if !lead.is_empty() {
                return lead.to_string();
            }
        }
    }

    artist
}

/// Byte offset of the first whole-word occurrence of `word`
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(pos, _)| pos).find(|&pos| {
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        // A trailing '.' in the indicator is its own boundary
        let after_ok = word.ends_with('.')
            || haystack[pos + word.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
