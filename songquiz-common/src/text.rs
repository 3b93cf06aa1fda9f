//! Text normalization for song titles and artist names
//!
//! Every comparison in songquiz (catalog matching, dedup, answer checking)
//! runs its inputs through [`normalize`] first. The pipeline is fixed:
//!
//! 1. Contraction expansion, then apostrophe deletion
//! 2. Parenthetical / bracketed span removal
//! 3. Credit marker removal (`feat`, `feat.`, `ft`, `ft.`, `featuring`)
//! 4. Punctuation folding to spaces
//! 5. Whitespace collapse and trim
//!
//! Later steps assume earlier ones ran. Casing is preserved; callers lowercase
//! when they compare (see [`tokens`]).
//!
//! The function is total and idempotent: `normalize(&normalize(s)) == normalize(s)`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Informal contractions found in chart data, replaced literally (case-sensitive)
const CONTRACTIONS: &[(&str, &str)] = &[
    ("don't", "dont"),
    ("couldn't", "couldnt"),
    ("won't", "wont"),
    ("can't", "cant"),
    ("ain't", "aint"),
    ("'bout", "bout"),
    ("'n'", "and"),
];

/// Credit markers removed when they stand as whole tokens.
/// `featuring` precedes `feat` so the longer marker is tried first.
const CREDIT_MARKERS: &[&str] = &["featuring", "feat", "ft"];

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern compiles"));

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("bracket pattern compiles"));

/// Normalize a raw song title or artist name
///
/// # Example
/// ```
/// use songquiz_common::text::normalize;
///
/// assert_eq!(normalize("I don't Wanna (Live Forever) [feat. X]"), "I dont Wanna");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    let text = expand_contractions(raw);
    let text = strip_enclosed(&text);
    let text = strip_credit_markers(&text);
    let text = fold_punctuation(&text);
    collapse_whitespace(&text)
}

/// Normalize, lowercase, and split into a token set
///
/// This is the comparison form used by both similarity policies.
pub fn tokens(raw: &str) -> BTreeSet<String> {
    normalize(raw)
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Step 1: contraction table, then delete every remaining apostrophe
fn expand_contractions(raw: &str) -> String {
    // Typographic apostrophes are common in catalog data
    let mut text = raw.replace(['\u{2018}', '\u{2019}'], "'");
    for (from, to) in CONTRACTIONS {
        text = text.replace(from, to);
    }
    text.replace('\'', "")
}

/// Step 2: non-greedy, non-nesting removal of `(...)` then `[...]`
fn strip_enclosed(text: &str) -> String {
    let text = PARENTHETICAL.replace_all(text, "");
    BRACKETED.replace_all(&text, "").into_owned()
}

/// Step 3: drop credit markers that are whole tokens
///
/// A marker is a whole token when the characters on both sides are
/// non-alphanumeric (or the string ends). A dot directly after the marker is
/// consumed with it. Word boundaries use `char::is_alphanumeric`, the same test
/// step 4 uses, so removal can never expose a new marker on a second pass.
fn strip_credit_markers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let starts_word = i == 0 || !chars[i - 1].is_alphanumeric();
        if starts_word {
            if let Some(len) = credit_marker_len(&chars[i..]) {
                i += len;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn credit_marker_len(rest: &[char]) -> Option<usize> {
    CREDIT_MARKERS.iter().find_map(|marker| {
        let n = marker.len();
        if rest.len() < n {
            return None;
        }
        let same = rest[..n]
            .iter()
            .zip(marker.chars())
            .all(|(c, m)| c.eq_ignore_ascii_case(&m));
        let ends_word = rest.get(n).map_or(true, |c| !c.is_alphanumeric());

        match (same && ends_word, rest.get(n)) {
            (true, Some('.')) => Some(n + 1),
            (true, _) => Some(n),
            (false, _) => None,
        }
    })
}

/// Step 4: anything that is not alphanumeric or whitespace becomes a space
fn fold_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Step 5
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
