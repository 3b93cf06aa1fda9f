//! Song dataset model and JSON persistence
//!
//! A dataset is a JSON array of chart entries keyed by the column names the
//! chart scrapers produce (`Song`, `Artist`, `Year`, `Genres`, `Popularity`,
//! `Rank`). Columns this crate does not interpret are carried through
//! unchanged.
//!
//! **Numeric columns:** spreadsheet round-trips leave years and ranks as
//! strings or floats (`"1965"`, `1965`, `"1965.0"`). All three parse; anything
//! else (including a fractional part) reads as absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use songquiz_common::genre::split_tags;
use songquiz_common::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Genres value treated as missing when compiling per-artist genres
pub const UNKNOWN_GENRES: &str = "unknown";

/// One chart entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    #[serde(rename = "Song")]
    pub song: String,

    #[serde(rename = "Artist")]
    pub artist: String,

    #[serde(
        rename = "Year",
        default,
        deserialize_with = "deserialize_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i64>,

    /// Comma-separated genre tags
    #[serde(rename = "Genres", default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,

    #[serde(
        rename = "Popularity",
        default,
        deserialize_with = "deserialize_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub popularity: Option<i64>,

    /// Chart position (1 = top)
    #[serde(
        rename = "Rank",
        default,
        deserialize_with = "deserialize_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rank: Option<i64>,

    /// Columns not interpreted here
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SongRecord {
    pub fn new(song: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            song: song.into(),
            artist: artist.into(),
            year: None,
            genres: None,
            popularity: None,
            rank: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = Some(genres.into());
        self
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Genres field if present and non-blank
    pub fn genres_field(&self) -> Option<&str> {
        self.genres
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Genres usable as an artist's known genres (non-blank, not "unknown")
    pub fn valid_genres(&self) -> Option<&str> {
        self.genres_field()
            .filter(|g| !g.eq_ignore_ascii_case(UNKNOWN_GENRES))
    }

    /// Individual tags of the genres field
    pub fn genre_tags(&self) -> Vec<&str> {
        self.genres_field().map(|g| split_tags(g).collect()).unwrap_or_default()
    }

    /// Decade of release (1965 -> 1960)
    pub fn decade(&self) -> Option<i64> {
        self.year.map(|y| y.div_euclid(10) * 10)
    }
}

/// Parse a whole number from a JSON number or numeric string
///
/// Accepts `1965`, `1965.0`, `"1965"` and `"1965.0"`. Returns `None` for
/// null, blank strings, fractional values and anything non-numeric.
pub fn parse_whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_f64))
        }
        _ => None,
    }
}

fn whole_f64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn deserialize_whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_whole_number))
}

/// Load a dataset from a JSON array file
pub fn load_dataset(path: &Path) -> Result<Vec<SongRecord>> {
    let content = fs::read_to_string(path)?;
    let records: Vec<SongRecord> = serde_json::from_str(&content)?;
    info!(path = %path.display(), songs = records.len(), "Loaded dataset");
    Ok(records)
}

/// Write a dataset as a pretty-printed JSON array
pub fn save_dataset(path: &Path, records: &[SongRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    info!(path = %path.display(), songs = records.len(), "Saved dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_formats() {
        assert_eq!(parse_whole_number(&json!("1965")), Some(1965));
        assert_eq!(parse_whole_number(&json!(1965)), Some(1965));
        assert_eq!(parse_whole_number(&json!("1965.0")), Some(1965));
        assert_eq!(parse_whole_number(&json!(1965.0)), Some(1965));
        assert_eq!(parse_whole_number(&json!(" 1965 ")), Some(1965));
        assert_eq!(parse_whole_number(&json!("1965.5")), None);
        assert_eq!(parse_whole_number(&json!("")), None);
        assert_eq!(parse_whole_number(&json!("sixties")), None);
        assert_eq!(parse_whole_number(&Value::Null), None);
    }

    #[test]
    fn test_deserialize_record_with_extra_columns() {
        let record: SongRecord = serde_json::from_value(json!({
            "Song": "Yesterday",
            "Artist": "The Beatles",
            "Year": "1965.0",
            "Rank": 1,
            "Genres": null,
            "Lyrics": "all my troubles"
        }))
        .unwrap();

        assert_eq!(record.song, "Yesterday");
        assert_eq!(record.year, Some(1965));
        assert_eq!(record.rank, Some(1));
        assert_eq!(record.genres, None);
        assert_eq!(record.popularity, None);
        assert_eq!(record.extra["Lyrics"], json!("all my troubles"));
        assert_eq!(record.decade(), Some(1960));
    }

    #[test]
    fn test_serialize_keeps_column_names() {
        let record = SongRecord::new("Hey Jude", "The Beatles")
            .with_year(1968)
            .with_genres("rock, pop");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Song"], json!("Hey Jude"));
        assert_eq!(value["Year"], json!(1968));
        assert_eq!(value["Genres"], json!("rock, pop"));
        assert!(value.get("Rank").is_none());
    }

    #[test]
    fn test_genres_accessors() {
        let blank = SongRecord::new("a", "b").with_genres("  ");
        assert_eq!(blank.genres_field(), None);
        assert!(blank.genre_tags().is_empty());

        let unknown = SongRecord::new("a", "b").with_genres("Unknown");
        assert_eq!(unknown.genres_field(), Some("Unknown"));
        assert_eq!(unknown.valid_genres(), None);

        let tagged = SongRecord::new("a", "b").with_genres("rock, , soul");
        assert_eq!(tagged.genre_tags(), vec!["rock", "soul"]);
    }
}
