//! End-to-end enrichment pipeline tests over on-disk datasets

use serde_json::json;
use songquiz_common::matcher::QueryStrategy;
use songquiz_common::{Error, GenreMapper, MatchQuery, ParentGenre, TrackMatcher};
use songquiz_enrich::genres::{apply_artist_tags, artists_missing_genres, propagate_genres};
use songquiz_enrich::{
    load_dataset, pool, save_dataset, DatasetStats, Deduplicator, PoolFilter, RawTag,
    RecordedCatalog, TagFilter,
};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn chart_json() -> serde_json::Value {
    json!([
        {"Song": "Umbrella", "Artist": "Rihanna feat. Jay-Z", "Year": "2007", "Rank": 1, "Genres": "pop, r&b", "Weeks": 10},
        {"Song": "Umbrella (Radio Edit)", "Artist": "Rihanna", "Year": 2007, "Rank": 4},
        {"Song": "Disturbia", "Artist": "Rihanna", "Year": "2008.0", "Rank": 5},
        {"Song": "Rehab", "Artist": "Amy Winehouse", "Year": 2007, "Rank": 9},
        {"Song": "Seven Nation Army", "Artist": "The White Stripes", "Year": 2003, "Rank": 76, "Genres": "Unknown"}
    ])
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_load_save_preserves_unknown_columns() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("chart.json");
    let output = dir.path().join("out.json");
    fs::write(&input, chart_json().to_string()).unwrap();

    let records = load_dataset(&input).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[2].year, Some(2008));

    save_dataset(&output, &records).unwrap();
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written[0]["Weeks"], json!(10));
    assert_eq!(written[0]["Year"], json!(2007));
    assert_eq!(load_dataset(&output).unwrap(), records);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(load_dataset(&missing), Err(Error::Io(_))));

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"[{"Song": "no artist"}]"#).unwrap();
    assert!(matches!(load_dataset(&bad), Err(Error::Json(_))));
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_dedup_then_propagate_then_tags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chart.json");
    fs::write(&path, chart_json().to_string()).unwrap();

    // Dedup: the radio edit collapses into the first Umbrella entry
    let outcome = Deduplicator::default().dedup(load_dataset(&path).unwrap());
    assert_eq!(outcome.kept.len(), 4);
    assert_eq!(outcome.duplicates[0].removed.song, "Umbrella (Radio Edit)");
    let mut records = outcome.kept;

    // Propagation keys on the full artist credit, so "Rihanna" learns nothing
    // from "Rihanna feat. Jay-Z"
    let report = propagate_genres(&mut records);
    assert_eq!(report.applied, 0);
    assert_eq!(
        artists_missing_genres(&records),
        vec!["amy winehouse", "rihanna"]
    );

    // Artist tags fill the rest
    let mut artist_tags = BTreeMap::new();
    artist_tags.insert(
        "Rihanna".to_string(),
        vec![RawTag::new("pop", 100), RawTag::new("dance", "61"), RawTag::new("sexy", 3)],
    );
    artist_tags.insert(
        "Amy Winehouse".to_string(),
        vec![RawTag::new("soul", 100), RawTag::new("seen live", 80)],
    );
    let applied = apply_artist_tags(&mut records, &artist_tags, &TagFilter::default());
    assert_eq!(applied, 2);
    assert!(artists_missing_genres(&records).is_empty());

    save_dataset(&path, &records).unwrap();
    let reloaded = load_dataset(&path).unwrap();
    let disturbia = reloaded.iter().find(|r| r.song == "Disturbia").unwrap();
    assert_eq!(disturbia.genres.as_deref(), Some("pop, dance"));

    // Stats over the enriched dataset
    let stats = DatasetStats::compute(&reloaded, &GenreMapper::default(), 5);
    assert_eq!(stats.songs, 4);
    assert_eq!(stats.with_genres, 4);
    assert_eq!(stats.parent_genres.count(ParentGenre::Pop), 2);
    assert_eq!(stats.parent_genres.count(ParentGenre::RnB), 2);
    assert_eq!(stats.parent_genres.no_genre, 1);
    assert_eq!(stats.by_decade.get(&2000), Some(&4));

    // Quiz pool: top-50 pop songs
    let filter = PoolFilter {
        genre: Some(ParentGenre::Pop),
        decade: None,
        max_rank: Some(pool::DEFAULT_MAX_RANK),
    };
    let eligible = pool::filter_pool(&reloaded, &filter, &GenreMapper::default());
    let songs: Vec<&str> = eligible.iter().map(|r| r.song.as_str()).collect();
    assert_eq!(songs, vec!["Umbrella", "Disturbia"]);
}

// ============================================================================
// Catalog Replay
// ============================================================================

#[test]
fn test_recorded_catalog_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(
        &path,
        json!({
            "Rehab Amy Winehouse": [
                {"title": "Rehab", "artist_name": "Amy Winehouse"},
                {"title": "Rehab", "artist_name": "Amy Winehouse", "preview_url": "https://p/rehab"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let catalog = RecordedCatalog::from_file(&path).unwrap();
    let resolved = catalog
        .resolve(&TrackMatcher::new(), &MatchQuery::new("Rehab", "Amy Winehouse"))
        .unwrap();

    assert_eq!(resolved.strategy, QueryStrategy::Combined);
    assert_eq!(resolved.candidate.preview(), Some("https://p/rehab"));
}
