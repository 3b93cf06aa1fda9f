//! Genre taxonomy and parent-genre mapping
//!
//! Collapses free-text subgenre tags (as returned by folksonomy tag APIs) into a
//! closed set of [`ParentGenre`]s.
//!
//! # Architecture
//! - [`GenreTaxonomy`]: the curated `parent -> [subgenre]` table. Immutable once
//!   built; the entry point builds it (built-in table plus configured extras)
//!   and hands it to [`GenreMapper::new`].
//! - [`GenreMapper`]: taxonomy plus the derived reverse index
//!   `subgenre -> parent`. Lookups are O(1) and never fail: unknown tags pass
//!   through as [`MappedGenre::Unmapped`].
//! - [`GenreTally`]: per-song batch aggregation over comma-separated genre
//!   fields.
//!
//! A tag listed under two parents resolves to the parent that comes first in
//! [`ParentGenre::ALL`]; the later entry is shadowed.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

/// Closed set of parent genres, in taxonomy iteration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParentGenre {
    #[serde(rename = "rock")]
    Rock,
    #[serde(rename = "pop")]
    Pop,
    #[serde(rename = "electronic")]
    Electronic,
    #[serde(rename = "hip hop")]
    HipHop,
    #[serde(rename = "r&b")]
    RnB,
    #[serde(rename = "metal")]
    Metal,
    #[serde(rename = "jazz")]
    Jazz,
    #[serde(rename = "folk")]
    Folk,
    #[serde(rename = "blues")]
    Blues,
    #[serde(rename = "classical")]
    Classical,
    #[serde(rename = "world")]
    World,
    #[serde(rename = "punk")]
    Punk,
}

impl ParentGenre {
    /// All parents in fixed iteration order
    pub const ALL: [ParentGenre; 12] = [
        ParentGenre::Rock,
        ParentGenre::Pop,
        ParentGenre::Electronic,
        ParentGenre::HipHop,
        ParentGenre::RnB,
        ParentGenre::Metal,
        ParentGenre::Jazz,
        ParentGenre::Folk,
        ParentGenre::Blues,
        ParentGenre::Classical,
        ParentGenre::World,
        ParentGenre::Punk,
    ];

    /// Lowercase display label (also the lookup key for the parent itself)
    pub fn label(self) -> &'static str {
        match self {
            ParentGenre::Rock => "rock",
            ParentGenre::Pop => "pop",
            ParentGenre::Electronic => "electronic",
            ParentGenre::HipHop => "hip hop",
            ParentGenre::RnB => "r&b",
            ParentGenre::Metal => "metal",
            ParentGenre::Jazz => "jazz",
            ParentGenre::Folk => "folk",
            ParentGenre::Blues => "blues",
            ParentGenre::Classical => "classical",
            ParentGenre::World => "world",
            ParentGenre::Punk => "punk",
        }
    }

    /// Parse a parent label (case-insensitive, trimmed)
    pub fn from_label(label: &str) -> Option<ParentGenre> {
        let key = lookup_key(label);
        ParentGenre::ALL.into_iter().find(|p| p.label() == key)
    }
}

impl fmt::Display for ParentGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of mapping one tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MappedGenre {
    /// Tag is a parent label or a curated subgenre
    Parent(ParentGenre),
    /// Tag is not in the taxonomy; carries the lowercased, trimmed tag
    Unmapped(String),
}

impl MappedGenre {
    pub fn parent(&self) -> Option<ParentGenre> {
        match self {
            MappedGenre::Parent(p) => Some(*p),
            MappedGenre::Unmapped(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, MappedGenre::Parent(_))
    }

    /// Parent label, or the pass-through tag
    pub fn label(&self) -> &str {
        match self {
            MappedGenre::Parent(p) => p.label(),
            MappedGenre::Unmapped(tag) => tag,
        }
    }
}

impl fmt::Display for MappedGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Curated `parent -> [subgenre]` table
///
/// Parents are always iterated in [`ParentGenre::ALL`] order; subgenres in the
/// order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreTaxonomy {
    entries: BTreeMap<ParentGenre, Vec<String>>,
}

impl GenreTaxonomy {
    /// Empty taxonomy (only parent labels will map)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in curated table
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_TAXONOMY.iter().map(|(parent, tags)| (*parent, tags.to_vec())))
    }

    /// Build from explicit entries; tags are lowercased and trimmed
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ParentGenre, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut taxonomy = Self::empty();
        for (parent, tags) in entries {
            taxonomy.extend(parent, tags);
        }
        taxonomy
    }

    /// Append subgenres under a parent
    pub fn extend<I, S>(&mut self, parent: ParentGenre, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = self.entries.entry(parent).or_default();
        list.extend(
            tags.into_iter()
                .map(|t| lookup_key(t.as_ref()))
                .filter(|t| !t.is_empty()),
        );
    }

    /// Append configured extras keyed by parent label
    ///
    /// # Errors
    /// Returns `Error::Config` if a key is not one of the parent labels.
    pub fn with_extras(mut self, extras: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        for (label, tags) in extras {
            let parent = ParentGenre::from_label(label).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown parent genre '{}' in taxonomy extras (expected one of: {})",
                    label,
                    ParentGenre::ALL.map(|p| p.label()).join(", ")
                ))
            })?;
            self.extend(parent, tags);
        }
        Ok(self)
    }

    /// Subgenres listed under a parent
    pub fn subgenres(&self, parent: ParentGenre) -> &[String] {
        self.entries.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(parent, subgenres)` in fixed parent order
    pub fn iter(&self) -> impl Iterator<Item = (ParentGenre, &[String])> {
        self.entries.iter().map(|(p, tags)| (*p, tags.as_slice()))
    }

    /// Total subgenre entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tag → parent genre lookup
#[derive(Debug, Clone)]
pub struct GenreMapper {
    taxonomy: GenreTaxonomy,
    reverse: HashMap<String, ParentGenre>,
}

impl Default for GenreMapper {
    fn default() -> Self {
        Self::new(GenreTaxonomy::builtin())
    }
}

impl GenreMapper {
    /// Derive the reverse index; first parent seen wins for a duplicated tag
    pub fn new(taxonomy: GenreTaxonomy) -> Self {
        let mut reverse = HashMap::with_capacity(taxonomy.len());

        for (parent, tags) in taxonomy.iter() {
            for tag in tags {
                match reverse.get(tag) {
                    Some(existing) if *existing != parent => {
                        debug!(
                            tag = %tag,
                            kept = %existing,
                            shadowed = %parent,
                            "Subgenre listed under two parents; keeping first"
                        );
                    }
                    Some(_) => {}
                    None => {
                        reverse.insert(tag.clone(), parent);
                    }
                }
            }
        }

        debug!(subgenres = reverse.len(), "Genre reverse index built");

        Self { taxonomy, reverse }
    }

    pub fn taxonomy(&self) -> &GenreTaxonomy {
        &self.taxonomy
    }

    /// Map one raw tag
    ///
    /// Lowercase + trim, then parent label, then reverse index. Never fails.
    ///
    /// # Example
    /// ```
    /// use songquiz_common::genre::{GenreMapper, MappedGenre, ParentGenre};
    ///
    /// let mapper = GenreMapper::default();
    /// assert_eq!(mapper.map_to_parent("hard rock"), MappedGenre::Parent(ParentGenre::Rock));
    /// assert_eq!(mapper.map_to_parent(" ROCK "), MappedGenre::Parent(ParentGenre::Rock));
    /// assert_eq!(
    ///     mapper.map_to_parent("chicago drill"),
    ///     MappedGenre::Unmapped("chicago drill".to_string())
    /// );
    /// ```
    pub fn map_to_parent(&self, tag: &str) -> MappedGenre {
        let key = lookup_key(tag);

        if let Some(parent) = ParentGenre::from_label(&key) {
            return MappedGenre::Parent(parent);
        }

        match self.reverse.get(&key) {
            Some(parent) => MappedGenre::Parent(*parent),
            None => MappedGenre::Unmapped(key),
        }
    }

    /// Distinct known parents for a comma-separated genres field
    pub fn parents_of(&self, genres: &str) -> BTreeSet<ParentGenre> {
        split_tags(genres)
            .filter_map(|tag| self.map_to_parent(tag).parent())
            .collect()
    }
}

/// Split a comma-separated genres field into trimmed, non-empty tags
pub fn split_tags(genres: &str) -> impl Iterator<Item = &str> {
    genres.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn lookup_key(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Songs counted per parent genre
///
/// A song contributes once to every distinct parent its tags map to. Songs
/// with no tag mapping to a known parent (including songs with no genres at
/// all) are counted in `no_genre`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenreTally {
    pub songs: usize,
    pub by_parent: BTreeMap<ParentGenre, usize>,
    pub no_genre: usize,
}

impl GenreTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one song's genres field
    pub fn record(&mut self, mapper: &GenreMapper, genres: Option<&str>) {
        self.songs += 1;

        let parents = genres.map(|g| mapper.parents_of(g)).unwrap_or_default();
        if parents.is_empty() {
            self.no_genre += 1;
            return;
        }
        for parent in parents {
            *self.by_parent.entry(parent).or_insert(0) += 1;
        }
    }

    pub fn count(&self, parent: ParentGenre) -> usize {
        self.by_parent.get(&parent).copied().unwrap_or(0)
    }
}

/// Built-in curated subgenre table
///
/// Kept free of cross-parent duplicates (see `test_builtin_has_no_duplicates`).
/// Country and its relatives sit under folk since the parent set has no
/// country bucket.
const BUILTIN_TAXONOMY: &[(ParentGenre, &[&str])] = &[
    (
        ParentGenre::Rock,
        &[
            "alternative", "alternative rock", "indie", "indie rock", "hard rock",
            "classic rock", "soft rock", "rock and roll", "rock n roll", "rock & roll",
            "rockabilly", "psychedelic", "psychedelic rock", "progressive rock", "prog rock",
            "garage rock", "glam rock", "southern rock", "blues rock", "blues-rock",
            "arena rock", "album rock", "heartland rock", "art rock", "post-rock",
            "post rock", "grunge", "post-grunge", "britpop", "new wave", "shoegaze",
            "surf rock", "stoner rock", "space rock", "krautrock", "math rock",
            "noise rock", "jam band", "yacht rock", "pop rock", "power pop", "dance rock",
            "funk rock", "rap rock", "modern rock", "college rock", "british invasion",
        ],
    ),
    (
        ParentGenre::Pop,
        &[
            "dance pop", "dance-pop", "teen pop", "bubblegum pop", "bubblegum", "europop",
            "electropop", "k-pop", "j-pop", "c-pop", "art pop", "indie pop", "dream pop",
            "chamber pop", "baroque pop", "sophisti-pop", "adult contemporary",
            "easy listening", "soft pop", "latin pop", "boy band", "girl group",
            "traditional pop", "hyperpop", "bedroom pop", "city pop", "sunshine pop",
            "mainstream pop", "vocal", "ballad",
        ],
    ),
    (
        ParentGenre::Electronic,
        &[
            "edm", "electronica", "electro", "dance", "house", "deep house", "tech house",
            "progressive house", "electro house", "techno", "trance", "dubstep",
            "drum and bass", "drum n bass", "dnb", "jungle", "breakbeat", "big beat",
            "ambient", "downtempo", "trip hop", "trip-hop", "chillout", "chillwave", "idm",
            "synthpop", "synth-pop", "synthwave", "disco", "nu disco", "eurodance",
            "hi-nrg", "hardstyle", "garage", "uk garage", "future bass", "electroclash",
            "industrial", "italo disco", "club", "dance music",
        ],
    ),
    (
        ParentGenre::HipHop,
        &[
            "hip-hop", "hiphop", "rap", "gangsta rap", "trap", "southern hip hop",
            "dirty south", "east coast hip hop", "west coast hip hop", "west coast rap",
            "conscious hip hop", "alternative hip hop", "underground hip hop",
            "old school hip hop", "boom bap", "crunk", "hyphy", "g-funk", "drill",
            "uk drill", "grime", "emo rap", "cloud rap", "pop rap", "hardcore hip hop",
            "horrorcore", "mumble rap",
        ],
    ),
    (
        ParentGenre::RnB,
        &[
            "rnb", "r and b", "rhythm and blues", "contemporary r&b", "alternative r&b",
            "soul", "neo soul", "neo-soul", "funk", "p-funk", "motown", "doo-wop",
            "doo wop", "quiet storm", "new jack swing", "gospel", "northern soul",
            "philly soul", "southern soul", "pop soul", "blue-eyed soul", "smooth soul",
            "urban contemporary",
        ],
    ),
    (
        ParentGenre::Metal,
        &[
            "heavy metal", "thrash metal", "death metal", "black metal", "doom metal",
            "power metal", "nu metal", "nu-metal", "metalcore", "glam metal", "hair metal",
            "progressive metal", "speed metal", "symphonic metal", "gothic metal",
            "industrial metal", "alternative metal", "groove metal", "sludge metal",
            "deathcore", "grindcore", "folk metal", "viking metal", "djent", "stoner metal",
        ],
    ),
    (
        ParentGenre::Jazz,
        &[
            "jazz fusion", "fusion", "smooth jazz", "bebop", "bop", "hard bop", "cool jazz",
            "swing", "big band", "vocal jazz", "acid jazz", "free jazz", "latin jazz",
            "jazz funk", "nu jazz", "modal jazz", "soul jazz", "dixieland", "ragtime",
            "avant-garde jazz", "post-bop", "jazz vocal", "lounge", "crooner",
        ],
    ),
    (
        ParentGenre::Folk,
        &[
            "folk rock", "indie folk", "contemporary folk", "singer-songwriter", "acoustic",
            "americana", "folk pop", "anti-folk", "freak folk", "chamber folk", "roots",
            "country", "country rock", "country pop", "alt-country", "alternative country",
            "outlaw country", "traditional country", "contemporary country", "new country",
            "honky tonk", "bluegrass", "western swing",
        ],
    ),
    (
        ParentGenre::Blues,
        &[
            "delta blues", "chicago blues", "electric blues", "acoustic blues",
            "texas blues", "country blues", "modern blues", "soul blues", "jump blues",
            "piedmont blues", "british blues", "boogie-woogie",
        ],
    ),
    (
        ParentGenre::Classical,
        &[
            "orchestral", "symphony", "opera", "baroque", "romantic", "chamber music",
            "contemporary classical", "modern classical", "neoclassical", "minimalism",
            "classical piano", "piano", "choral", "string quartet", "early music",
            "renaissance", "impressionism",
        ],
    ),
    (
        ParentGenre::World,
        &[
            "world music", "reggae", "dancehall", "ska", "rocksteady", "dub", "latin",
            "reggaeton", "salsa", "bachata", "merengue", "cumbia", "bossa nova", "samba",
            "mpb", "afrobeat", "afrobeats", "afropop", "highlife", "flamenco", "celtic",
            "tango", "bhangra", "bollywood", "calypso", "soca", "zouk", "fado", "klezmer",
            "polka", "mariachi", "ranchera", "tejano",
        ],
    ),
    (
        ParentGenre::Punk,
        &[
            "punk rock", "pop punk", "pop-punk", "hardcore", "hardcore punk", "post-punk",
            "post punk", "emo", "skate punk", "ska punk", "garage punk", "proto-punk",
            "riot grrrl", "street punk", "oi", "crust punk", "melodic hardcore", "screamo",
            "anarcho-punk", "horror punk", "celtic punk", "folk punk",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_labels_round_trip() {
        for parent in ParentGenre::ALL {
            assert_eq!(ParentGenre::from_label(parent.label()), Some(parent));
        }
        assert_eq!(ParentGenre::from_label("  Hip Hop "), Some(ParentGenre::HipHop));
        assert_eq!(ParentGenre::from_label("R&B"), Some(ParentGenre::RnB));
        assert_eq!(ParentGenre::from_label("country"), None);
    }

    #[test]
    fn test_builtin_has_no_duplicates() {
        let taxonomy = GenreTaxonomy::builtin();
        let mut seen = BTreeSet::new();
        for (parent, tags) in taxonomy.iter() {
            for tag in tags {
                assert!(seen.insert(tag.clone()), "'{}' listed twice (again under {})", tag, parent);
                assert!(
                    ParentGenre::from_label(tag).is_none(),
                    "'{}' shadows a parent label",
                    tag
                );
            }
        }
        assert_eq!(seen.len(), taxonomy.len());
    }

    #[test]
    fn test_builtin_covers_every_parent() {
        let taxonomy = GenreTaxonomy::builtin();
        for parent in ParentGenre::ALL {
            assert!(!taxonomy.subgenres(parent).is_empty(), "{} has no subgenres", parent);
        }
    }

    #[test]
    fn test_reference_lookups() {
        let mapper = GenreMapper::default();
        assert_eq!(mapper.map_to_parent("hard rock"), MappedGenre::Parent(ParentGenre::Rock));
        assert_eq!(mapper.map_to_parent("ROCK"), MappedGenre::Parent(ParentGenre::Rock));
        assert_eq!(mapper.map_to_parent("  Jazz Fusion  "), MappedGenre::Parent(ParentGenre::Jazz));
        assert_eq!(
            mapper.map_to_parent("chicago drill"),
            MappedGenre::Unmapped("chicago drill".to_string())
        );
    }

    #[test]
    fn test_unmapped_is_lowercased_and_trimmed() {
        let mapper = GenreMapper::default();
        let mapped = mapper.map_to_parent("  Seen LIVE ");
        assert_eq!(mapped, MappedGenre::Unmapped("seen live".to_string()));
        assert_eq!(mapped.label(), "seen live");
        assert!(!mapped.is_known());
        assert_eq!(mapped.parent(), None);
    }

    #[test]
    fn test_lookup_is_exact_not_substring() {
        let mapper = GenreMapper::default();
        // "drill" is curated; "chicago drill" is not
        assert_eq!(mapper.map_to_parent("drill"), MappedGenre::Parent(ParentGenre::HipHop));
        assert!(!mapper.map_to_parent("rock-ish").is_known());
    }

    #[test]
    fn test_duplicate_tag_resolves_to_first_parent() {
        // Pop is listed first here but Rock comes first in ParentGenre::ALL
        let taxonomy = GenreTaxonomy::from_entries(vec![
            (ParentGenre::Pop, vec!["crossover"]),
            (ParentGenre::Rock, vec!["crossover"]),
            (ParentGenre::Metal, vec!["crossover thrash"]),
        ]);
        let mapper = GenreMapper::new(taxonomy);

        assert_eq!(mapper.map_to_parent("crossover"), MappedGenre::Parent(ParentGenre::Rock));
        assert_eq!(
            mapper.map_to_parent("crossover thrash"),
            MappedGenre::Parent(ParentGenre::Metal)
        );
    }

    #[test]
    fn test_parent_label_beats_reverse_index() {
        // A subgenre spelled like a parent label never overrides the parent
        let taxonomy = GenreTaxonomy::from_entries(vec![(ParentGenre::Pop, vec!["rock"])]);
        let mapper = GenreMapper::new(taxonomy);
        assert_eq!(mapper.map_to_parent("rock"), MappedGenre::Parent(ParentGenre::Rock));
    }

    #[test]
    fn test_with_extras() {
        let mut extras = BTreeMap::new();
        extras.insert("Hip Hop".to_string(), vec!["Chicago Drill".to_string()]);
        let taxonomy = GenreTaxonomy::builtin().with_extras(&extras).unwrap();
        let mapper = GenreMapper::new(taxonomy);
        assert_eq!(mapper.map_to_parent("chicago drill"), MappedGenre::Parent(ParentGenre::HipHop));

        let mut bad = BTreeMap::new();
        bad.insert("country".to_string(), vec!["bro country".to_string()]);
        assert!(matches!(
            GenreTaxonomy::builtin().with_extras(&bad),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_parents_of_field() {
        let mapper = GenreMapper::default();
        let parents = mapper.parents_of("hard rock, jazz fusion, , rock, seen live");
        assert_eq!(
            parents.into_iter().collect::<Vec<_>>(),
            vec![ParentGenre::Rock, ParentGenre::Jazz]
        );
        assert!(mapper.parents_of("").is_empty());
    }

    #[test]
    fn test_tally() {
        let mapper = GenreMapper::default();
        let mut tally = GenreTally::new();

        tally.record(&mapper, Some("hard rock, jazz fusion"));
        tally.record(&mapper, Some("xyz-made-up-tag"));
        tally.record(&mapper, None);
        tally.record(&mapper, Some("classic rock,soft rock"));

        assert_eq!(tally.songs, 4);
        assert_eq!(tally.count(ParentGenre::Rock), 2);
        assert_eq!(tally.count(ParentGenre::Jazz), 1);
        assert_eq!(tally.count(ParentGenre::Pop), 0);
        assert_eq!(tally.no_genre, 2);
    }

    #[test]
    fn test_mapper_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GenreMapper>();
    }
}
