//! songquiz-enrich - dataset enrichment and matching tool
//!
//! **Usage:**
//! ```bash
//! songquiz-enrich [--config <file>] <command> [args]
//! ```
//!
//! Command output goes to stdout; logs go to stderr (level from `RUST_LOG`,
//! else `[logging] level` in the config file).

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use songquiz_common::answer::is_correct_guess;
use songquiz_common::config::resolve_config_path;
use songquiz_common::similarity::{jaccard_ratio, shared_tokens};
use songquiz_common::{normalize, tokens, MatchQuery, ParentGenre, SimilarityPolicy, SongquizConfig};
use songquiz_enrich::genres::{self, RawTag};
use songquiz_enrich::{
    load_dataset, pool, save_dataset, DatasetStats, Deduplicator, PoolFilter, RecordedCatalog,
    TagFilter,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Handle for swapping the level filter once the config is known
type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Parser, Debug)]
#[command(name = "songquiz-enrich")]
#[command(about = "Song quiz dataset enrichment and fuzzy matching")]
#[command(version)]
struct Cli {
    /// Configuration file (overrides SONGQUIZ_CONFIG and the per-user default)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the normalized form of each argument
    Normalize {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Compare two strings under a similarity policy
    Similar {
        a: String,
        b: String,
        #[arg(long, value_enum, default_value_t = PolicyKind::Overlap)]
        policy: PolicyKind,
        /// Overlap policy: shared tokens required (default from config title_min_shared)
        #[arg(long)]
        min_shared: Option<usize>,
        /// Jaccard policy: threshold (default from config dedup_threshold)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Map genre tags to parent genres
    Genre {
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Check a quiz guess against the correct artist
    CheckAnswer { guess: String, artist: String },

    /// Remove fuzzy duplicate songs
    Dedup {
        #[command(flatten)]
        io: DatasetIo,
        /// Jaccard threshold (default from config dedup_threshold)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Copy each artist's known genres to their songs lacking genres
    Propagate {
        #[command(flatten)]
        io: DatasetIo,
    },

    /// List primary artists of songs still lacking genres
    MissingArtists {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Apply filtered artist tags (JSON: artist -> [{name, count}]) to songs lacking genres
    ApplyTags {
        #[command(flatten)]
        io: DatasetIo,
        #[arg(long, value_name = "FILE")]
        tags: PathBuf,
    },

    /// Print dataset statistics
    Analyze {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Number of top tags to list
        #[arg(long, default_value_t = songquiz_enrich::stats::DEFAULT_TOP_TAGS)]
        top: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Pick random quiz songs
    Pick {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Parent genre label (e.g. "rock", "hip hop")
        #[arg(long)]
        genre: Option<String>,
        /// Decade start year (e.g. 1980)
        #[arg(long)]
        decade: Option<i64>,
        #[arg(long, default_value_t = pool::DEFAULT_MAX_RANK)]
        max_rank: i64,
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Resolve a song against recorded catalog responses
    Resolve {
        /// JSON: query -> [{title, artist_name, preview_url}]
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,
        #[arg(long)]
        song: String,
        #[arg(long)]
        artist: String,
    },
}

#[derive(clap::Args, Debug)]
struct DatasetIo {
    /// Dataset JSON file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    /// Output file (defaults to rewriting the input)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl DatasetIo {
    fn output(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    Overlap,
    Jaccard,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing before config load so its messages are not lost
    let (subscriber, filter) = build_subscriber(startup_filter(), std::io::stderr);
    subscriber.init();

    let rust_log_set = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let config = load_config(cli.config.as_deref(), &filter, rust_log_set)?;

    run(cli.command, &config)
}

/// Registry with a reloadable level filter and a fmt layer writing to `writer`
fn build_subscriber<W>(
    initial: EnvFilter,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(initial);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// `RUST_LOG` if set and valid, else info
fn startup_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Load the configuration, then switch to its log level unless `RUST_LOG` is set
fn load_config(
    cli_arg: Option<&Path>,
    filter: &FilterHandle,
    rust_log_set: bool,
) -> Result<SongquizConfig> {
    let source = resolve_config_path(cli_arg);
    let config = SongquizConfig::load(cli_arg).context("Failed to load configuration")?;

    if !rust_log_set {
        let level = &config.logging.level;
        let configured = EnvFilter::try_new(level).unwrap_or_else(|e| {
            warn!(level = %level, error = %e, "Invalid log level in config, using info");
            EnvFilter::new("info")
        });
        filter
            .reload(configured)
            .context("Failed to apply configured log level")?;
    }

    debug!(source = ?source, "Configuration resolved");
    Ok(config)
}

/// Policy for the `similar` command; CLI overrides win over config values
fn similarity_policy(
    kind: PolicyKind,
    min_shared: Option<usize>,
    threshold: Option<f64>,
    config: &SongquizConfig,
) -> Result<SimilarityPolicy> {
    let policy = match kind {
        PolicyKind::Overlap => SimilarityPolicy::Overlap {
            min_shared: min_shared.unwrap_or(config.matching.title_min_shared),
        },
        PolicyKind::Jaccard => SimilarityPolicy::Jaccard {
            threshold: threshold.unwrap_or(config.matching.dedup_threshold),
        },
    };
    policy.validate().context("Invalid similarity parameters")?;
    Ok(policy)
}

/// Policy for the `dedup` command
fn dedup_policy(threshold: Option<f64>, config: &SongquizConfig) -> Result<SimilarityPolicy> {
    let policy = match threshold {
        Some(threshold) => SimilarityPolicy::Jaccard { threshold },
        None => config.dedup_policy(),
    };
    policy.validate().context("Invalid dedup threshold")?;
    Ok(policy)
}

fn run(command: Command, config: &SongquizConfig) -> Result<()> {
    match command {
        Command::Normalize { text } => {
            for t in text {
                println!("{}", normalize(&t));
            }
        }

        Command::Similar {
            a,
            b,
            policy,
            min_shared,
            threshold,
        } => {
            let policy = similarity_policy(policy, min_shared, threshold, config)?;
            let (ta, tb) = (tokens(&a), tokens(&b));
            println!("similar: {}", policy.compare_tokens(&ta, &tb));
            println!("shared tokens: {}", shared_tokens(&ta, &tb));
            match jaccard_ratio(&ta, &tb) {
                Some(ratio) => println!("jaccard: {:.3}", ratio),
                None => println!("jaccard: n/a"),
            }
        }

        Command::Genre { tags } => {
            let mapper = config.genre_mapper()?;
            for tag in tags {
                let mapped = mapper.map_to_parent(&tag);
                let status = if mapped.is_known() { "" } else { " (unmapped)" };
                println!("{} -> {}{}", tag, mapped, status);
            }
        }

        Command::CheckAnswer { guess, artist } => {
            let verdict = if is_correct_guess(&guess, &artist) {
                "correct"
            } else {
                "incorrect"
            };
            println!("{}", verdict);
        }

        Command::Dedup { io, threshold } => {
            let policy = dedup_policy(threshold, config)?;
            let records = load(&io.input)?;
            let outcome = Deduplicator::new(policy).dedup(records);

            for dup in &outcome.duplicates {
                let kept = &outcome.kept[dup.kept_index];
                println!(
                    "removed: {} - {}  (duplicate of {} - {})",
                    dup.removed.artist, dup.removed.song, kept.artist, kept.song
                );
            }
            save(io.output(), &outcome.kept)?;
            println!("kept {}, removed {}", outcome.kept.len(), outcome.duplicates.len());
        }

        Command::Propagate { io } => {
            let mut records = load(&io.input)?;
            let report = genres::propagate_genres(&mut records);
            save(io.output(), &records)?;
            println!(
                "applied genres to {} songs, {} still missing",
                report.applied, report.still_missing
            );
        }

        Command::MissingArtists { input } => {
            let records = load(&input)?;
            for artist in genres::artists_missing_genres(&records) {
                println!("{}", artist);
            }
        }

        Command::ApplyTags { io, tags } => {
            let mut records = load(&io.input)?;
            let content = std::fs::read_to_string(&tags)
                .with_context(|| format!("Failed to read tags file {}", tags.display()))?;
            let artist_tags: BTreeMap<String, Vec<RawTag>> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse tags file {}", tags.display()))?;

            let filter = TagFilter::from_config(&config.tags);
            let applied = genres::apply_artist_tags(&mut records, &artist_tags, &filter);
            save(io.output(), &records)?;
            println!("applied tags to {} songs", applied);
        }

        Command::Analyze { input, top, json } => {
            let records = load(&input)?;
            let stats = DatasetStats::compute(&records, &config.genre_mapper()?, top);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats);
            }
        }

        Command::Pick {
            input,
            genre,
            decade,
            max_rank,
            count,
            seed,
        } => {
            let genre = genre
                .map(|label| {
                    ParentGenre::from_label(&label)
                        .ok_or_else(|| anyhow!("Unknown parent genre '{}'", label))
                })
                .transpose()?;
            let records = load(&input)?;
            let mapper = config.genre_mapper()?;
            let filter = PoolFilter {
                genre,
                decade,
                max_rank: Some(max_rank),
            };

            let eligible = pool::filter_pool(&records, &filter, &mapper);
            info!(eligible = eligible.len(), "Song pool built");

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let picked = pool::pick(&eligible, count, &mut rng);
            if picked.is_empty() {
                return Err(anyhow!("No songs match the requested filters"));
            }
            println!("{}", serde_json::to_string_pretty(&picked)?);
        }

        Command::Resolve {
            catalog,
            song,
            artist,
        } => {
            let catalog = RecordedCatalog::from_file(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let query = MatchQuery::new(song, artist);
            match catalog.resolve(&config.track_matcher(), &query) {
                Some(resolved) => println!("{}", serde_json::to_string_pretty(&resolved)?),
                None => println!("no match"),
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Vec<songquiz_enrich::SongRecord>> {
    load_dataset(path).with_context(|| format!("Failed to load dataset {}", path.display()))
}

fn save(path: &Path, records: &[songquiz_enrich::SongRecord]) -> Result<()> {
    save_dataset(path, records).with_context(|| format!("Failed to write dataset {}", path.display()))
}
