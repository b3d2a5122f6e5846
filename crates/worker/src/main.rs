use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockboard_core::config::{EngineConfig, Settings};
use stockboard_core::domain::model::Snapshot;
use stockboard_core::domain::recommendation::RecommendationScore;
use stockboard_core::engine::{RecommendOptions, RecommendationEngine, TrendingOptions};
use stockboard_core::source::{source_from_settings, JsonFileSource, SnapshotSource};

#[derive(Debug, Parser)]
#[command(name = "stockboard_worker")]
struct Args {
    /// Snapshot JSON file. Defaults to SNAPSHOT_URL / SNAPSHOT_PATH.
    #[arg(long, global = true)]
    snapshot: Option<String>,

    /// Maximum number of results (defaults to RECO_DEFAULT_LIMIT).
    #[arg(long, global = true)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Posts similar to a given post.
    Similar {
        #[arg(long)]
        item: String,
    },
    /// Hybrid content + collaborative recommendations for a user.
    Recommend {
        #[arg(long)]
        user: String,
        #[arg(long)]
        content_weight: Option<f64>,
        #[arg(long)]
        collaborative_weight: Option<f64>,
        /// Renormalize fused scores by the weight of the sources present.
        #[arg(long)]
        normalize: bool,
    },
    /// Time-decayed popular posts.
    Trending {
        #[arg(long)]
        window_hours: Option<f64>,
        /// Reference time (RFC 3339). Defaults to now.
        #[arg(long)]
        now: Option<String>,
    },
    /// Stocks by sector affinity and daily change.
    Instruments {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(&settings, args).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker run failed");
    }
    result
}

async fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let engine = RecommendationEngine::new(EngineConfig::from_env()?)?;

    let source: Box<dyn SnapshotSource> = match args.snapshot.as_deref() {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => source_from_settings(settings)?,
    };
    let (snapshot, _) = source.load().await?;

    let limit = args.limit.unwrap_or(engine.config().default_limit);
    let recs = execute(&engine, &snapshot, args.command, limit)?;

    tracing::info!(returned = recs.len(), "recommendations computed");
    println!("{}", serde_json::to_string_pretty(&recs)?);
    Ok(())
}

fn execute(
    engine: &RecommendationEngine,
    snapshot: &Snapshot,
    command: Command,
    limit: usize,
) -> anyhow::Result<Vec<RecommendationScore>> {
    let recs = match command {
        Command::Similar { item } => {
            let target = snapshot
                .item(&item)
                .with_context(|| format!("item not found in snapshot: {item}"))?;
            engine.recommend_similar_items(target, &snapshot.items, limit)
        }
        Command::Recommend {
            user,
            content_weight,
            collaborative_weight,
            normalize,
        } => {
            let target = snapshot
                .user(&user)
                .with_context(|| format!("user not found in snapshot: {user}"))?;
            let defaults = engine.recommend_options();
            let opts = RecommendOptions {
                content_weight: content_weight.unwrap_or(defaults.content_weight),
                collaborative_weight: collaborative_weight
                    .unwrap_or(defaults.collaborative_weight),
                limit,
                normalize_by_present_weight: normalize || defaults.normalize_by_present_weight,
            };
            engine.recommend(target, &snapshot.users, &snapshot.items, &opts)?
        }
        Command::Trending { window_hours, now } => {
            let opts = TrendingOptions {
                time_window_hours: window_hours
                    .unwrap_or(engine.trending_options().time_window_hours),
                limit,
            };
            match now {
                Some(s) => {
                    let now = chrono::DateTime::parse_from_rfc3339(&s)
                        .with_context(|| format!("invalid --now timestamp: {s}"))?
                        .with_timezone(&chrono::Utc);
                    engine.recommend_trending_at(&snapshot.items, &opts, now)?
                }
                None => engine.recommend_trending(&snapshot.items, &opts)?,
            }
        }
        Command::Instruments { user } => {
            let target = snapshot
                .user(&user)
                .with_context(|| format!("user not found in snapshot: {user}"))?;
            engine.recommend_instruments(target, &snapshot.instruments, limit)
        }
    };
    Ok(recs)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
