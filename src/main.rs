use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder_stats::api::{build_router, state::AppState};
use ladder_stats::config::AppConfig;
use ladder_stats::dashboard::{ChartPanel, Dashboard, RaceMmrChart, TeamCompChart};
use ladder_stats::models::{MirrorPolicy, SeasonId};
use ladder_stats::source::{validate_player_id, SourceLocation};

#[derive(Parser)]
#[command(name = "ladder-stats")]
#[command(about = "Season statistics and rating projections for a team ladder")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data root: a base URL or a local directory (overrides config)
    #[arg(long)]
    source: Option<String>,

    /// Season to report on instead of the current one
    #[arg(long)]
    season: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the season being reported on
    Season,

    /// Weekly match activity
    Activity,

    /// Per-race selection and win rates
    Races,

    /// Race selection win rates
    RaceSelection,

    /// Team composition popularity and win rates
    Compositions,

    /// Head-to-head matchup win rates
    Matchups {
        /// Leave games against the same composition out of the totals
        #[arg(long)]
        exclude_mirrors: bool,
    },

    /// Team compositions grouped by race pair
    Teams,

    /// Ranked players
    Leaderboard {
        /// Games required to be ranked (overrides config)
        #[arg(long)]
        min_games: Option<u32>,
    },

    /// A player's profile and match history
    Player {
        id: String,
    },

    /// A player's rating gains by race and team composition
    PlayerMmr {
        id: String,

        /// Show the average per game instead of the total
        #[arg(long)]
        per_game: bool,
    },

    /// Time since the statistics were last processed
    LastUpdated,

    /// Start the API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: &str) -> Result<AppConfig> {
    let path = PathBuf::from(path);
    if path.exists() {
        AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(location) = &cli.source {
        config.source.location = location.clone();
    }

    // Initialize tracing; stdout is reserved for command output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting ladder-stats v{}", env!("CARGO_PKG_VERSION"));

    let location: SourceLocation = config.source.location.parse()?;
    let source = location.open(config.fetcher_config())?;
    tracing::info!("Reading statistics from {}", source.describe());

    let dashboard = Dashboard::new(source, config.ranking.min_games);
    let season = cli.season.map(SeasonId::new);

    match cli.command {
        Commands::Season => {
            let season = dashboard.season(season).await;
            print_json(&serde_json::json!({ "season": season }))?;
        }
        Commands::Activity => print_json(&dashboard.activity(season).await?)?,
        Commands::Races => print_json(&dashboard.race_selection(season).await?)?,
        Commands::RaceSelection => {
            print_json(&dashboard.race_selection_win_rates(season).await?)?
        }
        Commands::Compositions => print_json(&dashboard.compositions(season).await?)?,
        Commands::Matchups { exclude_mirrors } => {
            let mirrors = if exclude_mirrors {
                MirrorPolicy::Exclude
            } else {
                MirrorPolicy::Include
            };
            print_json(&dashboard.matchups(season, mirrors).await?)?;
        }
        Commands::Teams => print_json(&dashboard.teams(season).await?)?,
        Commands::Leaderboard { min_games } => {
            print_json(&dashboard.leaderboard(season, min_games).await?)?
        }
        Commands::Player { id } => {
            let id = validate_player_id(&id)?;
            print_json(&dashboard.player(season, &id).await?)?;
        }
        Commands::PlayerMmr { id, per_game } => {
            let id = validate_player_id(&id)?;
            let mmr = dashboard.player_mmr(season, &id).await?;

            let mut races = ChartPanel::new();
            let mut race_chart = races.load(RaceMmrChart(mmr.races.clone()));
            let mut team_comps = ChartPanel::new();
            let mut team_comp_chart = team_comps.load(TeamCompChart(mmr.team_comps.clone()));
            if per_game {
                race_chart = races.toggle().unwrap_or(race_chart);
                team_comp_chart = team_comps.toggle().unwrap_or(team_comp_chart);
            }

            print_json(&serde_json::json!({
                "season": mmr.season,
                "race_chart": race_chart,
                "team_comp_chart": team_comp_chart,
                "races": mmr.races,
                "team_comps": mmr.team_comps,
            }))?;
        }
        Commands::LastUpdated => {
            print_json(&serde_json::json!({ "last_updated": dashboard.last_updated().await }))?
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState {
                dashboard,
                config: Arc::new(config),
            };
            let app = build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
