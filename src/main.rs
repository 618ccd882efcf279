use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rivalverso_stats::api::{build_router, dedup_by_id, state::AppState};
use rivalverso_stats::config::AppConfig;
use rivalverso_stats::competition::{
    calculate_stats_from_matches, competition_start_timestamp, filter_matches_for_competition,
    log_competition_filtering, COMPETITION_START_KEY,
};
use rivalverso_stats::models::{parse_utc_timestamp, EntityId, MatchRecord};
use rivalverso_stats::storage::{write_setting, JsonlReader, JsonlWriter, StorageConfig};

#[derive(Parser)]
#[command(name = "rivalverso-stats")]
#[command(about = "RIVALVERSO Challenge leaderboard stats service")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compute and print competition stats
    Stats {
        /// Restrict to a single player
        #[arg(long)]
        player: Option<String>,
    },

    /// Import match records from a JSON file (array of records)
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Parse and report but don't store
        #[arg(long)]
        dry_run: bool,
    },

    /// Set the competition start timestamp (RFC 3339 UTC)
    SetCompetitionStart {
        /// e.g. "2025-01-01T00:00:00Z"
        timestamp: String,
    },

    /// Print the configured competition start timestamp
    ShowCompetitionStart,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config file supplies defaults; CLI flags win.
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());
    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting rivalverso-stats v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(data_dir);

    match cli.command {
        Commands::Serve { host, port } => {
            let state = AppState {
                storage: Arc::new(storage),
            };
            let app = build_router(state);
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Stats { player } => {
            let reader: JsonlReader<MatchRecord> = JsonlReader::new(storage.matches_path());
            let matches = reader.read_all().context("Failed to read match store")?;
            let mut matches = dedup_by_id(matches, |m| m.id.as_ref().map(|id| id.as_str()));

            if let Some(ref player) = player {
                let needle = player.trim().to_lowercase();
                matches.retain(|m| {
                    m.player
                        .as_deref()
                        .is_some_and(|p| p.trim().to_lowercase() == needle)
                });
            }

            let start = competition_start_timestamp(&storage);
            let original_count = matches.len();
            let result = filter_matches_for_competition(matches, start.as_deref());
            log_competition_filtering(
                original_count,
                result.matches.competition_matches,
                start.as_deref(),
            );
            let stats = calculate_stats_from_matches(&result.matches.valid_matches);

            println!("\n=== Competition Stats ===");
            if let Some(player) = player {
                println!("Player:           {}", player);
            }
            match start {
                Some(ref s) => println!("Window start:     {}", s),
                None => println!("Window start:     (not configured, unfiltered)"),
            }
            println!("Total matches:    {}", result.matches.total_matches);
            println!("In competition:   {}", result.matches.competition_matches);
            println!("Filtered out:     {}", result.matches.filtered_out());
            println!("Games played:     {}", stats.games_played);
            println!("Wins:             {}", stats.wins);
            println!("Kills:            {}", stats.kills);
            println!("Deaths:           {}", stats.deaths);
            println!("Assists:          {}", stats.assists);
            println!("Time played:      {}s", stats.time_played);
            println!("K/D:              {:.2}", stats.kd_ratio);
            println!("KDA:              {:.2}", stats.kda_ratio);
            println!("Win rate:         {:.1}%", stats.win_rate);
        }
        Commands::Import { file, dry_run } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let mut records: Vec<MatchRecord> =
                serde_json::from_str(&contents).context("Expected a JSON array of matches")?;

            // Assign deterministic ids so re-imports deduplicate.
            for record in &mut records {
                if record.id.is_none() {
                    record.id = Some(EntityId::generate(&[
                        record.player.as_deref().unwrap_or(""),
                        record.raw_timestamp().unwrap_or(""),
                        record.result.as_deref().unwrap_or(""),
                        &record.kills.to_string(),
                        &record.deaths.to_string(),
                        &record.assists.to_string(),
                        &record.duration.to_string(),
                    ]));
                }
            }

            let reader: JsonlReader<MatchRecord> = JsonlReader::new(storage.matches_path());
            let existing = reader.read_all().context("Failed to read match store")?;
            let existing_ids: std::collections::HashSet<String> = existing
                .iter()
                .filter_map(|m| m.id.as_ref().map(|id| id.as_str().to_string()))
                .collect();

            let total = records.len();
            let new_records: Vec<MatchRecord> = records
                .into_iter()
                .filter(|m| {
                    m.id.as_ref()
                        .map(|id| !existing_ids.contains(id.as_str()))
                        .unwrap_or(true)
                })
                .collect();

            if !dry_run {
                let writer: JsonlWriter<MatchRecord> = JsonlWriter::new(storage.matches_path());
                writer
                    .append_batch(&new_records)
                    .context("Failed to write match store")?;
            }

            println!("\n=== Import Results ===");
            println!("Records in file:  {}", total);
            println!("New records:      {}", new_records.len());
            println!("Duplicates:       {}", total - new_records.len());
            if dry_run {
                println!("\n(dry run - no data written to disk)");
            }
        }
        Commands::SetCompetitionStart { timestamp } => {
            if parse_utc_timestamp(&timestamp).is_none() {
                bail!(
                    "Invalid timestamp (expected RFC 3339, e.g. 2025-01-01T00:00:00Z): {}",
                    timestamp
                );
            }

            write_setting(&storage, COMPETITION_START_KEY, &timestamp)
                .context("Failed to write settings store")?;
            println!("Competition start set to {}", timestamp);
        }
        Commands::ShowCompetitionStart => match competition_start_timestamp(&storage) {
            Some(start) => println!("Competition start: {}", start),
            None => println!("No competition start configured (matches are not filtered)."),
        },
    }

    Ok(())
}
