//! storyctl - administer a story graph database.
//!
//! - Import Twee stories as new seasons
//! - List seasons and pick the default one
//! - Inspect a location and its choices

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use story_engine::{
    seasons, EngineConfig, EngineError, GraphImporter, ImportPlan, Navigator, Store,
};
use story_model::{LocationId, SeasonId};

#[derive(Parser)]
#[command(name = "storyctl")]
#[command(author, version, about = "Import and inspect story graphs")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a story file as a new season.
    Import {
        file: PathBuf,
        /// Make the new season the default.
        #[arg(long)]
        default: bool,
    },
    /// List seasons with their location counts.
    Seasons {
        #[arg(long)]
        json: bool,
    },
    /// Make a season the default.
    MakeDefault { season: SeasonId },
    /// Delete a season and everything in it.
    DeleteSeason { season: SeasonId },
    /// Show a location and the choices it offers.
    Show { location: LocationId },
    /// Parse and validate a story file without touching the database.
    Check { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EngineError> {
    let mut config = EngineConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let open = || Store::open(&config.database);
    match cli.command {
        Commands::Check { file } => check(&file)?,
        Commands::Import { file, default } => {
            let mut store = open()?;
            let season = GraphImporter::new()
                .mark_default(default)
                .import_file(&mut store, &file)?;
            println!("{season}");
        }
        Commands::Seasons { json } => {
            let summaries = seasons::list_with_location_counts(&open()?)?;
            if json {
                let text = serde_json::to_string_pretty(&summaries)
                    .map_err(|err| EngineError::Io(err.into()))?;
                println!("{text}");
            } else {
                for summary in summaries {
                    let season = &summary.season;
                    println!(
                        "{}{} {} {:>5} locations  {}  {}",
                        season.id,
                        if season.is_default { "*" } else { " " },
                        season.created_at.format("%Y-%m-%d %H:%M:%S"),
                        summary.location_count,
                        season.name,
                        season.origin_file.as_deref().unwrap_or("-"),
                    );
                }
            }
        }
        Commands::MakeDefault { season } => {
            seasons::make_default(&mut open()?, season)?;
        }
        Commands::DeleteSeason { season } => {
            seasons::delete_season(&mut open()?, season)?;
        }
        Commands::Show { location } => {
            let nav = Navigator::new(config.navigation.clone());
            let choices = nav.fetch_choices(&open()?, location)?;
            println!("{}", choices.description);
            if choices.is_terminal() {
                println!("  (the end)");
            }
            for destination in &choices.destinations {
                println!(
                    "  [{}] {} -> {}",
                    destination.position, destination.label, destination.target
                );
            }
        }
    }
    Ok(())
}

fn check(file: &Path) -> Result<(), EngineError> {
    let story = story_model::parse_file(file)?;
    let plan = ImportPlan::build(&story, None, chrono::Utc::now())?;
    let summary = plan.summary();
    println!(
        "{}: {} locations, {} decisions, {} destinations",
        story.title, summary.locations, summary.decisions, summary.destinations
    );
    Ok(())
}
