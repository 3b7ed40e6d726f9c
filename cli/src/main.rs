mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use favorites_core::models::Movie;
use favorites_core::storage::{FavoritesStore, KeyValueStore, SqliteStore};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "favorites")]
#[command(about = "Manage a list of favorite movies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file, created with defaults if missing
    #[arg(short, long, default_value = "favorites.toml")]
    config: PathBuf,

    /// Settings database (overrides the config file)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Settings key holding the favorites (overrides the config file)
    #[arg(long)]
    slot: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List all favorites in order
    List,
    /// Append a movie to the favorites
    Add(MovieArgs),
    /// Remove every favorite equal to the movie
    Remove(MovieArgs),
    /// Print whether the movie is a favorite
    Contains(MovieArgs),
    /// Remove all favorites
    Clear,
    /// Print the stored favorites as JSON
    Export,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct MovieArgs {
    /// Movie as a JSON object
    #[arg(long)]
    json: Option<String>,

    /// File containing the movie as a JSON object
    #[arg(long)]
    file: Option<PathBuf>,
}

impl MovieArgs {
    fn movie(&self) -> Result<Movie> {
        let bytes = match (&self.json, &self.file) {
            (Some(json), _) => json.clone().into_bytes(),
            (None, Some(path)) => {
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
            }
            (None, None) => anyhow::bail!("Either --json or --file is required"),
        };

        Ok(Movie::from_bytes(&bytes)?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let mut config = config::load_config(&cli.config)?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(slot) = cli.slot {
        config.slot = slot;
    }
    debug!("Using {:?} under key {:?}", config.database_path, config.slot);

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let favorites = FavoritesStore::with_key(store, config.slot)?;

    match cli.command {
        Commands::List => {
            for movie in favorites.load_all()? {
                println!("{}", describe(&movie));
            }
        }
        Commands::Add(args) => {
            let movie = args.movie()?;
            favorites.add(&movie)?;
            info!("Added movie {}", movie.id);
            println!("Added: {}", describe(&movie));
        }
        Commands::Remove(args) => {
            let movie = args.movie()?;
            favorites.remove(&movie)?;
            info!("Removed movie {}", movie.id);
            println!("Removed: {}", describe(&movie));
        }
        Commands::Contains(args) => {
            println!("{}", favorites.is_favorite(&args.movie()?)?);
        }
        Commands::Clear => {
            favorites.clear()?;
            println!("Cleared favorites");
        }
        Commands::Export => {
            println!("{}", export_raw(&favorites)?);
        }
    }

    Ok(())
}

/// The stored favorites exactly as written, `[]` if nothing was ever saved
fn export_raw<S: KeyValueStore>(favorites: &FavoritesStore<S>) -> Result<String> {
    match favorites.store().get(favorites.key())? {
        Some(bytes) => Ok(String::from_utf8(bytes).context("Stored favorites are not UTF-8")?),
        None => Ok("[]".to_string()),
    }
}

fn describe(movie: &Movie) -> String {
    match movie.release_year() {
        Some(year) => format!("{:>8}  {} ({})", movie.id, movie.title, year),
        None => format!("{:>8}  {}", movie.id, movie.title),
    }
}

fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level")?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    Ok(())
}
