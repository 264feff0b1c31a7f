//! Command-line interface for the wikicache article store.
//!
//! Configuration comes from `WIKICACHE_*` environment variables (and the
//! optional TOML file named by `WIKICACHE_CONFIG_FILE`). Logs go to stderr.

mod render;

use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use render::LogFormat;
use tracing_subscriber::EnvFilter;
use wikicache_client::{WikipediaClient, to_markdown};
use wikicache_core::{ActionType, AppConfig, CacheDb, LogQuery, WikiCache};

#[derive(Parser)]
#[command(name = "wikicache")]
#[command(about = "Local cache of Wikipedia articles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an article, serving the stored copy while it is fresh
    Get {
        /// Exact article title
        title: String,
    },
    /// Fetch an article plus every article in its "See also" section
    Related {
        /// Title of the main article
        title: String,
    },
    /// List stored articles, most recently fetched first
    List,
    /// Show the cache decision log, newest first
    ShowLogs {
        /// Only rows for this title
        #[arg(long)]
        title: Option<String>,

        /// Only rows of this action
        #[arg(long, value_enum)]
        action_type: Option<ActionArg>,

        /// Maximum number of rows
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output layout
        #[arg(long, value_enum, default_value_t = LogFormat::Detailed)]
        format: LogFormat,
    },
    /// Re-fetch stored articles that are past the freshness window
    RefreshAll {
        /// Re-fetch every article regardless of age
        #[arg(long)]
        force: bool,
    },
    /// Print a stored article converted to Markdown
    Markdown {
        /// Exact article title
        title: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionArg {
    Check,
    Update,
    Create,
}

impl From<ActionArg> for ActionType {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Check => ActionType::Check,
            ActionArg::Update => ActionType::Update,
            ActionArg::Create => ActionType::Create,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render::error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;
    tracing::debug!(db_path = %config.db_path.display(), "configuration loaded");
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    match cli.command {
        Commands::Get { title } => {
            let resolution = engine(db, &config)?.resolve(&title).await?;
            println!("{}", render::resolution(&resolution));
        }
        Commands::Related { title } => {
            let result = engine(db, &config)?.resolve_related(&title).await?;
            println!("{}", render::related(&result));
        }
        Commands::List => {
            let entries = db.list_entries_by_fetch().await?;
            println!("{}", render::entries(&entries));
        }
        Commands::ShowLogs { title, action_type, limit, format } => {
            let query = LogQuery { title, action_type: action_type.map(ActionType::from), limit: Some(limit) };
            let logs = db.query_logs(&query).await?;
            println!("{}", render::logs(&logs, format));
        }
        Commands::RefreshAll { force } => {
            let summary = engine(db, &config)?.refresh_all(force).await?;
            println!("{}", render::refresh(&summary));
        }
        Commands::Markdown { title } => {
            let entry = db
                .find_entry_by_title(title.trim())
                .await?
                .ok_or_else(|| anyhow!("no stored article titled '{title}'; run `wikicache get` first"))?;
            println!("{}", to_markdown(&entry.content));
        }
    }

    Ok(())
}

fn engine(db: CacheDb, config: &AppConfig) -> Result<WikiCache<WikipediaClient>> {
    let client = WikipediaClient::from_app_config(config)?;
    Ok(WikiCache::new(db, client, config))
}
