use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod context;
mod logging;

#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Recipe client - search, browse and manage recipes", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search recipes by text and filters
    Search(commands::search::SearchArgs),
    /// Show one recipe
    Get {
        id: i64,
    },
    /// Create a recipe from a JSON file
    Create {
        file: std::path::PathBuf,
    },
    /// Apply a JSON patch file to a recipe
    Update {
        id: i64,
        file: std::path::PathBuf,
    },
    /// Delete a recipe
    Delete {
        id: i64,
    },
    /// Queue a bulk import of a .json or .csv file
    Import {
        file: std::path::PathBuf,
    },
    /// Inspect or edit the search history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List remembered queries, most recent first
    List,
    /// Forget one query
    Remove { query: String },
    /// Forget every query
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let ctx = context::CliContext::load(cli.api_url)?;

    let outcome = match cli.command {
        Commands::Search(args) => commands::search::run(&ctx, args).await,
        Commands::Get { id } => commands::recipes::get(&ctx, id).await,
        Commands::Create { file } => commands::recipes::create(&ctx, &file).await,
        Commands::Update { id, file } => commands::recipes::update(&ctx, id, &file).await,
        Commands::Delete { id } => commands::recipes::delete(&ctx, id).await,
        Commands::Import { file } => commands::recipes::import(&ctx, &file).await,
        Commands::History { action } => match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => commands::history::list(&ctx),
            HistoryAction::Remove { query } => commands::history::remove(&ctx, &query),
            HistoryAction::Clear => commands::history::clear(&ctx),
        },
    };

    ctx.flush_notifications();
    outcome
}
