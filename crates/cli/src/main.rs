mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ndx", version, about = "Incremental note index with boolean search")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// Rebuild the index from the notes directory
    Reindex(ReindexArgs),

    /// Search notes with AND/OR/NOT terms and tag/date filters
    Search(SearchArgs),

    /// List indexed notes, most recently updated first
    List(ListArgs),

    /// Show totals and the most used tags
    Stats(StatsArgs),

    /// Write notes carrying all given tags to a JSON file
    Export(ExportArgs),

    /// Write the note link graph as JSON
    Graph(GraphArgs),

    /// Keep the index up to date while notes change
    Watch,
}

/// Output format for query commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Paths only, one per line
    Quiet,
}

#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// List every failed or renamed note
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query terms, e.g. `rust async OR tokio -draft`
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    pub query: Vec<String>,

    /// Only notes carrying all these tags (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tag: Vec<String>,

    /// Only notes updated on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<String>,

    /// Only notes updated on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub before: Option<String>,

    #[arg(long, default_value_t = notedex_core::search::DEFAULT_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,

    /// Shorthand for --output quiet
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = notedex_core::search::DEFAULT_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[arg(long)]
    pub json: bool,

    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Tags every exported note must carry (comma separated)
    #[arg(long, short, value_delimiter = ',', required = true)]
    pub tag: Vec<String>,

    /// Output directory
    #[arg(long, default_value = "export")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Output file
    #[arg(long, default_value = "graph.json")]
    pub out: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Reindex(args) => cmd::reindex::run(config, profile, args).await,
        Commands::Search(args) => cmd::search::run(config, profile, args),
        Commands::List(args) => cmd::list::run(config, profile, args),
        Commands::Stats(args) => cmd::stats::run(config, profile, args),
        Commands::Export(args) => cmd::export::run(config, profile, args),
        Commands::Graph(args) => cmd::graph::run(config, profile, args),
        Commands::Watch => cmd::watch::run(config, profile).await,
    }
}
