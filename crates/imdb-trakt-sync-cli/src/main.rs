use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use commands::{config, diff, fetch, sync, RunContext};
use media_sync_models::{MediaKind, SyncError};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "imdb-trakt-sync")]
#[command(about = "One-way sync of an IMDb watchlist, ratings and watch history into Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file (defaults to $IMDB_TRAKT_SYNC_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every HTTP request and response body
    #[arg(long, global = true)]
    trace: bool,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Movie or show selector for per-kind commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(alias = "movies")]
    Movie,
    #[value(alias = "shows")]
    Show,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Show => MediaKind::Show,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage: watchlist, ratings, then history (default)
    #[command(long_about = "Bring Trakt in line with IMDb. Runs watchlist-movie, watchlist-show, ratings-movie, ratings-show and history in that order and stops at the first failing stage.")]
    Sync {
        /// Compute and log every change without writing to Trakt
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Show the watchlist changes for one kind
    DiffWatchlist {
        #[arg(value_enum)]
        kind: KindArg,

        /// Write the changes to Trakt instead of only showing them
        #[arg(long, action = ArgAction::SetTrue)]
        apply: bool,
    },
    /// Show the ratings changes for one kind
    DiffRatings {
        #[arg(value_enum)]
        kind: KindArg,

        /// Write the changes to Trakt instead of only showing them
        #[arg(long, action = ArgAction::SetTrue)]
        apply: bool,
    },
    /// Show the watch history entries missing from Trakt
    DiffHistory {
        /// Write the changes to Trakt instead of only showing them
        #[arg(long, action = ArgAction::SetTrue)]
        apply: bool,
    },
    /// Print the IMDb watchlist export for one kind
    FetchImdbWatchlist {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print the IMDb ratings export for one kind
    FetchImdbRatings {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print the watch history derived from IMDb movie ratings
    FetchImdbHistory,
    /// Print the Trakt watchlist for one kind
    FetchTraktWatchlist {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print the Trakt ratings for one kind
    FetchTraktRatings {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print the Trakt movie watch history
    FetchTraktHistory,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration with secrets masked
    Show,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Usage errors exit 1; --help and --version exit 0
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(if e.use_stderr() { 1 } else { 0 });
    });

    let ctx = RunContext::new(cli.config.clone(), cli.trace);
    let trace_http = logging::http_trace_requested(cli.trace, &ctx.config_file(), |key| std::env::var(key).ok());
    logging::init_logging(cli.verbose, cli.quiet, trace_http, cli.log_file.clone())?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command.unwrap_or(Commands::Sync { dry_run: false }) {
        Commands::Sync { dry_run } => sync::run_sync(&ctx, dry_run, &output).await,
        Commands::DiffWatchlist { kind, apply } => diff::run_diff_watchlist(&ctx, kind.into(), apply, &output).await,
        Commands::DiffRatings { kind, apply } => diff::run_diff_ratings(&ctx, kind.into(), apply, &output).await,
        Commands::DiffHistory { apply } => diff::run_diff_history(&ctx, apply, &output).await,
        Commands::FetchImdbWatchlist { kind } => fetch::run_fetch(&ctx, fetch::FetchTarget::ImdbWatchlist(kind.into()), &output).await,
        Commands::FetchImdbRatings { kind } => fetch::run_fetch(&ctx, fetch::FetchTarget::ImdbRatings(kind.into()), &output).await,
        Commands::FetchImdbHistory => fetch::run_fetch(&ctx, fetch::FetchTarget::ImdbHistory, &output).await,
        Commands::FetchTraktWatchlist { kind } => fetch::run_fetch(&ctx, fetch::FetchTarget::TraktWatchlist(kind.into()), &output).await,
        Commands::FetchTraktRatings { kind } => fetch::run_fetch(&ctx, fetch::FetchTarget::TraktRatings(kind.into()), &output).await,
        Commands::FetchTraktHistory => fetch::run_fetch(&ctx, fetch::FetchTarget::TraktHistory, &output).await,
        Commands::Config { cmd } => config::run_config(&ctx, cmd, &output),
    };

    if let Err(report) = &result {
        if let Some(SyncError::Configuration(_)) = report.downcast_ref::<SyncError>() {
            eprintln!("{}", Cli::command().render_usage());
        }
    }
    result
}
