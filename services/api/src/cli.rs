use crate::demo::{run_demo, run_rank, DemoArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wardrobe_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Wardrobe Outfit Engine",
    about = "Generate, score, and save outfits from a wardrobe on the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a scripted outfit session and print each step
    Demo(DemoArgs),
    /// Print per-category scores for a style
    Rank(RankArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Wardrobe export (CSV or JSON) to seed the item store with
    #[arg(long)]
    pub(crate) wardrobe: Option<PathBuf>,
    /// Saved-outfit JSON document to seed the outfit library with
    #[arg(long)]
    pub(crate) saved: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Rank(args) => run_rank(args),
    }
}
