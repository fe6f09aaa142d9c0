use crate::search::{run_search, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use oceanvillas::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Ocean Villas availability",
    about = "Serve or query live Hostaway availability for the Ocean Villas portfolio",
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
    /// Run one availability search and print the result
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Search(args) => run_search(args).await,
    }
}
