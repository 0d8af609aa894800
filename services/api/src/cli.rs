use crate::demo::{run_demo, run_verify, DemoArgs, VerifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mealpass::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Canteen Meal Pass",
    about = "Run and demonstrate the canteen meal verification service from the command line",
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
    /// Check one employee against a meal session and print the verdict
    Verify(VerifyArgs),
    /// Run a seeded end-to-end walkthrough of the verification workflow
    Demo(DemoArgs),
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
        Command::Verify(args) => run_verify(args),
        Command::Demo(args) => run_demo(args),
    }
}
