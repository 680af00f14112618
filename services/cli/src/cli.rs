use crate::demo::{run_demo, run_dispose, run_roster, DisposeArgs, RosterArgs};
use clap::{Parser, Subcommand};
use excuse_ladder::config::AppConfig;
use excuse_ladder::error::AppError;
use excuse_ladder::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Excuse Ladder",
    about = "Route employee absence excuses through the escalation ladder",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a single excuse and print the ruling and dossier as JSON
    Dispose(DisposeArgs),
    /// List the handlers of the standard ladder
    Roster(RosterArgs),
    /// Walk the implausible-then-minor scenario end to end (default command)
    Demo,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or(Command::Demo) {
        Command::Dispose(args) => run_dispose(&config, args),
        Command::Roster(args) => run_roster(&config, args),
        Command::Demo => run_demo(&config),
    }
}
