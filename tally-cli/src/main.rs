use std::{path::PathBuf, process};

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use sysexits::ExitCode;
use tally_lib::{Error, Repository, repository::config::CoreConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::feedback::TracingFeedback;

mod feedback;
mod insights;
mod invoice;
mod job;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about = "Track freelance jobs and export monthly invoices")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use this database file instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Log more detail, repeat for even more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on jobs
    #[command(subcommand)]
    Job(job::Command),
    /// Show earnings insights
    Insights(insights::Args),
    /// Export invoices
    #[command(subcommand)]
    Invoice(invoice::Command),
}

fn main() -> process::ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(&cli).into()
}

fn run(cli: &Cli) -> ExitCode {
    let result = open(cli).and_then(|repo| {
        let feedback = TracingFeedback;
        match &cli.command {
            Command::Job(cmd) => job::handle(&repo, &feedback, cmd),
            Command::Insights(args) => insights::handle(&repo, &feedback, args),
            Command::Invoice(cmd) => invoice::handle(&repo, &feedback, cmd),
        }
    });

    match result {
        Ok(()) => ExitCode::Ok,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            exit_code(&e)
        }
    }
}

fn open(cli: &Cli) -> tally_lib::Result<Repository> {
    match &cli.db {
        Some(path) => Repository::open(path, CoreConfig::load()?),
        None => Repository::new(),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Logging is unavailable: {e}");
    }
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::NoSuchJob(_) | Error::Month(_) => ExitCode::Usage,
        Error::Io(_) => ExitCode::IoErr,
        Error::Config(_) => ExitCode::Config,
        Error::Entity(_) => ExitCode::DataErr,
        Error::Render(_) => ExitCode::Software,
    }
}
