mod cli;
mod generate;
mod logging;
mod progress;
mod run;

use std::process::ExitCode;

use clap::Parser;
use indicatif::{MultiProgress, ProgressDrawTarget};

use crate::cli::{Cli, Command};
use crate::run::Outcome;

async fn dispatch(cli: Cli) -> anyhow::Result<Outcome> {
    match cli.command {
        Some(Command::Generate { dir }) => {
            logging::init(0, None)?;
            generate::run(&dir)?;
            Ok(Outcome::Completed)
        }
        None => {
            let args = cli.download;
            let multi = (!args.no_progress).then(|| MultiProgress::with_draw_target(ProgressDrawTarget::stderr()));
            logging::init(args.verbose, multi.clone())?;
            run::download(&args, multi).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match dispatch(Cli::parse()).await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
