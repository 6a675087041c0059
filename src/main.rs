use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

mod error;
mod kubernetes;

/// Finds and removes Kubernetes namespaces that no longer run anything.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    group: Groups,
}

#[derive(Subcommand, Debug)]
enum Groups {
    Kubernetes {
        #[command(subcommand)]
        command: kubernetes::Commands,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.group {
        Groups::Kubernetes { command } => match command {
            kubernetes::Commands::NsClean(args) => {
                configure_logger(args.verbosity);
                kubernetes::ns_clean::handle(args)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn configure_logger(verbosity: u8) {
    let mut clog = colog::default_builder();
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    clog.filter(None, log_level);
    clog.init();
}
