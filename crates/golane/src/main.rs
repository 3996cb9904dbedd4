//! golane CLI binary.
//!
//! Thin host adapter: parses flags into settings, initializes tracing,
//! and hands the chosen go subcommand to the supervisor.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::Parser;
use cli::Cli;
use golane_exec::{Error, NoRetry, Supervisor};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const BANNER: &str = r"
                 __
  ___ ____  ___ / /__ ____  ___
 / _ `/ _ \/ _ `/ / _ `/ _ \/ -_)
 \_, /\___/\_,_/_/\_,_/_//_/\__/
/___/
";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !cli.hide_banner {
        println!("{BANNER}    version {}\n", env!("CARGO_PKG_VERSION"));
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Fatal error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    std::process::exit(runtime.block_on(run(cli)));
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!(
            "golane={level},golane_core={level},golane_sdk={level},golane_exec={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> i32 {
    let settings = Arc::new(cli.settings());
    let (command, tail_args) = cli.go_command();
    debug!(
        command = %command.name,
        go_version = %settings.go_version,
        store = %settings.store_folder.display(),
        "starting supervised go invocation"
    );
    let supervisor = Supervisor::new(settings);

    match supervisor.run(&command, &tail_args, &NoRetry).await {
        Ok(result) => {
            print!("{}", String::from_utf8_lossy(&result.stdout));
            0
        }
        Err(Error::NonZeroExit { code }) => code,
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            1
        }
    }
}
