//! Thin binary entry point: initializes logging, parses arguments, and
//! maps [`taskqueue_cli::run`]'s outcome to stdout/stderr and an exit code.

use clap::Parser;
use taskqueue_cli::{print_value, run, Cli};

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    tracing::debug!(db = ?cli.db, json = json_mode, "invoking taskqueue command");

    match run(cli) {
        Ok(value) => {
            print_value(&value, json_mode);
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
