use anyhow;
use clap::Parser;

use casgen::interfaces::cli::{configure_logging, run_config, write_template, Cli, Command};

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Template { name } => write_template(name),
        Command::Run {
            config,
            output,
            debug_log,
        } => {
            configure_logging(output.as_deref(), debug_log)?;
            run_config(config)
        }
    }
}
