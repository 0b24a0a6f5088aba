//! Command-line interface of `CASGen`.

use std::path::{Path, PathBuf};

use anyhow::{self, Context};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::interfaces::input::Input;
use crate::interfaces::InputHandle;
use crate::io::format::{casgen_output, log_macsec_begin, log_macsec_end};
use crate::io::{read_casgen_yaml, write_casgen_yaml};


const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted `CASGen` heading to the `casgen-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    casgen_output!("╭───────────────────────────────────────────────────────────────────────────────────╮");
    casgen_output!("│   ██████╗ █████╗ ███████╗ ██████╗ ███████╗███╗   ██╗                              │");
    casgen_output!("│  ██╔════╝██╔══██╗██╔════╝██╔════╝ ██╔════╝████╗  ██║                              │");
    casgen_output!("│  ██║     ███████║███████╗██║  ███╗█████╗  ██╔██╗ ██║                              │");
    casgen_output!("│  ██║     ██╔══██║╚════██║██║   ██║██╔══╝  ██║╚██╗██║                              │");
    casgen_output!("│  ╚██████╗██║  ██║███████║╚██████╔╝███████╗██║ ╚████║                              │");
    casgen_output!("│   ╚═════╝╚═╝  ╚═╝╚══════╝ ╚═════╝ ╚══════╝╚═╝  ╚═══╝                              │");
    casgen_output!("│                                                                                   │");
    casgen_output!("│  Active-space selection from natural-orbital occupation numbers   {version:>15} │");
    casgen_output!("╰───────────────────────────────────────────────────────────────────────────────────╯");
    casgen_output!("");
}

/// The command-line arguments of `CASGen`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// The actions available from the command line.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Runs the calculations specified in a YAML configuration file.
    Run {
        /// The YAML configuration file.
        #[arg(short, long)]
        config: PathBuf,

        /// The file to which the main output is written. If absent, the output is written to
        /// the console.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The file to which diagnostic messages are written.
        #[arg(long, default_value = "casgen.log")]
        debug_log: PathBuf,
    },

    /// Writes a template YAML configuration file.
    Template {
        /// The name of the template file, without its `.yml` extension.
        #[arg(short, long, default_value = "casgen_template")]
        name: PathBuf,
    },
}

/// Sets up the global logger.
///
/// Main output (the `casgen-output` target) goes to `output` if given, or to the console
/// otherwise. Everything else, including debug messages, goes to `debug_log`.
pub fn configure_logging(output: Option<&Path>, debug_log: &Path) -> Result<(), anyhow::Error> {
    let output_appender: Box<dyn Append> = if let Some(output) = output {
        Box::new(
            FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .append(false)
                .build(output)
                .with_context(|| format!("Unable to open `{}` for output.", output.display()))?,
        )
    } else {
        Box::new(
            ConsoleAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .build(),
        )
    };
    let debug_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}",
        )))
        .append(false)
        .build(debug_log)
        .with_context(|| format!("Unable to open `{}` for logging.", debug_log.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("output", output_appender))
        .appender(Appender::builder().build("debug", Box::new(debug_appender)))
        .logger(
            Logger::builder()
                .appender("output")
                .additive(false)
                .build("casgen-output", LevelFilter::Info),
        )
        .build(Root::builder().appender("debug").build(LevelFilter::Debug))?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Reads a YAML configuration file and runs the calculations it specifies.
pub fn run_config(config: &Path) -> Result<(), anyhow::Error> {
    log_heading();
    log_macsec_begin("Input");
    casgen_output!("");
    casgen_output!("Configuration file: {}", config.display());
    let inp = read_casgen_yaml::<Input, _>(config);
    if let Ok(inp) = inp.as_ref() {
        log::debug!("Parsed input: {inp:?}");
    }
    log_macsec_end("Input");
    casgen_output!("");
    inp?.handle()
}

/// Writes a template YAML configuration file containing the default parameters.
pub fn write_template(name: &Path) -> Result<(), anyhow::Error> {
    write_casgen_yaml(name, &Input::default())?;
    println!(
        "Template configuration written to {}.",
        name.with_extension("yml").display()
    );
    Ok(())
}
