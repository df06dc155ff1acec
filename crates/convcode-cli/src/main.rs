//! `convcode` command-line tool
//!
//! ```text
//! convcode encode 10110
//! convcode -k 7 -g 0o171,0o133 decode 1110...
//! convcode decode --soft -- -0.9,1.1,...
//! convcode demo --message HELLO --flip 10,25,40
//! convcode ber --snr 0,1,2,3,4 --blocks 200 --format csv
//! convcode info
//! ```

mod cli;
mod commands;
mod config;
mod error;

use std::error::Error;

use clap::Parser;
use convcode_core::logging::init_logging;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let mut config = match args.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Command line overrides file values
    if let Some(k) = args.constraint_length {
        config.code.constraint_length = k;
    }
    if let Some(ref generators) = args.generators {
        config.code.generators = generators.clone();
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    config.validate()?;
    init_logging(&config.logging);
    tracing::debug!(code = %config.code, "configuration resolved");

    let stdout = std::io::stdout();
    commands::run(&args.command, &config, &mut stdout.lock())?;
    Ok(())
}
