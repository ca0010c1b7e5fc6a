#[macro_use]
extern crate log;

use std::fs::OpenOptions;

use anyhow::Error;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, TermLogger, TerminalMode, WriteLogger,
};

use crate::program::Program;

mod program;
mod unsplash;

/// Name of the file the write logger appends to.
const LOG_NAME: &str = "unsplash_downloader.log";

fn main() -> Result<(), Error> {
    initialize_logger();

    let program = Program::new();
    program.run()
}

/// Initializes the logger with preset filtering: info and up on the
/// terminal, everything into the log file.
fn initialize_logger() {
    let mut config = ConfigBuilder::new();
    config.add_filter_allow_str("unsplash_downloader");

    let log_file = OpenOptions::new().create(true).append(true).open(LOG_NAME);
    let log_file = match log_file {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open {LOG_NAME}: {err}. Logging to terminal only.");
            let _ = TermLogger::init(
                LevelFilter::Info,
                Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            );
            return;
        }
    };

    if CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::max(), config.build(), log_file),
    ])
    .is_err()
    {
        eprintln!("Failed to initialize combined logger. Falling back to terminal-only logging.");
        let _ = TermLogger::init(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        );
    }
}
