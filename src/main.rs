use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use finder_rs::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    debug!("arguments: {cli:?}");
    let start_time = Instant::now();

    let finder = cli.build_finder().context("invalid finder configuration")?;

    let mut count = 0usize;
    for entry in &finder {
        let entry = entry.context("search failed")?;
        println!("{}", entry.path().display());
        count += 1;
    }

    info!("{count} entries in {:.2?}", start_time.elapsed());
    Ok(())
}
