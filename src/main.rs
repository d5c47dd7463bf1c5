//! Dirstudy CLI: catalog a directory into ResearchStudy / DocumentReference NDJSON.

use anyhow::Result;
use clap::Parser;
use dirstudy::engine::arg_parser::Cli;
use dirstudy::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
