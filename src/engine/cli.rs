//! CLI command handler: settings file, then flags, then one catalog run.

use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::CatalogOpts;
use crate::catalog::Cataloger;
use crate::engine::arg_parser::Cli;
use crate::utils::{apply_file_to_opts, load_dirstudy_toml, setup_logging};

/// Build opts: defaults, then `.dirstudy.toml` in the input directory, then CLI flags.
pub fn setup_opts(cli: &Cli) -> CatalogOpts {
    let mut opts = CatalogOpts::default();
    if let Some(file) = load_dirstudy_toml(&cli.input_path) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref p) = cli.pattern {
        opts.pattern = p.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if cli.threads.is_some() {
        opts.num_threads = cli.threads;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts
}

/// Run one catalog pass. Ctrl+C stops the run after closing the output streams.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    debug!("{:#?}", opts);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let summary = Cataloger::new(opts)
        .with_cancel_flag(cancel_requested)
        .run(&cli.project_id, &cli.input_path, &cli.output_path)?;
    debug!(
        "study {}: {} document(s), {} without content type, {} extraction failure(s)",
        summary.study_id, summary.documents, summary.unresolved_mime, summary.extraction_failures
    );
    Ok(())
}
