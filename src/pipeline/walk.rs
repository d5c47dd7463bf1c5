//! Walk loop: consumes an iterator of Ok(path) / Err, sends matched file paths to path_tx.

use anyhow::Result;
use crossbeam_channel::Sender;
use log::debug;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::tools::{path_relative_to, pattern_matches, should_include_in_walk};

use super::context::PipelineContext;

/// One result from a directory walk: either a path to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.into_path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    Box::new(
        walkdir::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

/// True if `path` is a file the pattern selects. Directories are never selected.
pub fn selects(ctx: &PipelineContext, path: &Path) -> bool {
    if !should_include_in_walk(path, &ctx.root, &ctx.skip_dir, &ctx.exclude) {
        return false;
    }
    if ctx.skip_files.iter().any(|f| f == path) {
        return false;
    }
    let matched = path_relative_to(path, &ctx.root)
        .is_some_and(|rel| pattern_matches(&ctx.pattern, &rel));
    matched && !path.is_dir()
}

pub fn spawn_walk_thread(path_tx: Sender<PathBuf>, ctx: PipelineContext) -> JoinHandle<Result<usize>> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        run_walk_loop(path_tx, &ctx, iter)
    })
}

/// Consume `iter`, send every selected path to `path_tx`. Any walk error is fatal and
/// returned. Stops early (without error) when the receiving side has gone away.
/// Drops `path_tx` when done so workers see the channel close.
pub fn run_walk_loop<I>(path_tx: Sender<PathBuf>, ctx: &PipelineContext, iter: I) -> Result<usize>
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        match outcome {
            WalkOutcome::Ok(path) => {
                if !selects(ctx, &path) {
                    continue;
                }
                if path_tx.send(path).is_err() {
                    debug!("walk: receiver closed after {} paths", count);
                    break;
                }
                count += 1;
            }
            WalkOutcome::Err { msg, path } => {
                return Err(match path {
                    Some(p) => anyhow::anyhow!("walk {}: {}", p.display(), msg),
                    None => anyhow::anyhow!("walk: {}", msg),
                });
            }
        }
    }
    drop(path_tx);
    Ok(count)
}
