use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::warn;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::hashing::md5_file;
use crate::engine::mime::MimeChain;
use crate::engine::tools::system_time_to_utc;
use crate::{DocumentReference, FileMeta};

use super::context::{CatalogedFile, WorkerContext};

/// Stat, resolve MIME and hash a single file.
pub fn read_file_meta(path: &Path, mime: &MimeChain) -> Result<FileMeta> {
    let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    let modified = meta
        .modified()
        .with_context(|| format!("read modification time of {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let md5 = md5_file(path)?;
    Ok(FileMeta {
        path: path.to_path_buf(),
        file_name,
        size: meta.len(),
        modified: system_time_to_utc(modified),
        mime: mime.resolve(path),
        md5,
    })
}

/// Turn one matched path into its record, then run the content extractor on it.
pub fn catalog_file(path: &Path, ctx: &WorkerContext) -> Result<CatalogedFile> {
    let file = read_file_meta(path, &ctx.mime)?;
    let document = DocumentReference::new(&ctx.study, &file);
    let extraction_failed = match ctx.extractor.extract(path, &document) {
        Ok(()) => false,
        Err(e) => {
            warn!("extract {}: {:#}", path.display(), e);
            true
        }
    };
    Ok(CatalogedFile {
        document,
        extraction_failed,
    })
}

/// Single metadata worker: read paths from path_rx, send records (or the error) on doc_tx.
fn metadata_worker_loop(
    path_rx: Receiver<PathBuf>,
    doc_tx: Sender<Result<CatalogedFile>>,
    ctx: WorkerContext,
) {
    while let Ok(path) = path_rx.recv() {
        let result = catalog_file(&path, &ctx);
        let failed = result.is_err();
        if doc_tx.send(result).is_err() || failed {
            break;
        }
    }
}

/// Spawn metadata workers. Caller must drop its own doc_tx after this so the channel closes when workers exit.
pub fn spawn_metadata_workers(
    path_rx: Receiver<PathBuf>,
    doc_tx: &Sender<Result<CatalogedFile>>,
    ctx: &WorkerContext,
    num_threads: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_threads)
        .map(|_| {
            let path_rx = path_rx.clone();
            let doc_tx = doc_tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || metadata_worker_loop(path_rx, doc_tx, ctx))
        })
        .collect()
}
