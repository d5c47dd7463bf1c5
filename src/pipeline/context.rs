//! Pipeline context: shared data passed into the walk thread and the metadata workers.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, bounded};
use glob::Pattern;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::engine::extract::ContentExtractor;
use crate::engine::mime::MimeChain;
use crate::{DocumentReference, ResearchStudy};

/// What the walk thread needs: where to walk, what to match and what to leave out.
pub struct PipelineContext {
    /// Canonical input directory.
    pub root: PathBuf,
    /// Output directory when it lies inside the input tree; nothing under it is cataloged.
    pub skip_dir: Option<PathBuf>,
    /// Individual files never cataloged (the run's own output streams).
    pub skip_files: Vec<PathBuf>,
    pub pattern: Pattern,
    pub exclude: Vec<Pattern>,
    pub follow_links: bool,
}

/// What each metadata worker needs to turn a path into a record.
#[derive(Clone)]
pub struct WorkerContext {
    pub study: Arc<ResearchStudy>,
    pub mime: Arc<MimeChain>,
    pub extractor: Arc<dyn ContentExtractor>,
}

/// A built record plus what happened on the non-fatal paths while building it.
#[derive(Clone, Debug)]
pub struct CatalogedFile {
    pub document: DocumentReference,
    pub extraction_failed: bool,
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): receive records and join when done.
/// The walk thread returns the number of paths it sent, or the walk error that stopped it.
pub struct PipelineHandles {
    pub doc_rx: Receiver<Result<CatalogedFile>>,
    pub walk_handle: JoinHandle<Result<usize>>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

/// Channels for the pipeline. Walk thread gets path_tx; workers get path_rx and doc_tx.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub doc_tx: Sender<Result<CatalogedFile>>,
    pub doc_rx: Receiver<Result<CatalogedFile>>,
}

pub fn create_pipeline_channels(channel_cap: usize) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(channel_cap);
    let (doc_tx, doc_rx) = bounded::<Result<CatalogedFile>>(channel_cap);
    PipelineChannels {
        path_tx,
        path_rx,
        doc_tx,
        doc_rx,
    }
}
