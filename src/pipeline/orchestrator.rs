use anyhow::Result;
use log::debug;

use crate::utils::config::{STREAMING_CHANNEL_CAP, WorkerThreadLimits};

use super::context::{PipelineContext, PipelineHandles, WorkerContext, create_pipeline_channels};
use super::metadata::spawn_metadata_workers;
use super::walk::spawn_walk_thread;

/// Start the walk + metadata pipeline. Caller receives from `doc_rx` (single writer) and
/// must join the handles with [`shutdown_pipeline_handles`] when done.
/// Walk → path channel → workers (stat, MIME, MD5) → record channel → caller.
pub fn run_pipeline(
    ctx: PipelineContext,
    worker_ctx: &WorkerContext,
    num_threads: Option<usize>,
) -> PipelineHandles {
    let num_threads = WorkerThreadLimits::current().resolve(num_threads);
    debug!(
        "Walking {} with {} metadata worker(s)",
        ctx.root.display(),
        num_threads
    );

    let channels = create_pipeline_channels(STREAMING_CHANNEL_CAP);
    let walk_handle = spawn_walk_thread(channels.path_tx, ctx);
    let worker_handles =
        spawn_metadata_workers(channels.path_rx, &channels.doc_tx, worker_ctx, num_threads);

    // Dropping the last sender closes the channel once workers exit.
    drop(channels.doc_tx);

    PipelineHandles {
        doc_rx: channels.doc_rx,
        walk_handle,
        worker_handles,
    }
}

/// Join walk and worker threads. Returns the walk's path count, or the walk error.
/// Drop the record receiver first when stopping early so blocked threads can exit.
pub fn shutdown_pipeline_handles(
    walk_handle: std::thread::JoinHandle<Result<usize>>,
    worker_handles: Vec<std::thread::JoinHandle<()>>,
) -> Result<usize> {
    let walked = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    for h in worker_handles {
        h.join()
            .map_err(|_| anyhow::anyhow!("metadata worker panicked"))?;
    }
    walked
}
