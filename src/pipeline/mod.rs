//! Pipeline components: context, walk loop, metadata workers, orchestration.

pub mod context;
pub mod metadata;
pub mod orchestrator;
pub mod walk;

pub use context::{
    CatalogedFile, PipelineChannels, PipelineContext, PipelineHandles, WorkerContext,
    create_pipeline_channels,
};
pub use metadata::{catalog_file, read_file_meta, spawn_metadata_workers};
pub use orchestrator::{run_pipeline, shutdown_pipeline_handles};
pub use walk::{WalkOutcome, run_walk_loop, selects, spawn_walk_thread, to_outcome_walkdir};
