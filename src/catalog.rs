//! Directory cataloging: one ResearchStudy plus one DocumentReference per matched file.

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::engine::emitter::Emitter;
use crate::engine::extract::{ContentExtractor, NoopExtractor};
use crate::engine::mime::MimeChain;
use crate::engine::progress::{ProgressBar, create_counter, finish_bar, update_progress_bar};
use crate::engine::tools::{
    check_input_dir, compile_pattern, display_dir, ensure_output_dir, split_project_id,
};
use crate::pipeline::{
    CatalogedFile, PipelineContext, PipelineHandles, WorkerContext, run_pipeline,
    shutdown_pipeline_handles,
};
use crate::{CatalogOpts, CatalogSummary, DocumentReference, Resource, ResearchStudy};

/// How often the writer wakes up to check for cancellation while waiting on records.
const CANCEL_POLL: Duration = Duration::from_millis(200);

/// Counts kept by the writer while draining records.
#[derive(Default)]
struct WriteCounts {
    documents: usize,
    unresolved_mime: usize,
    extraction_failures: usize,
}

/// Runs a catalog pass. Holds the pluggable parts (MIME chain, content extractor) and an
/// optional cancel flag; everything else comes from [`CatalogOpts`].
pub struct Cataloger {
    opts: CatalogOpts,
    mime: Arc<MimeChain>,
    extractor: Arc<dyn ContentExtractor>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Cataloger {
    pub fn new(opts: CatalogOpts) -> Self {
        Self {
            opts,
            mime: Arc::new(MimeChain::default()),
            extractor: Arc::new(NoopExtractor),
            cancel: None,
        }
    }

    pub fn with_mime_chain(mut self, mime: MimeChain) -> Self {
        self.mime = Arc::new(mime);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// When the flag turns true, the run stops, closes its streams and returns an error.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Catalog `input_path` into NDJSON streams under `output_path`.
    ///
    /// `project_id` is `<program>-<project>`; the project part names the study.
    /// Input problems and a malformed `project_id` or pattern fail before anything is written.
    pub fn run(
        &self,
        project_id: &str,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<CatalogSummary> {
        let root = check_input_dir(input_path)?;
        let (_program, project) = split_project_id(project_id)?;
        let pattern = compile_pattern(&self.opts.pattern)?;
        let exclude = self
            .opts
            .exclude
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;
        let output = ensure_output_dir(output_path)?;

        let study = ResearchStudy::new(
            project,
            format!(
                "A study with files from {}/{}",
                display_dir(input_path),
                self.opts.pattern
            ),
        );
        debug!("study {} ({})", study.title, study.id);

        let mut emitter = Emitter::new(&output);
        let ctx = PipelineContext {
            // Prune the output dir only when it is nested under the input.
            skip_dir: (output != root && output.starts_with(&root)).then(|| output.clone()),
            skip_files: vec![
                emitter.stream_path(ResearchStudy::RESOURCE_TYPE),
                emitter.stream_path(DocumentReference::RESOURCE_TYPE),
            ],
            root,
            pattern,
            exclude,
            follow_links: self.opts.follow_links,
        };

        let outcome = self.emit_all(&mut emitter, &study, ctx);
        let stale_streams = emitter.untouched_streams(&[
            ResearchStudy::RESOURCE_TYPE,
            DocumentReference::RESOURCE_TYPE,
        ]);
        let closed = emitter.close();
        let counts = outcome?;
        let streams = closed?;

        for path in &stale_streams {
            warn!(
                "{} is from an earlier run; nothing in this run was written to it",
                path.display()
            );
        }

        if counts.unresolved_mime > 0 {
            warn!(
                "{} file(s) cataloged without a content type",
                counts.unresolved_mime
            );
        }
        Ok(CatalogSummary {
            study_id: study.id,
            documents: counts.documents,
            unresolved_mime: counts.unresolved_mime,
            extraction_failures: counts.extraction_failures,
            streams,
            stale_streams,
        })
    }

    /// Emit the study, then every document the pipeline produces. Single writer for all streams.
    fn emit_all(
        &self,
        emitter: &mut Emitter,
        study: &ResearchStudy,
        ctx: PipelineContext,
    ) -> Result<WriteCounts> {
        emitter.emit(study)?;

        let worker_ctx = WorkerContext {
            study: Arc::new(study.clone()),
            mime: Arc::clone(&self.mime),
            extractor: Arc::clone(&self.extractor),
        };
        let PipelineHandles {
            doc_rx,
            walk_handle,
            worker_handles,
        } = run_pipeline(ctx, &worker_ctx, self.opts.num_threads);

        let bar = self.opts.verbose.then(|| create_counter("Cataloging"));
        let written = self.write_documents(emitter, &doc_rx, bar.as_ref());
        if let Some(bar) = &bar {
            finish_bar(bar);
        }
        // Unblock workers and walk before joining.
        drop(doc_rx);
        let joined = shutdown_pipeline_handles(walk_handle, worker_handles);

        let counts = written?;
        let matched = joined?;
        debug!("walk matched {} file(s)", matched);
        Ok(counts)
    }

    fn write_documents(
        &self,
        emitter: &mut Emitter,
        doc_rx: &Receiver<Result<CatalogedFile>>,
        bar: Option<&ProgressBar>,
    ) -> Result<WriteCounts> {
        let mut counts = WriteCounts::default();
        loop {
            let item = match doc_rx.recv_timeout(CANCEL_POLL) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => {
                    self.check_cancelled()?;
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };
            let file = item?;
            let attachment = file.document.content.first().map(|c| &c.attachment);
            if attachment.is_none_or(|a| a.content_type.is_none()) {
                counts.unresolved_mime += 1;
            }
            if file.extraction_failed {
                counts.extraction_failures += 1;
            }
            emitter.emit(&file.document)?;
            counts.documents += 1;
            if let Some(bar) = bar {
                update_progress_bar(bar, 1);
            }
            self.check_cancelled()?;
        }
        Ok(counts)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
        {
            log::info!("Cataloging cancelled (Ctrl+C); closing output streams...");
            anyhow::bail!("cataloging cancelled by user; output streams are partial");
        }
        Ok(())
    }
}

/// Catalog with default MIME resolution and no content extraction.
pub fn catalog_dir_with_opts(
    project_id: &str,
    input_path: &Path,
    output_path: &Path,
    opts: &CatalogOpts,
) -> Result<CatalogSummary> {
    Cataloger::new(opts.clone()).run(project_id, input_path, output_path)
}

