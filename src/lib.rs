//! Dirstudy: catalog a directory tree into a ResearchStudy and one DocumentReference per file,
//! written as newline-delimited JSON streams (`ResearchStudy.ndjson`, `DocumentReference.ndjson`).

pub mod catalog;
pub mod engine;
pub mod identity;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use catalog::Cataloger;
pub use engine::extract::{ContentExtractor, NoopExtractor};
pub use engine::mime::{MimeChain, MimeResolver};

use log::debug;
use std::path::Path;

/// Result alias used by public dirstudy API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: catalog `input_path` into `output_path` for `project_id` (`<program>-<project>`).
///
/// Writes one `ResearchStudy` line and one `DocumentReference` line per file matched by
/// `opts.pattern`. Existing streams in `output_path` are replaced, not appended to.
/// Use [`Cataloger`] to plug in a different MIME chain or a content extractor.
pub fn catalog_dir(
    project_id: &str,
    input_path: &Path,
    output_path: &Path,
    opts: &CatalogOpts,
) -> Result<CatalogSummary> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    catalog::catalog_dir_with_opts(project_id, input_path, output_path, opts)
}
