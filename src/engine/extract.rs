//! Content-specific extraction hook, run once per cataloged file.

use anyhow::Result;
use std::path::Path;

use crate::DocumentReference;

/// Derives extra information from a file's content. Runs after the file's record is built;
/// an `Err` is logged and counted but never stops the record from being written.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, path: &Path, document: &DocumentReference) -> Result<()>;
}

/// Default extractor: does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopExtractor;

impl ContentExtractor for NoopExtractor {
    fn extract(&self, _path: &Path, _document: &DocumentReference) -> Result<()> {
        Ok(())
    }
}
