//! NDJSON output streams, one per resource type, owned by a single writer.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Resource;
use crate::utils::config::STREAM_EXTENSION;

struct Stream {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// Open streams keyed by resource type. A stream is created (truncating any previous file)
/// on the first record of its type and stays open until [`Emitter::close`].
/// Dropping without `close` still flushes on a best-effort basis.
pub struct Emitter {
    output_dir: PathBuf,
    streams: HashMap<&'static str, Stream>,
    /// Resource types in the order their streams were opened.
    opened: Vec<&'static str>,
}

impl Emitter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            streams: HashMap::new(),
            opened: Vec::new(),
        }
    }

    /// Path the stream for `resource_type` is (or would be) written to.
    pub fn stream_path(&self, resource_type: &str) -> PathBuf {
        self.output_dir
            .join(format!("{resource_type}.{STREAM_EXTENSION}"))
    }

    fn stream(&mut self, resource_type: &'static str) -> Result<&mut Stream> {
        if !self.streams.contains_key(resource_type) {
            let path = self.stream_path(resource_type);
            let file = File::create(&path)
                .with_context(|| format!("open output stream {}", path.display()))?;
            self.streams.insert(
                resource_type,
                Stream {
                    path,
                    writer: BufWriter::new(file),
                },
            );
            self.opened.push(resource_type);
        }
        self.streams
            .get_mut(resource_type)
            .context("output stream missing after open")
    }

    /// Existing files for `resource_types` whose stream was never opened in this run.
    pub fn untouched_streams(&self, resource_types: &[&str]) -> Vec<PathBuf> {
        resource_types
            .iter()
            .filter(|t| !self.streams.contains_key(**t))
            .map(|t| self.stream_path(t))
            .filter(|p| p.is_file())
            .collect()
    }

    /// Append `record` as one JSON line to its type's stream.
    pub fn emit<R: Resource>(&mut self, record: &R) -> Result<()> {
        let stream = self.stream(R::RESOURCE_TYPE)?;
        serde_json::to_writer(&mut stream.writer, record)
            .with_context(|| format!("write record to {}", stream.path.display()))?;
        stream
            .writer
            .write_all(b"\n")
            .with_context(|| format!("write record to {}", stream.path.display()))?;
        Ok(())
    }

    /// Flush and close every open stream exactly once. Returns their paths in opening order.
    pub fn close(mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.opened.len());
        let mut first_err = None;
        for resource_type in std::mem::take(&mut self.opened) {
            let Some(mut stream) = self.streams.remove(resource_type) else {
                continue;
            };
            match stream.writer.flush() {
                Ok(()) => {
                    log::info!("wrote {}", stream.path.display());
                    written.push(stream.path);
                }
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(anyhow::Error::new(e).context(format!(
                            "close output stream {}",
                            stream.path.display()
                        )));
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }
}
