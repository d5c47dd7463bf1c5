//! File hashing utilities

use anyhow::{Context, Result};
use log::debug;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

use crate::utils::config::HashingConsts;

/// NFKD form of `path`. Different platforms store the same visible name in different
/// Unicode forms; the checksum always opens the normalized spelling first.
pub fn normalize_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().nfkd().collect::<String>())
}

/// Open the normalized path; fall back to the path as walked when the filesystem keeps the
/// name in a different form (or it is not valid UTF-8), or when the normalized spelling
/// names a different file than the walked one.
fn open_normalized(path: &Path) -> Result<File> {
    let normalized = normalize_path(path);
    if normalized.as_path() == path {
        return File::open(path).with_context(|| format!("open {} for hashing", path.display()));
    }
    match File::open(&normalized) {
        Ok(f) if is_same_file(&f, path) => Ok(f),
        Ok(_) => {
            debug!(
                "{} and {} are different files; hashing the walked path",
                normalized.display(),
                path.display()
            );
            File::open(path).with_context(|| format!("open {} for hashing", path.display()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            File::open(path).with_context(|| format!("open {} for hashing", path.display()))
        }
        Err(e) => Err(e).with_context(|| format!("open {} for hashing", normalized.display())),
    }
}

/// True if the open `file` and `path` are the same filesystem object.
#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(file: &File, path: &Path) -> bool {
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(a), Ok(b)) => a.len() == b.len() && a.modified().ok() == b.modified().ok(),
        _ => false,
    }
}

/// MD5 of everything `reader` yields, read in fixed-size chunks. Lowercase hex.
pub fn md5_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut ctx = md5::Context::new();
    let mut buffer = [0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        ctx.consume(&buffer[..n]);
    }
    Ok(format!("{:x}", ctx.compute()))
}

/// MD5 of a file's content. Memory use is one chunk regardless of file size.
pub fn md5_file(path: &Path) -> Result<String> {
    let file = open_normalized(path)?;
    md5_reader(file).with_context(|| format!("read {} for hashing", path.display()))
}
