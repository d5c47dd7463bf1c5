//! MIME type resolution: an ordered chain of resolvers, first answer wins.
//!
//! The default chain looks at the file name extension, then sniffs the header bytes
//! (gzip content is unwrapped first). A file nothing resolves gets no type; that is not an error.

use flate2::read::GzDecoder;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::utils::config::SniffConsts;

/// One strategy in the MIME chain.
pub trait MimeResolver: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, path: &Path) -> Option<String>;
}

/// Lookup by file name extension.
pub struct ExtensionLookup;

impl MimeResolver for ExtensionLookup {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn resolve(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path).first_raw().map(String::from)
    }
}

/// Magic-number and text detection over the first bytes of the content.
pub struct ContentSniffer;

impl MimeResolver for ContentSniffer {
    fn name(&self) -> &'static str {
        "content"
    }

    fn resolve(&self, path: &Path) -> Option<String> {
        match read_header(path) {
            Ok(header) => Some(sniff_bytes(&header).to_string()),
            Err(e) => {
                debug!("sniff {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Read up to [`SniffConsts::HEADER_LEN`] bytes; when the content is gzip, read from the decompressed stream instead.
fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let limit = SniffConsts::HEADER_LEN as u64;
    let mut raw = Vec::with_capacity(SniffConsts::HEADER_LEN);
    File::open(path)?.take(limit).read_to_end(&mut raw)?;
    if !is_gzip(&raw) {
        return Ok(raw);
    }
    let mut inner = Vec::with_capacity(SniffConsts::HEADER_LEN);
    let decoder = GzDecoder::new(File::open(path)?);
    match decoder.take(limit).read_to_end(&mut inner) {
        Ok(_) => Ok(inner),
        Err(e) => {
            debug!("gunzip {}: {}", path.display(), e);
            Ok(raw)
        }
    }
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x1F, 0x8B])
}

/// Detect a MIME type from header bytes. Always answers; unknown binary is `application/octet-stream`.
pub fn sniff_bytes(bytes: &[u8]) -> &'static str {
    if bytes.is_empty() {
        return "inode/x-empty";
    }
    match bytes {
        [b'%', b'P', b'D', b'F', ..] => return "application/pdf",
        [0x89, b'P', b'N', b'G', ..] => return "image/png",
        [0xFF, 0xD8, 0xFF, ..] => return "image/jpeg",
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => return "image/gif",
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => return "image/tiff",
        [b'P', b'K', 0x03, 0x04, ..] => return "application/zip",
        [0x1F, 0x8B, ..] => return "application/gzip",
        [b'B', b'Z', b'h', ..] => return "application/x-bzip2",
        [0xFD, b'7', b'z', b'X', b'Z', 0x00, ..] => return "application/x-xz",
        [0x7F, b'E', b'L', b'F', ..] => return "application/x-executable",
        [b'%', b'!', b'P', b'S', ..] => return "application/postscript",
        [b'{', b'\\', b'r', b't', b'f', ..] => return "text/rtf",
        _ => {}
    }
    if bytes.len() >= 12 && bytes[..4] == *b"RIFF" && bytes[8..12] == *b"WEBP" {
        return "image/webp";
    }
    if bytes.len() > 262 && bytes[257..262] == *b"ustar" {
        return "application/x-tar";
    }
    match text_prefix(bytes) {
        Some(text) => classify_text(text),
        None => "application/octet-stream",
    }
}

/// The header as UTF-8 text if it looks like text. A multi-byte char cut at the read limit is ignored.
fn text_prefix(bytes: &[u8]) -> Option<&str> {
    let text = match std::str::from_utf8(bytes) {
        Ok(t) => t,
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&bytes[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };
    let total = text.chars().count();
    if total == 0 {
        return None;
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    (printable as f64 / total as f64 >= SniffConsts::TEXT_PRINTABLE_RATIO).then_some(text)
}

fn classify_text(text: &str) -> &'static str {
    let head = text.trim_start_matches('\u{feff}').trim_start();
    let lower = head
        .get(..head.len().min(64))
        .unwrap_or(head)
        .to_ascii_lowercase();
    if lower.starts_with("<?xml") {
        "text/xml"
    } else if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        "text/html"
    } else {
        "text/plain"
    }
}

/// Ordered resolvers; [`MimeChain::resolve`] returns the first answer.
pub struct MimeChain {
    resolvers: Vec<Box<dyn MimeResolver>>,
}

impl Default for MimeChain {
    fn default() -> Self {
        Self::new(vec![Box::new(ExtensionLookup), Box::new(ContentSniffer)])
    }
}

impl MimeChain {
    pub fn new(resolvers: Vec<Box<dyn MimeResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn resolve(&self, path: &Path) -> Option<String> {
        self.resolvers.iter().find_map(|r| {
            let mime = r.resolve(path)?;
            debug!("{} -> {} ({})", path.display(), mime, r.name());
            Some(mime)
        })
    }
}
