//! Application configuration constants.
//! Identifiers, output naming and I/O sizes in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Name of the optional settings file looked up in the input directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Identity ----

/// Organizational domain the identifier namespace is derived from (uuid3 under the DNS namespace).
pub const NAMESPACE_DOMAIN: &str = "aced-ipd.org";

/// Separator between study id and file name when deriving a document id.
pub const DOCUMENT_ID_SEPARATOR: &str = "::";

// ---- Records ----

/// Extension URL carrying the MD5 hex digest on an attachment.
pub const MD5_EXTENSION_URL: &str = "http://aced-idp.org/fhir/StructureDefinition/md5";

/// Default glob pattern: every entry, recursively.
pub const DEFAULT_PATTERN: &str = "**/*";

/// File extension for every output stream (`<ResourceType>.ndjson`).
pub const STREAM_EXTENSION: &str = "ndjson";

// ---- Hashing / sniffing ----

/// Hashing I/O sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Chunk size for streamed MD5 (bytes). 4 KiB keeps memory bounded for any file size.
    pub const HASH_READ_CHUNK_SIZE: usize = 4 * 1024;
}

/// Content sniffing limits.
pub struct SniffConsts;

impl SniffConsts {
    /// Bytes read from the (possibly decompressed) head of a file for magic-number checks.
    pub const HEADER_LEN: usize = 8 * 1024;
    /// Minimum share of printable characters for a header to count as text.
    pub const TEXT_PRINTABLE_RATIO: f64 = 0.95;
}

// ---- Worker threads ----

/// Thread limits for metadata workers.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Upper bound; hashing is I/O bound so more workers rarely help.
    pub max: usize,
}

impl WorkerThreadLimits {
    pub const MAX_THREADS: usize = 8;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            max: Self::MAX_THREADS,
        }
    }

    /// Worker count: explicit override (at least 1) or available threads capped at `max`.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) => n.max(1),
            None => self.all_threads.clamp(1, self.max),
        }
    }
}

// ---- Streaming channel cap ----

/// Capacity of the path and record channels between walk, workers and writer.
pub const STREAMING_CHANNEL_CAP: usize = 10_000;
