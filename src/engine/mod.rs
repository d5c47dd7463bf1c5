//! Engine module: CLI, hashing, MIME resolution, extraction, output streams

pub mod arg_parser;
pub mod cli;
pub mod emitter;
pub mod extract;
pub mod hashing;
pub mod mime;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts};
pub use emitter::Emitter;
pub use hashing::{md5_file, md5_reader, normalize_path};
pub use mime::{ContentSniffer, ExtensionLookup, sniff_bytes};
pub use tools::{
    display_dir, file_url, is_excluded, iso_timestamp, path_relative_to, pattern_matches,
    split_project_id,
};
