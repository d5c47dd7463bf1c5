pub mod config;
pub mod dirstudy_toml;
pub mod logger;

pub use config::*;
pub use dirstudy_toml::{DirstudyToml, apply_file_to_opts, load_dirstudy_toml, parse_dirstudy_toml};
pub use logger::setup_logging;
