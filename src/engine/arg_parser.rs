use clap::Parser;
use std::path::PathBuf;

/// Catalog a directory into a ResearchStudy and DocumentReference NDJSON streams.
#[derive(Clone, Debug, Parser)]
#[command(name = "dirstudy")]
#[command(about = "Transform ResearchStudy, DocumentReference from matching files in input path.")]
pub struct Cli {
    /// Program-project, e.g. `aced-test`. The project part names the study.
    #[arg(long, alias = "project_id")]
    pub project_id: String,

    /// Read files from this path.
    #[arg(long, alias = "input_path")]
    pub input_path: PathBuf,

    /// Write NDJSON resources to this path (created if missing).
    #[arg(long, alias = "output_path")]
    pub output_path: PathBuf,

    /// File names to match, relative to the input path. Default: `**/*`.
    #[arg(long)]
    pub pattern: Option<String>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Metadata worker threads. Use 1 to emit records in walk order.
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
