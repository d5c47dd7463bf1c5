//! Load `.dirstudy.toml` from the input directory (CLI only). Lib callers pass [`CatalogOpts`] directly.

use serde::Deserialize;
use std::path::Path;

use crate::CatalogOpts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct DirstudyToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    pattern: Option<String>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    threads: Option<usize>,
    verbose: Option<bool>,
}

/// Parse settings from TOML text.
pub fn parse_dirstudy_toml(s: &str) -> Result<DirstudyToml, toml::de::Error> {
    toml::from_str(s)
}

/// Load the settings file from `dir` if present. Returns None if missing or unparsable (parse errors are logged).
pub fn load_dirstudy_toml(dir: &Path) -> Option<DirstudyToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_dirstudy_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &DirstudyToml, opts: &mut CatalogOpts) {
    let sec = &file.settings;
    apply_file_opt!(sec, opts, pattern => pattern);
    apply_file_opt!(sec, opts, exclude => exclude);
    apply_file_opt!(sec, opts, follow_links => follow_links);
    apply_file_opt!(sec, opts, verbose => verbose);
    if let Some(n) = sec.threads {
        opts.num_threads = Some(n);
    }
}
