//! Path, pattern and timestamp utilities

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Path as a string with forward slashes (pattern matching and URLs are separator-agnostic).
pub fn path_to_slash_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `file://` URL for an absolute path. The path is not percent-encoded, so names with
/// spaces, `#` or `%` give strings that are not strict RFC 8089 URIs.
pub fn file_url(abs_path: &Path) -> String {
    let s = path_to_slash_string(abs_path);
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}

/// A directory path for display, without trailing or doubled separators.
pub fn display_dir(path: &Path) -> String {
    let joined: PathBuf = path.components().collect();
    joined.display().to_string()
}

/// Match options for walk patterns: `*` stays within one path component.
pub fn walk_match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Compile a walk pattern, naming it in the error.
pub fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).with_context(|| format!("invalid glob pattern {pattern:?}"))
}

/// True if `rel` (relative to the input root) matches `pattern`.
pub fn pattern_matches(pattern: &Pattern, rel: &Path) -> bool {
    pattern.matches_with(&path_to_slash_string(rel), walk_match_options())
}

/// True if `rel` or its file name matches any exclude pattern.
pub fn is_excluded(rel: &Path, exclude: &[Pattern]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    let rel_str = path_to_slash_string(rel);
    let name = rel.file_name().map(|n| n.to_string_lossy());
    exclude.iter().any(|p| {
        p.matches(&rel_str) || name.as_deref().is_some_and(|n| p.matches(n))
    })
}

/// Returns true if the walked `path` should be considered (not root, not under `skip_dir`, not excluded).
pub fn should_include_in_walk(
    path: &Path,
    root: &Path,
    skip_dir: &Option<PathBuf>,
    exclude: &[Pattern],
) -> bool {
    if path == root {
        return false;
    }
    if let Some(skip) = skip_dir
        && path.starts_with(skip)
    {
        return false;
    }
    match path_relative_to(path, root) {
        Some(rel) => !is_excluded(&rel, exclude),
        None => false,
    }
}

/// UTC ISO-8601 with `+00:00` offset; fractional seconds as microseconds only when non-zero.
pub fn iso_timestamp(t: &DateTime<Utc>) -> String {
    let format = if t.nanosecond() / 1_000 == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    t.to_rfc3339_opts(format, false)
}

/// Convert a filesystem timestamp to UTC.
pub fn system_time_to_utc(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

/// Split `"<program>-<project>"` on the first hyphen. Both parts must be non-empty.
pub fn split_project_id(project_id: &str) -> Result<(&str, &str)> {
    match project_id.split_once('-') {
        Some((program, project)) if !program.is_empty() && !project.is_empty() => {
            Ok((program, project))
        }
        _ => anyhow::bail!(
            "project_id {:?} must have the form <program>-<project>",
            project_id
        ),
    }
}

/// Input must exist and be a directory. Returns its canonical (absolute) form.
pub fn check_input_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        anyhow::bail!("input_path {} does not exist.", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("input_path {} is not a directory.", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("canonicalize input_path {}", path.display()))
}

/// Create the output directory (and parents) if missing. Returns its canonical form.
pub fn ensure_output_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        log::info!("output_path {} does not exist, creating...", path.display());
        std::fs::create_dir_all(path)
            .with_context(|| format!("create output_path {}", path.display()))?;
    }
    path.canonicalize()
        .with_context(|| format!("canonicalize output_path {}", path.display()))
}
