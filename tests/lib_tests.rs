use chrono::{TimeZone, Utc};
use dirstudy::engine::emitter::Emitter;
use dirstudy::engine::tools::{compile_pattern, should_include_in_walk};
use dirstudy::engine::{
    ContentSniffer, ExtensionLookup, display_dir, file_url, is_excluded, iso_timestamp, md5_file, md5_reader,
    normalize_path, path_relative_to, pattern_matches, sniff_bytes, split_project_id,
};
use dirstudy::utils::{apply_file_to_opts, parse_dirstudy_toml};
use dirstudy::{CatalogOpts, MimeChain, MimeResolver, ResearchStudy};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

// --- path_relative_to / file_url ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_file_url_absolute_path() {
    assert_eq!(
        file_url(Path::new("/data/fixtures/file-1.txt")),
        "file:///data/fixtures/file-1.txt"
    );
}

#[test]
fn test_file_url_backslashes() {
    assert_eq!(
        file_url(Path::new("C:\\data\\file-1.txt")),
        "file:///C:/data/file-1.txt"
    );
}

#[test]
fn test_file_url_keeps_special_characters_verbatim() {
    assert_eq!(
        file_url(Path::new("/data/my file#1%.txt")),
        "file:///data/my file#1%.txt"
    );
}

#[test]
fn test_display_dir_drops_trailing_separator() {
    assert_eq!(display_dir(Path::new("./tests/fixtures/")), "./tests/fixtures");
    assert_eq!(display_dir(Path::new("/data//fixtures")), "/data/fixtures");
    assert_eq!(display_dir(Path::new("/data/fixtures")), "/data/fixtures");
}

// --- patterns ---

#[test]
fn test_recursive_pattern_matches_any_depth() {
    let p = compile_pattern("**/*").unwrap();
    assert!(pattern_matches(&p, Path::new("file-1.txt")));
    assert!(pattern_matches(&p, Path::new("sub-dir")));
    assert!(pattern_matches(&p, Path::new("sub-dir/file-3.pdf")));
    assert!(pattern_matches(&p, Path::new("a/b/c/.hidden")));
}

#[test]
fn test_star_stays_in_one_component() {
    let p = compile_pattern("*.csv").unwrap();
    assert!(pattern_matches(&p, Path::new("file-2.csv")));
    assert!(!pattern_matches(&p, Path::new("sub-dir/file-2.csv")));
}

#[test]
fn test_recursive_extension_pattern() {
    let p = compile_pattern("**/*.tsv").unwrap();
    assert!(pattern_matches(&p, Path::new("x.tsv")));
    assert!(pattern_matches(&p, Path::new("sub-dir/file-4.tsv")));
    assert!(!pattern_matches(&p, Path::new("sub-dir/file-4.csv")));
}

#[test]
fn test_invalid_pattern_is_error() {
    assert!(compile_pattern("[").is_err());
}

#[test]
fn test_exclude_by_name_or_relative_path() {
    let ex = vec![
        compile_pattern("*.log").unwrap(),
        compile_pattern("build/*").unwrap(),
    ];
    assert!(is_excluded(Path::new("deep/dir/run.log"), &ex));
    assert!(is_excluded(Path::new("build/out.bin"), &ex));
    assert!(!is_excluded(Path::new("src/main.rs"), &ex));
    assert!(!is_excluded(Path::new("src/main.rs"), &[]));
}

#[test]
fn test_should_include_skips_root_and_output_dir() {
    let root = PathBuf::from("/in");
    let out = Some(PathBuf::from("/in/out"));
    assert!(!should_include_in_walk(&root, &root, &out, &[]));
    assert!(!should_include_in_walk(
        Path::new("/in/out/DocumentReference.ndjson"),
        &root,
        &out,
        &[]
    ));
    assert!(should_include_in_walk(
        Path::new("/in/outside.txt"),
        &root,
        &out,
        &[]
    ));
}

// --- project id ---

#[test]
fn test_split_project_id_on_first_hyphen() {
    assert_eq!(split_project_id("aced-test").unwrap(), ("aced", "test"));
    assert_eq!(
        split_project_id("aced-my-study").unwrap(),
        ("aced", "my-study")
    );
}

#[test]
fn test_split_project_id_rejects_malformed() {
    assert!(split_project_id("acedtest").is_err());
    assert!(split_project_id("-test").is_err());
    assert!(split_project_id("aced-").is_err());
}

// --- timestamps ---

#[test]
fn test_iso_timestamp_whole_seconds() {
    let t = Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap();
    assert_eq!(iso_timestamp(&t), "2023-04-05T06:07:08+00:00");
}

#[test]
fn test_iso_timestamp_microseconds() {
    let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    assert_eq!(iso_timestamp(&t), "2023-11-14T22:13:20.123456+00:00");
}

// --- hashing ---

#[test]
fn test_md5_reader_known_values() {
    assert_eq!(
        md5_reader(&b""[..]).unwrap(),
        "d41d8cd98f00b204e9800998ecf8427e"
    );
    assert_eq!(
        md5_reader(&b"hello world\n"[..]).unwrap(),
        "6f5902ac237024bdd0c176cb93063dc4"
    );
}

#[test]
fn test_md5_file_spans_many_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.bin");
    std::fs::write(&path, vec![b'a'; 10_000]).unwrap();
    assert_eq!(md5_file(&path).unwrap(), "0d0c9c4db6953fee9e03f528cafd7d3e");
}

#[test]
fn test_md5_file_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(md5_file(&dir.path().join("nope")).is_err());
}

#[test]
fn test_normalize_path_decomposes() {
    let composed = PathBuf::from("caf\u{e9}.txt");
    assert_eq!(normalize_path(&composed), PathBuf::from("cafe\u{301}.txt"));
    assert_eq!(
        normalize_path(Path::new("plain.txt")),
        PathBuf::from("plain.txt")
    );
}

#[test]
fn test_md5_file_non_ascii_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caf\u{e9}.txt");
    std::fs::write(&path, b"hello world\n").unwrap();
    assert_eq!(md5_file(&path).unwrap(), "6f5902ac237024bdd0c176cb93063dc4");
}

#[cfg(target_os = "linux")]
#[test]
fn test_md5_file_hashes_walked_file_when_other_spelling_exists() {
    let dir = tempfile::tempdir().unwrap();
    let composed = dir.path().join("caf\u{e9}.txt");
    let decomposed = dir.path().join("cafe\u{301}.txt");
    std::fs::write(&composed, b"hello world\n").unwrap();
    std::fs::write(&decomposed, b"something else").unwrap();
    assert_eq!(
        md5_file(&composed).unwrap(),
        "6f5902ac237024bdd0c176cb93063dc4"
    );
    assert_eq!(
        md5_file(&decomposed).unwrap(),
        format!("{:x}", md5::compute(b"something else"))
    );
}

// --- MIME ---

#[test]
fn test_extension_lookup() {
    let r = ExtensionLookup;
    assert_eq!(r.resolve(Path::new("a.txt")).as_deref(), Some("text/plain"));
    assert_eq!(r.resolve(Path::new("a.csv")).as_deref(), Some("text/csv"));
    assert_eq!(
        r.resolve(Path::new("a.tsv")).as_deref(),
        Some("text/tab-separated-values")
    );
    assert_eq!(
        r.resolve(Path::new("a.pdf")).as_deref(),
        Some("application/pdf")
    );
    assert_eq!(r.resolve(Path::new("no-extension")), None);
}

#[test]
fn test_sniff_bytes_magic_numbers() {
    assert_eq!(sniff_bytes(b"%PDF-1.4\n%binary"), "application/pdf");
    assert_eq!(
        sniff_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "image/png"
    );
    assert_eq!(sniff_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    assert_eq!(sniff_bytes(b"PK\x03\x04rest"), "application/zip");
}

#[test]
fn test_sniff_bytes_text_and_binary() {
    assert_eq!(sniff_bytes(b""), "inode/x-empty");
    assert_eq!(sniff_bytes(b"col1\tcol2\n1\t2\n"), "text/plain");
    assert_eq!(sniff_bytes(b"<?xml version=\"1.0\"?><a/>"), "text/xml");
    assert_eq!(sniff_bytes(b"<!DOCTYPE html><html></html>"), "text/html");
    assert_eq!(
        sniff_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04, 0xFE, 0xFF, 0x10]),
        "application/octet-stream"
    );
}

#[test]
fn test_sniff_bytes_tolerates_cut_utf8_char() {
    let mut bytes = "r\u{e9}sum\u{e9} ".repeat(10).into_bytes();
    bytes.push(0xC3); // first byte of a two-byte char, cut off
    assert_eq!(sniff_bytes(&bytes), "text/plain");
}

#[test]
fn test_content_sniffer_unwraps_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive");
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"%PDF-1.7\n% compressed pdf").unwrap();
    std::fs::write(&path, enc.finish().unwrap()).unwrap();
    assert_eq!(
        ContentSniffer.resolve(&path).as_deref(),
        Some("application/pdf")
    );
}

#[test]
fn test_content_sniffer_unreadable_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ContentSniffer.resolve(&dir.path().join("missing")), None);
}

#[test]
fn test_mime_chain_falls_back_to_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file-5");
    std::fs::write(&path, "line\n".repeat(100)).unwrap();
    let chain = MimeChain::default();
    assert_eq!(chain.resolve(&path).as_deref(), Some("text/plain"));

    let pdf = dir.path().join("doc.pdf");
    std::fs::write(&pdf, b"not really a pdf").unwrap();
    assert_eq!(chain.resolve(&pdf).as_deref(), Some("application/pdf"));
}

struct Fixed(Option<&'static str>);

impl MimeResolver for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }
    fn resolve(&self, _path: &Path) -> Option<String> {
        self.0.map(String::from)
    }
}

#[test]
fn test_mime_chain_first_success_wins() {
    let chain = MimeChain::new(vec![
        Box::new(Fixed(None)),
        Box::new(Fixed(Some("a/b"))),
        Box::new(Fixed(Some("c/d"))),
    ]);
    assert_eq!(chain.resolve(Path::new("x")).as_deref(), Some("a/b"));
    assert_eq!(MimeChain::new(Vec::new()).resolve(Path::new("x")), None);
}

// --- emitter ---

#[test]
fn test_emitter_opens_lazily_and_closes_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut emitter = Emitter::new(dir.path());
    let path = emitter.stream_path("ResearchStudy");
    assert_eq!(path, dir.path().join("ResearchStudy.ndjson"));
    assert!(!path.exists());

    let study = ResearchStudy::new("test", "d");
    emitter.emit(&study).unwrap();
    emitter.emit(&study).unwrap();
    let streams = emitter.close().unwrap();
    assert_eq!(streams, vec![path.clone()]);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(text.ends_with('\n'));
    assert!(!dir.path().join("DocumentReference.ndjson").exists());
}

#[test]
fn test_emitter_truncates_previous_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ResearchStudy.ndjson");
    std::fs::write(&path, "stale line 1\nstale line 2\nstale line 3\n").unwrap();

    let mut emitter = Emitter::new(dir.path());
    emitter.emit(&ResearchStudy::new("test", "d")).unwrap();
    emitter.close().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(!text.contains("stale"));
}

#[test]
fn test_emitter_open_failure_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut emitter = Emitter::new(&dir.path().join("missing-dir"));
    assert!(emitter.emit(&ResearchStudy::new("test", "d")).is_err());
}

#[test]
fn test_emitter_reports_untouched_streams() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join("DocumentReference.ndjson");
    std::fs::write(&stale, "{}\n").unwrap();

    let mut emitter = Emitter::new(dir.path());
    emitter.emit(&ResearchStudy::new("test", "d")).unwrap();
    let untouched = emitter.untouched_streams(&["ResearchStudy", "DocumentReference"]);
    assert_eq!(untouched, vec![stale.clone()]);
    emitter.close().unwrap();
    assert_eq!(std::fs::read_to_string(&stale).unwrap(), "{}\n");
}

// --- records ---

#[test]
fn test_study_serializes_with_resource_type() {
    let study = ResearchStudy::new("test", "A study");
    let v = serde_json::to_value(&study).unwrap();
    assert_eq!(v["resourceType"], "ResearchStudy");
    assert_eq!(v["id"], "d783fb78-8c56-52eb-93f2-d8ac0120668a");
    assert_eq!(v["title"], "test");
    assert_eq!(v["status"], "active");
    assert_eq!(
        study.reference(),
        "ResearchStudy/d783fb78-8c56-52eb-93f2-d8ac0120668a"
    );
}

// --- settings file ---

#[test]
fn test_settings_file_applies_present_fields_only() {
    let file = parse_dirstudy_toml(
        r#"
        [settings]
        pattern = "**/*.csv"
        threads = 2
        "#,
    )
    .unwrap();
    let mut opts = CatalogOpts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.pattern, "**/*.csv");
    assert_eq!(opts.num_threads, Some(2));
    assert!(!opts.follow_links);
    assert!(opts.exclude.is_empty());
}

#[test]
fn test_settings_file_empty_keeps_defaults() {
    let file = parse_dirstudy_toml("").unwrap();
    let mut opts = CatalogOpts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.pattern, "**/*");
    assert_eq!(opts.num_threads, None);
}
