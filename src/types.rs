//! Public and internal types: output records, options and the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::engine::tools::{file_url, iso_timestamp};
use crate::identity;
use crate::utils::config::{DEFAULT_PATTERN, MD5_EXTENSION_URL};

/// A record type written to its own `<RESOURCE_TYPE>.ndjson` stream.
pub trait Resource: Serialize {
    const RESOURCE_TYPE: &'static str;
}

/// One ingestion batch. Exactly one per run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType", rename = "ResearchStudy")]
pub struct ResearchStudy {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Resource for ResearchStudy {
    const RESOURCE_TYPE: &'static str = "ResearchStudy";
}

impl ResearchStudy {
    pub const STATUS: &'static str = "active";

    /// Study whose id is derived from `name` alone.
    pub fn new(name: &str, description: impl Into<String>) -> Self {
        Self {
            id: identity::study_id(name),
            title: name.to_string(),
            description: description.into(),
            status: Self::STATUS.to_string(),
        }
    }

    /// `ResearchStudy/<id>`, the form used by documents to point back at this study.
    pub fn reference(&self) -> String {
        format!("{}/{}", Self::RESOURCE_TYPE, self.id)
    }
}

/// One cataloged file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType", rename = "DocumentReference", rename_all = "camelCase")]
pub struct DocumentReference {
    pub status: String,
    pub doc_status: String,
    pub id: Uuid,
    /// File mtime in UTC, ISO-8601.
    pub date: String,
    pub content: Vec<DocumentContent>,
    pub context: DocumentContext,
}

impl Resource for DocumentReference {
    const RESOURCE_TYPE: &'static str = "DocumentReference";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub attachment: Attachment,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub extension: Vec<Extension>,
    /// `null` when neither the extension lookup nor content sniffing resolved a type.
    pub content_type: Option<String>,
    pub url: String,
    pub size: u64,
    pub title: String,
    pub creation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub url: String,
    pub value_string: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    pub related: Vec<Reference>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub reference: String,
}

impl DocumentReference {
    pub const STATUS: &'static str = "current";
    pub const DOC_STATUS: &'static str = "final";

    /// Build the record for `file` under `study`.
    pub fn new(study: &ResearchStudy, file: &FileMeta) -> Self {
        let timestamp = iso_timestamp(&file.modified);
        Self {
            status: Self::STATUS.to_string(),
            doc_status: Self::DOC_STATUS.to_string(),
            id: identity::document_id(&study.id, &file.file_name),
            date: timestamp.clone(),
            content: vec![DocumentContent {
                attachment: Attachment {
                    extension: vec![Extension {
                        url: MD5_EXTENSION_URL.to_string(),
                        value_string: file.md5.clone(),
                    }],
                    content_type: file.mime.clone(),
                    url: file_url(&file.path),
                    size: file.size,
                    title: file.file_name.clone(),
                    creation: timestamp,
                },
            }],
            context: DocumentContext {
                related: vec![Reference {
                    reference: study.reference(),
                }],
            },
        }
    }

    /// The attachment's MD5 extension value, if present.
    pub fn md5(&self) -> Option<&str> {
        self.content
            .first()?
            .attachment
            .extension
            .iter()
            .find(|e| e.url == MD5_EXTENSION_URL)
            .map(|e| e.value_string.as_str())
    }
}

/// Metadata extracted for a single matched file.
#[derive(Clone, Debug)]
pub struct FileMeta {
    /// Absolute path.
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub mime: Option<String>,
    /// Lowercase hex MD5 of the content.
    pub md5: String,
}

/// Options for [`catalog_dir`](crate::catalog_dir).
#[derive(Clone, Debug)]
pub struct CatalogOpts {
    /// Glob matched against paths relative to the input directory.
    pub pattern: String,
    /// Extra glob patterns (file name or relative path) dropped from the walk.
    pub exclude: Vec<String>,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Metadata worker count. When None, derived from available threads.
    pub num_threads: Option<usize>,
    /// Show a progress counter.
    pub verbose: bool,
}

impl Default for CatalogOpts {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            exclude: Vec::new(),
            follow_links: false,
            num_threads: None,
            verbose: false,
        }
    }
}

/// What a completed run produced.
#[derive(Clone, Debug, Default)]
pub struct CatalogSummary {
    pub study_id: Uuid,
    /// DocumentReference records written.
    pub documents: usize,
    /// Documents written with a `null` content type.
    pub unresolved_mime: usize,
    /// Files whose content extractor reported an error (record still written).
    pub extraction_failures: usize,
    /// Every stream opened and closed during the run.
    pub streams: Vec<PathBuf>,
    /// Stream files from an earlier run that this run did not open (left as they were).
    pub stale_streams: Vec<PathBuf>,
}
