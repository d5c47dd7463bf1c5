//! Name-based identifiers for studies and documents.
//!
//! Every id is a UUIDv5 under one namespace, itself the UUIDv3 of [`NAMESPACE_DOMAIN`] in the
//! DNS namespace. Same inputs give the same id across runs, processes and implementations.

use std::sync::OnceLock;
use uuid::Uuid;

use crate::utils::config::{DOCUMENT_ID_SEPARATOR, NAMESPACE_DOMAIN};

static NAMESPACE: OnceLock<Uuid> = OnceLock::new();

/// Namespace all identifiers are derived under.
pub fn namespace() -> Uuid {
    *NAMESPACE.get_or_init(|| Uuid::new_v3(&Uuid::NAMESPACE_DNS, NAMESPACE_DOMAIN.as_bytes()))
}

/// Id of the study named `study_name`.
pub fn study_id(study_name: &str) -> Uuid {
    Uuid::new_v5(&namespace(), study_name.as_bytes())
}

/// Id of the document for `file_name` within the study `study_id`.
pub fn document_id(study_id: &Uuid, file_name: &str) -> Uuid {
    let name = format!("{study_id}{DOCUMENT_ID_SEPARATOR}{file_name}");
    Uuid::new_v5(&namespace(), name.as_bytes())
}
