//! Identifier derivation: fixed values, determinism and sensitivity to every input.

use dirstudy::identity::{document_id, namespace, study_id};
use std::collections::HashSet;
use uuid::Uuid;

fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

#[test]
fn test_namespace_is_uuid3_of_domain() {
    assert_eq!(namespace(), uuid("f500b28c-73b4-3571-a7cc-dbf35a4b950b"));
}

#[test]
fn test_study_id_known_value() {
    assert_eq!(
        study_id("test"),
        uuid("d783fb78-8c56-52eb-93f2-d8ac0120668a")
    );
}

#[test]
fn test_document_id_known_value() {
    let study = study_id("test");
    assert_eq!(
        document_id(&study, "file-1.txt"),
        uuid("3ca78a3b-6b10-535a-873f-465260078a2d")
    );
}

#[test]
fn test_ids_are_deterministic() {
    assert_eq!(study_id("alpha"), study_id("alpha"));
    let s = study_id("alpha");
    assert_eq!(document_id(&s, "a.txt"), document_id(&s, "a.txt"));
}

#[test]
fn test_ids_are_version_5() {
    let s = study_id("alpha");
    assert_eq!(s.get_version_num(), 5);
    assert_eq!(document_id(&s, "a.txt").get_version_num(), 5);
}

#[test]
fn test_distinct_study_names_give_distinct_ids() {
    let names = ["a", "b", "test", "Test", "test ", ""];
    let ids: HashSet<_> = names.iter().map(|n| study_id(n)).collect();
    assert_eq!(ids.len(), names.len());
}

#[test]
fn test_document_id_depends_on_study_and_file() {
    let s1 = study_id("one");
    let s2 = study_id("two");
    assert_ne!(document_id(&s1, "x.csv"), document_id(&s2, "x.csv"));
    assert_ne!(document_id(&s1, "x.csv"), document_id(&s1, "y.csv"));
}

#[test]
fn test_document_id_is_not_the_study_id() {
    let s = study_id("one");
    assert_ne!(document_id(&s, ""), s);
}

#[test]
fn test_same_file_name_in_different_dirs_shares_id() {
    // Only the file name takes part, not its directory.
    let s = study_id("one");
    let a = document_id(&s, "data.tsv");
    let b = document_id(&s, "data.tsv");
    assert_eq!(a, b);
}
