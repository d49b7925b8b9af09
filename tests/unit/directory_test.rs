//! Tests for the in-memory patient directory

use ward_admission::core::{PatientDirectory, PatientSummary};
use ward_admission::infra::InMemoryDirectory;

#[test]
fn test_insert_and_lookup() {
    let directory = InMemoryDirectory::new();
    assert!(directory.is_empty());
    directory.insert(PatientSummary {
        id: 4,
        name: "Grace".into(),
        age: None,
    });
    assert_eq!(directory.len(), 1);
    assert_eq!(directory.lookup(4).unwrap().name, "Grace");
    assert!(directory.lookup(5).is_none());
}

#[test]
fn test_insert_replaces_existing() {
    let directory = InMemoryDirectory::new();
    for name in ["Old", "New"] {
        directory.insert(PatientSummary {
            id: 1,
            name: name.into(),
            age: Some(50),
        });
    }
    assert_eq!(directory.len(), 1);
    assert_eq!(directory.lookup(1).unwrap().name, "New");
}
