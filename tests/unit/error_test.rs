//! Tests for error types

use ward_admission::core::{SchedulerError, TriageCategory, WardType};

#[test]
fn test_conflict_error() {
    let err = SchedulerError::Conflict("bed 4 is occupied".to_string());
    assert_eq!(format!("{}", err), "conflict: bed 4 is occupied");
}

#[test]
fn test_not_found_error() {
    let err = SchedulerError::NotFound("admission 9".to_string());
    assert_eq!(format!("{}", err), "not found: admission 9");
}

#[test]
fn test_invalid_state_error() {
    let err = SchedulerError::InvalidState("admission 2 is waiting".to_string());
    assert_eq!(format!("{}", err), "invalid state: admission 2 is waiting");
}

#[test]
fn test_backend_error() {
    let err = SchedulerError::Backend("disk full".to_string());
    assert_eq!(format!("{}", err), "backend error: disk full");
}

#[test]
fn test_unknown_ward_type_is_validation_error() {
    let err = "cardiology".parse::<WardType>().unwrap_err();
    assert!(matches!(err, SchedulerError::Validation(_)));
}

#[test]
fn test_unknown_triage_is_validation_error() {
    assert!(matches!(
        "purple".parse::<TriageCategory>(),
        Err(SchedulerError::Validation(_))
    ));
}

#[test]
fn test_converts_into_anyhow() {
    fn fails() -> ward_admission::core::AppResult<()> {
        Err(SchedulerError::NotFound("bed 1".into()).into())
    }
    let err = fails().unwrap_err();
    assert_eq!(err.to_string(), "not found: bed 1");
    assert!(err.downcast_ref::<SchedulerError>().is_some());
}
