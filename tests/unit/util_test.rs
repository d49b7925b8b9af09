//! Tests for utility functions

use ward_admission::util::{init_tracing, Clock, ManualClock, SystemClock, MS_PER_HOUR, MS_PER_MINUTE};
use ward_admission::util::{AdmissionId, BedId, PatientId};

#[test]
fn test_time_constants() {
    assert_eq!(MS_PER_HOUR, 60 * MS_PER_MINUTE);
}

#[test]
fn test_manual_clock_shared_between_handles() {
    let clock = ManualClock::new(0);
    let handle = clock.clone();
    handle.advance(2 * MS_PER_HOUR);
    assert_eq!(clock.now_ms(), 2 * MS_PER_HOUR);
}

#[test]
fn test_clock_as_trait_object() {
    let clocks: Vec<Box<dyn Clock>> = vec![Box::new(SystemClock), Box::new(ManualClock::new(7))];
    assert!(clocks[0].now_ms() > 7);
    assert_eq!(clocks[1].now_ms(), 7);
}

#[test]
fn test_id_aliases() {
    let admission: AdmissionId = 12345;
    let bed: BedId = 7;
    let patient: PatientId = 99;
    assert_eq!(admission + bed + patient, 12451);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
