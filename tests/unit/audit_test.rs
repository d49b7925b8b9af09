//! Tests for audit sink

use ward_admission::core::{build_audit_event, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(Some(1), Some(4), Some(77), "submit", 1_000, Some("payload".to_string()));

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].admission_id, Some(1));
    assert_eq!(events[0].action, "submit");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(Some(1), None, None, "submit", 1, None));
    sink.record(build_audit_event(Some(2), None, None, "submit", 2, None));
    sink.record(build_audit_event(Some(3), None, None, "submit", 3, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].admission_id, Some(2)); // First one popped
    assert_eq!(events[1].admission_id, Some(3));
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(Some(5), Some(12), Some(3), "discharge", 42, Some("result".to_string()));

    assert_eq!(event.admission_id, Some(5));
    assert_eq!(event.bed_id, Some(12));
    assert_eq!(event.actor, Some(3));
    assert_eq!(event.action, "discharge");
    assert_eq!(event.payload, Some("result".to_string()));
    assert_eq!(event.created_at_ms, 42);
    assert!(uuid::Uuid::parse_str(&event.event_id).is_ok());
}
