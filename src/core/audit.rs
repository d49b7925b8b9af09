//! Audit sink implementations.
//!
//! Every committed scheduler mutation produces one audit event per admission event,
//! stamped with the operation's explicit time and acting staff member.

use std::collections::VecDeque;

use crate::util::serde::{AdmissionId, BedId, StaffId};

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related admission, if any.
    pub admission_id: Option<AdmissionId>,
    /// Related bed, if any.
    pub bed_id: Option<BedId>,
    /// Staff member who triggered the operation; `None` for system work such as rescoring.
    pub actor: Option<StaffId>,
    /// Action taken (submit, enqueue, assign, discharge, triage, bed_status, recompute).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards into a shared in-memory buffer, so callers can keep a handle to
/// inspect what the scheduler recorded.
#[derive(Clone)]
pub struct SharedAuditSink {
    inner: std::sync::Arc<parking_lot::Mutex<InMemoryAuditSink>>,
}

impl SharedAuditSink {
    /// Create a shared sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            inner: std::sync::Arc::new(parking_lot::Mutex::new(InMemoryAuditSink::new(max_events))),
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().events()
    }
}

impl AuditSink for SharedAuditSink {
    fn record(&mut self, event: AuditEvent) {
        self.inner.lock().record(event);
    }
}

/// Helper to build an audit event with a fresh identifier.
pub fn build_audit_event(
    admission_id: Option<AdmissionId>,
    bed_id: Option<BedId>,
    actor: Option<StaffId>,
    action: impl Into<String>,
    created_at_ms: u128,
    payload: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        admission_id,
        bed_id,
        actor,
        action: action.into(),
        created_at_ms,
        payload,
    }
}
