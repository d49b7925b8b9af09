//! Core admission scheduling: triage, scoring, bed accounting and the scheduler itself.

pub mod admission;
pub mod audit;
pub mod bed_pool;
pub mod error;
pub mod priority_queue;
pub mod scheduler;
pub mod triage;

pub use admission::{Admission, AdmissionDraft, AdmissionRegistry, AdmissionStatus};
pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, SharedAuditSink};
pub use bed_pool::{Bed, BedPool, BedStatus, Occupancy, Ward, WardOccupancy, WardType};
pub use error::{AppResult, SchedulerError};
pub use priority_queue::{PriorityPolicy, PriorityQueue, QueueSlot, MIN_PRIORITY_SCORE};
pub use scheduler::{
    AdmissionEvent, AdmissionRequest, AdmissionScheduler, AdmissionStore, HospitalSnapshot,
    OpContext, PatientDirectory, PatientSummary, SchedulerStats,
};
pub use triage::TriageCategory;
