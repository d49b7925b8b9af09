//! Identifier aliases shared across the crate.
//!
//! Records are keyed by plain integers, matching the relational ids of the surrounding
//! application that owns patients and staff.

/// Admission identifier, assigned by the scheduler.
pub type AdmissionId = u64;
/// Bed identifier.
pub type BedId = u64;
/// Ward identifier.
pub type WardId = u64;
/// Patient identifier, owned by the external patient directory.
pub type PatientId = u64;
/// Staff identifier of the acting clinician or operator.
pub type StaffId = u64;
