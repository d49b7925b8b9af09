//! API-facing request/response models.
//!
//! Requests carry triage and ward types as free text, the way they arrive from forms.
//! Triage text is normalized (unknown values become `standard`); an unknown ward type is
//! rejected.

use serde::{Deserialize, Serialize};

use crate::core::{
    Admission, AdmissionRequest, AdmissionScheduler, AdmissionStatus, AdmissionStore, OpContext,
    SchedulerError, TriageCategory, WardOccupancy, WardType,
};
use crate::util::clock::Clock;
use crate::util::serde::{AdmissionId, BedId, PatientId, StaffId, WardId};

/// Admission submission payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionSubmission {
    /// Patient to admit.
    pub patient_id: PatientId,
    /// Ward type name, e.g. `"icu"`.
    pub ward_type: Option<String>,
    /// Triage category name, e.g. `"urgent"`.
    pub priority_level: Option<String>,
    /// Specific bed, if the clinician picked one.
    pub bed_id: Option<BedId>,
    /// Reason for admission.
    pub admission_reason: String,
    /// Presenting complaint.
    pub chief_complaint: Option<String>,
    /// Free-form notes.
    pub admission_notes: Option<String>,
    /// Equipment or placement needs.
    pub special_requirements: Option<String>,
}

impl AdmissionSubmission {
    fn into_request(self) -> Result<AdmissionRequest, SchedulerError> {
        let ward_type = self
            .ward_type
            .as_deref()
            .map(str::parse::<WardType>)
            .transpose()?;
        Ok(AdmissionRequest {
            patient_id: self.patient_id,
            ward_type,
            priority_level: Some(TriageCategory::normalize(self.priority_level.as_deref())),
            requested_bed: self.bed_id,
            admission_reason: self.admission_reason,
            chief_complaint: self.chief_complaint,
            admission_notes: self.admission_notes,
            special_requirements: self.special_requirements,
        })
    }
}

/// Triage update payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageUpdate {
    /// Admission to re-triage.
    pub admission_id: AdmissionId,
    /// New category name.
    pub priority_level: Option<String>,
    /// Clinician notes.
    pub triage_notes: Option<String>,
}

/// Admission as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionView {
    /// Admission identifier.
    pub id: AdmissionId,
    /// Patient identifier.
    pub patient_id: PatientId,
    /// Lifecycle state.
    pub status: AdmissionStatus,
    /// Ward type waited for.
    pub ward_type: WardType,
    /// Triage category.
    pub priority_level: TriageCategory,
    /// Triage color for display.
    pub triage_color: String,
    /// Current score.
    pub priority_score: f64,
    /// Queue rank while waiting.
    pub queue_position: Option<u32>,
    /// Estimated wait in minutes while waiting.
    pub estimated_wait_time: Option<u32>,
    /// Minutes waited before getting a bed.
    pub actual_wait_time: Option<u64>,
    /// Bed held while active.
    pub bed_id: Option<BedId>,
    /// Attending clinician.
    pub attending_staff_id: Option<StaffId>,
    /// Reason for admission.
    pub admission_reason: String,
    /// Submission time.
    pub created_at_ms: u128,
    /// Bed assignment time.
    pub admission_date_ms: Option<u128>,
    /// Discharge time.
    pub discharge_date_ms: Option<u128>,
}

impl From<&Admission> for AdmissionView {
    fn from(a: &Admission) -> Self {
        Self {
            id: a.id(),
            patient_id: a.patient_id,
            status: a.status(),
            ward_type: a.ward_type,
            priority_level: a.priority_level(),
            triage_color: a.priority_level().color().to_string(),
            priority_score: a.priority_score(),
            queue_position: a.queue_position(),
            estimated_wait_time: a.estimated_wait_time(),
            actual_wait_time: a.actual_wait_minutes(),
            bed_id: a.bed(),
            attending_staff_id: a.attending_staff_id,
            admission_reason: a.admission_reason.clone(),
            created_at_ms: a.created_at_ms(),
            admission_date_ms: a.admission_date_ms(),
            discharge_date_ms: a.discharge_date_ms(),
        }
    }
}

/// One row of the waiting list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntryView {
    /// Queue rank.
    pub position: u32,
    /// Admission identifier.
    pub admission_id: AdmissionId,
    /// Patient identifier.
    pub patient_id: PatientId,
    /// Triage category.
    pub priority_level: TriageCategory,
    /// Current score.
    pub priority_score: f64,
    /// Estimated wait in minutes.
    pub estimated_wait_time: u32,
}

/// Ward data for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardSnapshot {
    /// Ward identifier.
    pub id: WardId,
    /// Ward name.
    pub name: String,
    /// Ward type.
    pub ward_type: WardType,
    /// Occupied beds.
    pub occupied: usize,
    /// Free beds.
    pub available: usize,
    /// Beds in maintenance.
    pub maintenance: usize,
    /// All beds.
    pub total: usize,
}

impl From<WardOccupancy> for WardSnapshot {
    fn from(row: WardOccupancy) -> Self {
        Self {
            id: row.ward_id,
            name: row.name,
            ward_type: row.ward_type,
            occupied: row.occupied,
            available: row.available,
            maintenance: row.maintenance,
            total: row.total,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Admissions waiting for a bed.
    pub waiting: usize,
    /// Free beds across all wards.
    pub available_beds: usize,
}

/// Submit an admission on behalf of `actor`.
pub fn submit_admission<S: AdmissionStore>(
    scheduler: &AdmissionScheduler<S>,
    clock: &dyn Clock,
    actor: StaffId,
    req: AdmissionSubmission,
) -> Result<AdmissionView, SchedulerError> {
    let request = req.into_request()?;
    let admission = scheduler.submit_admission(OpContext::by(actor, clock.now_ms()), request)?;
    Ok(AdmissionView::from(&admission))
}

/// Apply a triage update on behalf of `actor`.
pub fn update_triage<S: AdmissionStore>(
    scheduler: &AdmissionScheduler<S>,
    clock: &dyn Clock,
    actor: StaffId,
    req: TriageUpdate,
) -> Result<AdmissionView, SchedulerError> {
    let category = TriageCategory::normalize(req.priority_level.as_deref());
    let admission = scheduler.update_triage(
        OpContext::by(actor, clock.now_ms()),
        req.admission_id,
        category,
        req.triage_notes,
    )?;
    Ok(AdmissionView::from(&admission))
}

/// Discharge an admission on behalf of `actor`.
pub fn discharge<S: AdmissionStore>(
    scheduler: &AdmissionScheduler<S>,
    clock: &dyn Clock,
    actor: StaffId,
    admission_id: AdmissionId,
) -> Result<AdmissionView, SchedulerError> {
    let admission = scheduler.discharge(OpContext::by(actor, clock.now_ms()), admission_id)?;
    Ok(AdmissionView::from(&admission))
}

/// Waiting list in queue order.
pub fn waiting_queue<S: AdmissionStore>(scheduler: &AdmissionScheduler<S>) -> Vec<QueueEntryView> {
    scheduler
        .waiting_queue()
        .iter()
        .map(|a| QueueEntryView {
            position: a.queue_position().unwrap_or_default(),
            admission_id: a.id(),
            patient_id: a.patient_id,
            priority_level: a.priority_level(),
            priority_score: a.priority_score(),
            estimated_wait_time: a.estimated_wait_time().unwrap_or_default(),
        })
        .collect()
}

/// Open admissions, active first.
pub fn admission_board<S: AdmissionStore>(scheduler: &AdmissionScheduler<S>) -> Vec<AdmissionView> {
    scheduler.admission_board().iter().map(AdmissionView::from).collect()
}

/// Ward occupancy listing.
pub fn list_wards<S: AdmissionStore>(scheduler: &AdmissionScheduler<S>) -> Vec<WardSnapshot> {
    scheduler
        .ward_occupancy()
        .into_iter()
        .map(WardSnapshot::from)
        .collect()
}

/// Return a health payload.
pub fn health<S: AdmissionStore>(scheduler: &AdmissionScheduler<S>) -> Health {
    let stats = scheduler.stats();
    Health {
        ok: true,
        waiting: stats.waiting,
        available_beds: stats.available_beds,
    }
}
