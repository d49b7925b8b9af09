//! Admission records and the registry that indexes them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::bed_pool::WardType;
use crate::core::{SchedulerError, TriageCategory};
use crate::util::clock::MS_PER_MINUTE;
use crate::util::serde::{AdmissionId, BedId, PatientId, StaffId};

/// Lifecycle state of an admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    /// Queued for a bed.
    Waiting,
    /// Holding a bed.
    Active,
    /// Finished; terminal.
    Discharged,
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Discharged => "discharged",
        })
    }
}

/// Caller-supplied fields of a new admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDraft {
    /// Patient being admitted.
    pub patient_id: PatientId,
    /// Ward type the admission waits for.
    pub ward_type: WardType,
    /// Triage category at submission.
    pub priority_level: TriageCategory,
    /// Clinician who submitted the admission.
    pub attending_staff_id: Option<StaffId>,
    /// Reason for admission.
    pub admission_reason: String,
    /// Presenting complaint.
    pub chief_complaint: Option<String>,
    /// Free-form notes.
    pub admission_notes: Option<String>,
    /// Equipment or placement needs.
    pub special_requirements: Option<String>,
}

impl AdmissionDraft {
    /// Draft with the required fields; optional text fields start empty.
    pub fn new(
        patient_id: PatientId,
        ward_type: WardType,
        priority_level: TriageCategory,
        attending_staff_id: Option<StaffId>,
        admission_reason: impl Into<String>,
    ) -> Self {
        Self {
            patient_id,
            ward_type,
            priority_level,
            attending_staff_id,
            admission_reason: admission_reason.into(),
            chief_complaint: None,
            admission_notes: None,
            special_requirements: None,
        }
    }
}

/// One patient's request for a bed.
///
/// Lifecycle and derived fields are read-only outside the crate: status and bed change
/// through the bed pool, score and queue slot through the priority queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    id: AdmissionId,
    /// Patient being admitted.
    pub patient_id: PatientId,
    /// Ward type the admission waits for.
    pub ward_type: WardType,
    /// Clinician who submitted the admission.
    pub attending_staff_id: Option<StaffId>,
    /// Reason for admission.
    pub admission_reason: String,
    /// Presenting complaint.
    pub chief_complaint: Option<String>,
    /// Free-form notes.
    pub admission_notes: Option<String>,
    /// Equipment or placement needs.
    pub special_requirements: Option<String>,
    status: AdmissionStatus,
    priority_level: TriageCategory,
    triage_notes: Option<String>,
    priority_score: f64,
    queue_position: Option<u32>,
    estimated_wait_time: Option<u32>,
    actual_wait_minutes: Option<u64>,
    bed: Option<BedId>,
    created_at_ms: u128,
    updated_at_ms: u128,
    admission_date_ms: Option<u128>,
    discharge_date_ms: Option<u128>,
}

impl Admission {
    /// A new waiting admission scored at its base category weight.
    #[must_use]
    pub fn new(id: AdmissionId, draft: AdmissionDraft, created_at_ms: u128) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            ward_type: draft.ward_type,
            attending_staff_id: draft.attending_staff_id,
            admission_reason: draft.admission_reason,
            chief_complaint: draft.chief_complaint,
            admission_notes: draft.admission_notes,
            special_requirements: draft.special_requirements,
            status: AdmissionStatus::Waiting,
            priority_level: draft.priority_level,
            triage_notes: None,
            priority_score: f64::from(draft.priority_level.weight()),
            queue_position: None,
            estimated_wait_time: None,
            actual_wait_minutes: None,
            bed: None,
            created_at_ms,
            updated_at_ms: created_at_ms,
            admission_date_ms: None,
            discharge_date_ms: None,
        }
    }

    /// Admission identifier.
    #[must_use]
    pub const fn id(&self) -> AdmissionId {
        self.id
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> AdmissionStatus {
        self.status
    }

    /// Triage category.
    #[must_use]
    pub const fn priority_level(&self) -> TriageCategory {
        self.priority_level
    }

    /// Notes from the latest triage update.
    #[must_use]
    pub fn triage_notes(&self) -> Option<&str> {
        self.triage_notes.as_deref()
    }

    /// Derived urgency; lower is seen sooner.
    #[must_use]
    pub const fn priority_score(&self) -> f64 {
        self.priority_score
    }

    /// 1-based rank among waiting admissions.
    #[must_use]
    pub const fn queue_position(&self) -> Option<u32> {
        self.queue_position
    }

    /// Estimated minutes until a bed, while waiting.
    #[must_use]
    pub const fn estimated_wait_time(&self) -> Option<u32> {
        self.estimated_wait_time
    }

    /// Minutes spent waiting before a bed was assigned.
    #[must_use]
    pub const fn actual_wait_minutes(&self) -> Option<u64> {
        self.actual_wait_minutes
    }

    /// Bed held while active.
    #[must_use]
    pub const fn bed(&self) -> Option<BedId> {
        self.bed
    }

    /// Submission time.
    #[must_use]
    pub const fn created_at_ms(&self) -> u128 {
        self.created_at_ms
    }

    /// Last modification time.
    #[must_use]
    pub const fn updated_at_ms(&self) -> u128 {
        self.updated_at_ms
    }

    /// When the admission first took a bed.
    #[must_use]
    pub const fn admission_date_ms(&self) -> Option<u128> {
        self.admission_date_ms
    }

    /// When the admission was discharged.
    #[must_use]
    pub const fn discharge_date_ms(&self) -> Option<u128> {
        self.discharge_date_ms
    }

    /// Waiting or active.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.status, AdmissionStatus::Discharged)
    }

    pub(crate) fn set_priority_score(&mut self, score: f64) {
        self.priority_score = score;
    }

    pub(crate) fn set_queue_slot(&mut self, position: u32, estimated_wait: u32) {
        self.queue_position = Some(position);
        self.estimated_wait_time = Some(estimated_wait);
    }

    pub(crate) fn clear_queue_slot(&mut self) {
        self.queue_position = None;
        self.estimated_wait_time = None;
    }

    pub(crate) fn set_triage(
        &mut self,
        category: TriageCategory,
        notes: Option<String>,
        now_ms: u128,
    ) {
        self.priority_level = category;
        if notes.is_some() {
            self.triage_notes = notes;
        }
        self.updated_at_ms = now_ms;
    }

    pub(crate) fn activate(&mut self, bed: BedId, now_ms: u128) {
        self.status = AdmissionStatus::Active;
        self.bed = Some(bed);
        self.admission_date_ms.get_or_insert(now_ms);
        let waited = now_ms.saturating_sub(self.created_at_ms) / MS_PER_MINUTE;
        self.actual_wait_minutes = Some(u64::try_from(waited).unwrap_or(u64::MAX));
        self.updated_at_ms = now_ms;
        self.clear_queue_slot();
    }

    pub(crate) fn discharge(&mut self, now_ms: u128) {
        self.status = AdmissionStatus::Discharged;
        self.bed = None;
        self.discharge_date_ms.get_or_insert(now_ms);
        self.updated_at_ms = now_ms;
        self.clear_queue_slot();
    }
}

/// Admission records plus the patient indexes kept in step with every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRegistry {
    next_id: AdmissionId,
    records: BTreeMap<AdmissionId, Admission>,
    active_by_patient: BTreeMap<PatientId, AdmissionId>,
    waiting_by_patient: BTreeMap<PatientId, AdmissionId>,
}

impl AdmissionRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a waiting admission and return its id.
    ///
    /// # Errors
    ///
    /// `Conflict` when the next id is already taken, which only happens with a corrupt
    /// id counter. Nothing changes on error.
    pub fn create(&mut self, draft: AdmissionDraft, now_ms: u128) -> Result<AdmissionId, SchedulerError> {
        let id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| SchedulerError::Conflict("admission ids exhausted".into()))?;
        if self.records.contains_key(&id) {
            return Err(SchedulerError::Conflict(format!("admission id {id} already in use")));
        }
        self.next_id = id;
        let admission = Admission::new(id, draft, now_ms);
        self.waiting_by_patient.insert(admission.patient_id, id);
        self.records.insert(id, admission);
        Ok(id)
    }

    /// Look up an admission.
    #[must_use]
    pub fn get(&self, id: AdmissionId) -> Option<&Admission> {
        self.records.get(&id)
    }

    /// Number of records, including discharged ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no admission was ever recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Admission> + '_ {
        self.records.values()
    }

    /// Waiting admissions in id order.
    pub fn waiting(&self) -> impl Iterator<Item = &Admission> + '_ {
        self.records
            .values()
            .filter(|a| a.status == AdmissionStatus::Waiting)
    }

    /// The patient's active admission.
    #[must_use]
    pub fn current_admission(&self, patient_id: PatientId) -> Option<&Admission> {
        self.active_by_patient
            .get(&patient_id)
            .and_then(|id| self.records.get(id))
    }

    /// The patient's waiting or active admission.
    #[must_use]
    pub fn open_admission(&self, patient_id: PatientId) -> Option<&Admission> {
        self.current_admission(patient_id).or_else(|| {
            self.waiting_by_patient
                .get(&patient_id)
                .and_then(|id| self.records.get(id))
        })
    }

    /// Apply `f` to one admission and re-sync the patient indexes with its new status.
    pub(crate) fn update<R>(
        &mut self,
        id: AdmissionId,
        f: impl FnOnce(&mut Admission) -> Result<R, SchedulerError>,
    ) -> Result<R, SchedulerError> {
        let admission = self
            .records
            .get_mut(&id)
            .ok_or_else(|| SchedulerError::NotFound(format!("admission {id}")))?;
        let out = f(admission)?;

        let patient = admission.patient_id;
        let status = admission.status;
        if self.active_by_patient.get(&patient) == Some(&id) {
            self.active_by_patient.remove(&patient);
        }
        if self.waiting_by_patient.get(&patient) == Some(&id) {
            self.waiting_by_patient.remove(&patient);
        }
        match status {
            AdmissionStatus::Active => {
                self.active_by_patient.insert(patient, id);
            }
            AdmissionStatus::Waiting => {
                self.waiting_by_patient.insert(patient, id);
            }
            AdmissionStatus::Discharged => {}
        }
        Ok(out)
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut Admission> + '_ {
        self.records.values_mut()
    }

    /// Check that the id counter is past every record and that the patient indexes agree
    /// with record statuses.
    pub fn verify_indexes(&self) -> Result<(), String> {
        if let Some(&highest) = self.records.keys().next_back() {
            if self.next_id < highest {
                return Err(format!(
                    "id counter {} is behind admission {highest}",
                    self.next_id
                ));
            }
        }
        for admission in self.records.values() {
            let (index, other) = match admission.status {
                AdmissionStatus::Active => (&self.active_by_patient, &self.waiting_by_patient),
                AdmissionStatus::Waiting => (&self.waiting_by_patient, &self.active_by_patient),
                AdmissionStatus::Discharged => continue,
            };
            if index.get(&admission.patient_id) != Some(&admission.id) {
                return Err(format!(
                    "admission {} missing from {} index",
                    admission.id, admission.status
                ));
            }
            if other.contains_key(&admission.patient_id) {
                return Err(format!(
                    "patient {} has more than one open admission",
                    admission.patient_id
                ));
            }
        }
        let indexed = self.active_by_patient.len() + self.waiting_by_patient.len();
        let open = self.records.values().filter(|a| a.is_open()).count();
        if indexed != open {
            return Err(format!("{indexed} indexed admissions but {open} open records"));
        }
        Ok(())
    }
}
