//! Admission scheduler and the traits it is built on.
//!
//! The scheduler owns one hospital's beds and admissions behind a single
//! `parking_lot::Mutex`. Each operation runs as a transaction: it clones the committed
//! snapshot, applies the change, hands the result to the [`AdmissionStore`] and only then
//! replaces the in-memory state. A failed operation therefore leaves nothing behind, and
//! two concurrent submissions can never both win the same bed.
//!
//! After a successful commit the scheduler records audit events and notifies
//! subscribers before releasing the state lock, so every observer sees events in commit
//! order. The state lock is always taken before the audit and subscriber locks.

use std::collections::BTreeMap;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::admission::{Admission, AdmissionDraft, AdmissionRegistry, AdmissionStatus};
use crate::core::bed_pool::{Bed, BedPool, BedStatus, WardOccupancy, WardType};
use crate::core::priority_queue::{PriorityPolicy, PriorityQueue, QueueSlot};
use crate::core::{build_audit_event, AuditSink, SchedulerError, TriageCategory};
use crate::util::clock::MS_PER_HOUR;
use crate::util::serde::{AdmissionId, BedId, PatientId, StaffId};

/// Read-only view of a patient from the external directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    /// Patient identifier.
    pub id: PatientId,
    /// Display name.
    pub name: String,
    /// Age in years, when known.
    pub age: Option<u32>,
}

/// Lookup contract of the patient directory. The scheduler never mutates patients.
pub trait PatientDirectory: Send + Sync {
    /// Find a patient by id.
    fn lookup(&self, id: PatientId) -> Option<PatientSummary>;
}

/// Everything the scheduler persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HospitalSnapshot {
    /// Wards and beds.
    pub beds: BedPool,
    /// Admission records.
    pub admissions: AdmissionRegistry,
}

impl HospitalSnapshot {
    /// Snapshot with the given bed layout and no admissions.
    #[must_use]
    pub fn new(beds: BedPool) -> Self {
        Self {
            beds,
            admissions: AdmissionRegistry::new(),
        }
    }

    /// Check the cross-record invariants: the bed layout is well formed, bed occupancy
    /// mirrors active admissions one to one, and the admission registry is consistent.
    pub fn validate(&self) -> Result<(), String> {
        self.beds.verify_layout()?;
        let mut held: BTreeMap<BedId, AdmissionId> = BTreeMap::new();
        for admission in self.admissions.iter() {
            match (admission.status(), admission.bed()) {
                (AdmissionStatus::Active, Some(bed_id)) => {
                    if let Some(other) = held.insert(bed_id, admission.id()) {
                        return Err(format!(
                            "bed {bed_id} held by admissions {other} and {}",
                            admission.id()
                        ));
                    }
                    let bed = self
                        .beds
                        .bed(bed_id)
                        .ok_or_else(|| format!("admission {} holds unknown bed {bed_id}", admission.id()))?;
                    if bed.occupant().map(|o| o.admission_id) != Some(admission.id()) {
                        return Err(format!(
                            "bed {bed_id} does not record admission {}",
                            admission.id()
                        ));
                    }
                }
                (AdmissionStatus::Active, None) => {
                    return Err(format!("active admission {} has no bed", admission.id()));
                }
                (_, Some(bed_id)) => {
                    return Err(format!(
                        "{} admission {} still references bed {bed_id}",
                        admission.status(),
                        admission.id()
                    ));
                }
                (_, None) => {}
            }
        }
        let occupied = self.beds.beds().filter(|b| b.is_occupied()).count();
        if occupied != held.len() {
            return Err(format!(
                "{occupied} occupied beds but {} active admissions",
                held.len()
            ));
        }
        self.admissions.verify_indexes()
    }
}

/// Persistence contract: the committed snapshot is the source of truth.
pub trait AdmissionStore: Send {
    /// Load the last committed snapshot, if any.
    fn load(&mut self) -> Result<Option<HospitalSnapshot>, SchedulerError>;
    /// Durably replace the committed snapshot. Must be all-or-nothing.
    fn commit(&mut self, snapshot: &HospitalSnapshot) -> Result<(), SchedulerError>;
}

impl AdmissionStore for Box<dyn AdmissionStore> {
    fn load(&mut self) -> Result<Option<HospitalSnapshot>, SchedulerError> {
        (**self).load()
    }

    fn commit(&mut self, snapshot: &HospitalSnapshot) -> Result<(), SchedulerError> {
        (**self).commit(snapshot)
    }
}

/// Time and actor of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpContext {
    /// Acting staff member; `None` for system-triggered work.
    pub actor: Option<StaffId>,
    /// Current time in milliseconds since the Unix epoch.
    pub now_ms: u128,
}

impl OpContext {
    /// Operation performed by a staff member.
    #[must_use]
    pub const fn by(actor: StaffId, now_ms: u128) -> Self {
        Self {
            actor: Some(actor),
            now_ms,
        }
    }

    /// Operation performed by the system itself.
    #[must_use]
    pub const fn system(now_ms: u128) -> Self {
        Self { actor: None, now_ms }
    }
}

/// A request to admit a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    /// Patient to admit.
    pub patient_id: PatientId,
    /// Ward type to queue for. Required unless a free bed is requested.
    pub ward_type: Option<WardType>,
    /// Triage category; standard when absent.
    pub priority_level: Option<TriageCategory>,
    /// Specific bed to take directly if it is free.
    pub requested_bed: Option<BedId>,
    /// Reason for admission.
    pub admission_reason: String,
    /// Presenting complaint.
    pub chief_complaint: Option<String>,
    /// Free-form notes.
    pub admission_notes: Option<String>,
    /// Equipment or placement needs.
    pub special_requirements: Option<String>,
}

impl AdmissionRequest {
    /// Request with only the required fields.
    pub fn new(patient_id: PatientId, admission_reason: impl Into<String>) -> Self {
        Self {
            patient_id,
            ward_type: None,
            priority_level: None,
            requested_bed: None,
            admission_reason: admission_reason.into(),
            chief_complaint: None,
            admission_notes: None,
            special_requirements: None,
        }
    }

    /// Set the ward type.
    #[must_use]
    pub const fn with_ward_type(mut self, ward_type: WardType) -> Self {
        self.ward_type = Some(ward_type);
        self
    }

    /// Set the triage category.
    #[must_use]
    pub const fn with_priority(mut self, category: TriageCategory) -> Self {
        self.priority_level = Some(category);
        self
    }

    /// Ask for a specific bed.
    #[must_use]
    pub const fn with_requested_bed(mut self, bed_id: BedId) -> Self {
        self.requested_bed = Some(bed_id);
        self
    }

    /// Set the chief complaint.
    #[must_use]
    pub fn with_chief_complaint(mut self, complaint: impl Into<String>) -> Self {
        self.chief_complaint = Some(complaint.into());
        self
    }

    /// Set admission notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.admission_notes = Some(notes.into());
        self
    }

    /// Set special requirements.
    #[must_use]
    pub fn with_special_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.special_requirements = Some(requirements.into());
        self
    }

    fn into_draft(self, ward_type: WardType, actor: Option<StaffId>) -> AdmissionDraft {
        AdmissionDraft {
            patient_id: self.patient_id,
            ward_type,
            priority_level: self.priority_level.unwrap_or_default(),
            attending_staff_id: actor,
            admission_reason: self.admission_reason.trim().to_string(),
            chief_complaint: self.chief_complaint,
            admission_notes: self.admission_notes,
            special_requirements: self.special_requirements,
        }
    }
}

/// Notification emitted after a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AdmissionEvent {
    /// A new admission was recorded.
    Submitted {
        /// New admission.
        admission_id: AdmissionId,
        /// Its patient.
        patient_id: PatientId,
        /// Triage category at submission.
        category: TriageCategory,
    },
    /// An admission joined the waiting queue.
    Enqueued {
        /// Waiting admission.
        admission_id: AdmissionId,
        /// Ward type it waits for.
        ward_type: WardType,
    },
    /// An admission took a bed and became active.
    BedAssigned {
        /// Now-active admission.
        admission_id: AdmissionId,
        /// Its bed.
        bed_id: BedId,
    },
    /// An admission was discharged and its bed released.
    Discharged {
        /// Discharged admission.
        admission_id: AdmissionId,
        /// Released bed.
        bed_id: BedId,
    },
    /// Triage category changed.
    TriageUpdated {
        /// Re-triaged admission.
        admission_id: AdmissionId,
        /// New category.
        category: TriageCategory,
    },
    /// A bed entered or left maintenance.
    BedStatusChanged {
        /// Affected bed.
        bed_id: BedId,
        /// New status.
        status: BedStatus,
    },
    /// The waiting queue was rebuilt.
    QueueRecomputed {
        /// Waiting admissions after the rebuild.
        waiting: usize,
    },
}

impl AdmissionEvent {
    /// Audit action name.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submit",
            Self::Enqueued { .. } => "enqueue",
            Self::BedAssigned { .. } => "assign",
            Self::Discharged { .. } => "discharge",
            Self::TriageUpdated { .. } => "triage",
            Self::BedStatusChanged { .. } => "bed_status",
            Self::QueueRecomputed { .. } => "recompute",
        }
    }

    const fn admission_id(&self) -> Option<AdmissionId> {
        match self {
            Self::Submitted { admission_id, .. }
            | Self::Enqueued { admission_id, .. }
            | Self::BedAssigned { admission_id, .. }
            | Self::Discharged { admission_id, .. }
            | Self::TriageUpdated { admission_id, .. } => Some(*admission_id),
            Self::BedStatusChanged { .. } | Self::QueueRecomputed { .. } => None,
        }
    }

    const fn bed_id(&self) -> Option<BedId> {
        match self {
            Self::BedAssigned { bed_id, .. }
            | Self::Discharged { bed_id, .. }
            | Self::BedStatusChanged { bed_id, .. } => Some(*bed_id),
            _ => None,
        }
    }
}

/// Dashboard figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Admissions holding a bed.
    pub active: usize,
    /// Admissions in the queue.
    pub waiting: usize,
    /// Historical admissions.
    pub discharged: usize,
    /// Free beds across all wards.
    pub available_beds: usize,
    /// Free beds in emergency-room wards.
    pub available_er_beds: usize,
    /// Mean estimated wait of the queue in minutes (0 when empty).
    pub average_estimated_wait_minutes: f64,
    /// Open admissions per triage category.
    pub triage_counts: BTreeMap<TriageCategory, usize>,
    /// Mean length of completed stays in days.
    pub average_length_of_stay_days: Option<f64>,
}

struct Inner<S> {
    state: HospitalSnapshot,
    store: S,
}

/// Serialized admission scheduler for one hospital.
pub struct AdmissionScheduler<S> {
    queue: PriorityQueue,
    inner: Mutex<Inner<S>>,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
    directory: Option<Arc<dyn PatientDirectory>>,
    subscribers: Mutex<Vec<Sender<AdmissionEvent>>>,
}

impl<S: AdmissionStore> AdmissionScheduler<S> {
    /// Open a scheduler over `store`.
    ///
    /// A previously committed snapshot wins over `layout`; otherwise `layout` is committed
    /// as the initial state. A loaded snapshot that breaks the bed/admission invariants is
    /// rejected as a backend error.
    pub fn open(policy: PriorityPolicy, layout: BedPool, mut store: S) -> Result<Self, SchedulerError> {
        policy
            .validate()
            .map_err(|e| SchedulerError::Validation(format!("policy invalid: {e}")))?;

        let state = if let Some(snapshot) = store.load()? {
            snapshot
                .validate()
                .map_err(|e| SchedulerError::Backend(format!("stored snapshot invalid: {e}")))?;
            tracing::info!(
                admissions = snapshot.admissions.len(),
                "restored scheduler state from store"
            );
            snapshot
        } else {
            let snapshot = HospitalSnapshot::new(layout);
            store.commit(&snapshot)?;
            tracing::info!("initialised scheduler state");
            snapshot
        };

        Ok(Self {
            queue: PriorityQueue::new(policy),
            inner: Mutex::new(Inner { state, store }),
            audit: None,
            directory: None,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Attach a patient directory; submissions for unknown patients are then rejected.
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn PatientDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Scoring policy in use.
    #[must_use]
    pub const fn policy(&self) -> &PriorityPolicy {
        self.queue.policy()
    }

    /// Receive events for every mutation committed from now on.
    pub fn subscribe(&self) -> Receiver<AdmissionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Admit a patient: straight into a requested free bed, else into the queue, taking
    /// a free bed of the right ward type immediately when one exists.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank reason or a missing ward type on the queue path,
    /// `NotFound` for an unknown patient or requested bed, `Conflict` when the patient
    /// already has a waiting or active admission.
    pub fn submit_admission(
        &self,
        ctx: OpContext,
        request: AdmissionRequest,
    ) -> Result<Admission, SchedulerError> {
        if request.admission_reason.trim().is_empty() {
            return Err(SchedulerError::Validation("admission reason is required".into()));
        }
        if let Some(directory) = &self.directory {
            if directory.lookup(request.patient_id).is_none() {
                return Err(SchedulerError::NotFound(format!("patient {}", request.patient_id)));
            }
        }

        self.transact(ctx, |state, events| {
            let HospitalSnapshot { beds, admissions } = state;
            let now = ctx.now_ms;

            if let Some(open) = admissions.open_admission(request.patient_id) {
                return Err(SchedulerError::Conflict(format!(
                    "patient {} already has {} admission {}",
                    request.patient_id,
                    open.status(),
                    open.id()
                )));
            }

            let mut requested_ward = None;
            if let Some(bed_id) = request.requested_bed {
                let bed = beds
                    .bed(bed_id)
                    .ok_or_else(|| SchedulerError::NotFound(format!("bed {bed_id}")))?;
                let bed_ward = beds.ward_type_of(bed_id)?;
                if bed.is_free() {
                    let ward_type = request.ward_type.unwrap_or(bed_ward);
                    let category = request.priority_level.unwrap_or_default();
                    let patient_id = request.patient_id;
                    let id = admissions.create(request.into_draft(ward_type, ctx.actor), now)?;
                    admissions.update(id, |adm| {
                        self.queue.update_priority_score(adm, now);
                        beds.allocate(bed_id, adm, now)
                    })?;
                    events.push(AdmissionEvent::Submitted {
                        admission_id: id,
                        patient_id,
                        category,
                    });
                    events.push(AdmissionEvent::BedAssigned {
                        admission_id: id,
                        bed_id,
                    });
                    tracing::info!(admission = id, bed = bed_id, "admitted directly to requested bed");
                    return Self::cloned(admissions, id);
                }
                tracing::debug!(bed = bed_id, "requested bed unavailable, queueing");
                requested_ward = Some(bed_ward);
            }

            let ward_type = request.ward_type.or(requested_ward).ok_or_else(|| {
                SchedulerError::Validation("ward type is required to join the admission queue".into())
            })?;
            let category = request.priority_level.unwrap_or_default();
            let patient_id = request.patient_id;
            let id = admissions.create(request.into_draft(ward_type, ctx.actor), now)?;
            admissions.update(id, |adm| Ok(self.queue.update_priority_score(adm, now)))?;
            events.push(AdmissionEvent::Submitted {
                admission_id: id,
                patient_id,
                category,
            });

            let free_bed = beds.find_available(ward_type).next().map(|b| b.id);
            if let Some(bed_id) = free_bed {
                admissions.update(id, |adm| beds.allocate(bed_id, adm, now))?;
                events.push(AdmissionEvent::BedAssigned {
                    admission_id: id,
                    bed_id,
                });
                tracing::info!(admission = id, bed = bed_id, %ward_type, "admitted to free bed");
            } else {
                events.push(AdmissionEvent::Enqueued {
                    admission_id: id,
                    ward_type,
                });
                tracing::info!(admission = id, %ward_type, %category, "admission queued");
            }

            let slots = self.queue.recompute_queue(admissions, now);
            events.push(AdmissionEvent::QueueRecomputed { waiting: slots.len() });
            Self::cloned(admissions, id)
        })
    }

    /// Put a waiting admission into a specific free bed.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Conflict` for an occupied or out-of-service bed,
    /// `InvalidState` when the admission is not waiting.
    pub fn assign_bed(
        &self,
        ctx: OpContext,
        admission_id: AdmissionId,
        bed_id: BedId,
    ) -> Result<Admission, SchedulerError> {
        self.transact(ctx, |state, events| {
            let HospitalSnapshot { beds, admissions } = state;
            admissions.update(admission_id, |adm| beds.allocate(bed_id, adm, ctx.now_ms))?;
            events.push(AdmissionEvent::BedAssigned {
                admission_id,
                bed_id,
            });
            let slots = self.queue.recompute_queue(admissions, ctx.now_ms);
            events.push(AdmissionEvent::QueueRecomputed { waiting: slots.len() });
            tracing::info!(admission = admission_id, bed = bed_id, "bed assigned manually");
            Self::cloned(admissions, admission_id)
        })
    }

    /// Discharge an active admission, release its bed and offer the bed to the queue.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown admission, `InvalidState` unless it is active.
    pub fn discharge(&self, ctx: OpContext, admission_id: AdmissionId) -> Result<Admission, SchedulerError> {
        self.transact(ctx, |state, events| {
            let HospitalSnapshot { beds, admissions } = state;
            let now = ctx.now_ms;
            let admission = admissions
                .get(admission_id)
                .ok_or_else(|| SchedulerError::NotFound(format!("admission {admission_id}")))?;
            if admission.status() != AdmissionStatus::Active {
                return Err(SchedulerError::InvalidState(format!(
                    "admission {admission_id} is {}, only active admissions can be discharged",
                    admission.status()
                )));
            }
            let bed_id = admission.bed().ok_or_else(|| {
                SchedulerError::InvalidState(format!("active admission {admission_id} has no bed"))
            })?;

            beds.release(bed_id)?;
            admissions.update(admission_id, |adm| {
                adm.discharge(now);
                Ok(())
            })?;
            events.push(AdmissionEvent::Discharged {
                admission_id,
                bed_id,
            });
            tracing::info!(admission = admission_id, bed = bed_id, "admission discharged");

            let discharged = Self::cloned(admissions, admission_id)?;
            self.fill_bed(beds, admissions, bed_id, now, events)?;
            Ok(discharged)
        })
    }

    /// Change an open admission's triage category and re-rank the queue.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown admission, `InvalidState` when it is discharged.
    pub fn update_triage(
        &self,
        ctx: OpContext,
        admission_id: AdmissionId,
        category: TriageCategory,
        notes: Option<String>,
    ) -> Result<Admission, SchedulerError> {
        self.transact(ctx, |state, events| {
            let admissions = &mut state.admissions;
            let now = ctx.now_ms;
            admissions.update(admission_id, |adm| {
                if adm.status() == AdmissionStatus::Discharged {
                    return Err(SchedulerError::InvalidState(format!(
                        "admission {admission_id} is discharged"
                    )));
                }
                adm.set_triage(category, notes, now);
                Ok(self.queue.update_priority_score(adm, now))
            })?;
            events.push(AdmissionEvent::TriageUpdated {
                admission_id,
                category,
            });
            let slots = self.queue.recompute_queue(admissions, now);
            events.push(AdmissionEvent::QueueRecomputed { waiting: slots.len() });
            tracing::info!(admission = admission_id, %category, "triage updated");
            Self::cloned(admissions, admission_id)
        })
    }

    /// Re-score and re-rank the waiting queue at `now_ms`.
    pub fn recompute_queue(&self, now_ms: u128) -> Result<Vec<QueueSlot>, SchedulerError> {
        self.transact(OpContext::system(now_ms), |state, events| {
            let slots = self.queue.recompute_queue(&mut state.admissions, now_ms);
            events.push(AdmissionEvent::QueueRecomputed { waiting: slots.len() });
            Ok(slots)
        })
    }

    /// Periodic re-evaluation: recompute the queue and report how many admissions wait.
    /// A pass that moves no score, position or estimate is not committed.
    pub fn rescore(&self, now_ms: u128) -> Result<usize, SchedulerError> {
        let slots = self.recompute_queue(now_ms)?;
        tracing::debug!(waiting = slots.len(), "rescore complete");
        Ok(slots.len())
    }

    /// Move a bed in or out of maintenance. A bed returning to service is offered to the
    /// queue straight away.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown bed, `Conflict` when taking an occupied bed out of service.
    pub fn set_bed_status(
        &self,
        ctx: OpContext,
        bed_id: BedId,
        status: BedStatus,
    ) -> Result<Option<Admission>, SchedulerError> {
        self.transact(ctx, |state, events| {
            let HospitalSnapshot { beds, admissions } = state;
            if !beds.set_status(bed_id, status, ctx.now_ms)? {
                return Ok(None);
            }
            events.push(AdmissionEvent::BedStatusChanged { bed_id, status });
            tracing::info!(bed = bed_id, ?status, "bed status changed");
            if status == BedStatus::InService {
                let filled = self.fill_bed(beds, admissions, bed_id, ctx.now_ms, events)?;
                return filled.map(|id| Self::cloned(admissions, id)).transpose();
            }
            Ok(None)
        })
    }

    /// Look up an admission.
    #[must_use]
    pub fn admission(&self, id: AdmissionId) -> Option<Admission> {
        self.inner.lock().state.admissions.get(id).cloned()
    }

    /// The patient's active admission.
    #[must_use]
    pub fn current_admission(&self, patient_id: PatientId) -> Option<Admission> {
        self.inner
            .lock()
            .state
            .admissions
            .current_admission(patient_id)
            .cloned()
    }

    /// The patient's waiting or active admission.
    #[must_use]
    pub fn open_admission(&self, patient_id: PatientId) -> Option<Admission> {
        self.inner
            .lock()
            .state
            .admissions
            .open_admission(patient_id)
            .cloned()
    }

    /// Waiting admissions in queue order, as of the last recompute.
    #[must_use]
    pub fn waiting_queue(&self) -> Vec<Admission> {
        let inner = self.inner.lock();
        let mut waiting: Vec<Admission> = inner.state.admissions.waiting().cloned().collect();
        waiting.sort_by_key(|a| (a.queue_position().unwrap_or(u32::MAX), a.id()));
        waiting
    }

    /// Open admissions for display: active first by admission date, then waiting by
    /// score and arrival.
    #[must_use]
    pub fn admission_board(&self) -> Vec<Admission> {
        let inner = self.inner.lock();
        let mut open: Vec<Admission> = inner
            .state
            .admissions
            .iter()
            .filter(|a| a.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| {
            let rank = |adm: &Admission| u8::from(adm.status() != AdmissionStatus::Active);
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.priority_score().total_cmp(&b.priority_score()))
                .then_with(|| a.admission_date_ms().cmp(&b.admission_date_ms()))
                .then_with(|| a.created_at_ms().cmp(&b.created_at_ms()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        open
    }

    /// Free beds of a ward type in allocation order.
    #[must_use]
    pub fn find_available(&self, ward_type: WardType) -> Vec<Bed> {
        self.inner
            .lock()
            .state
            .beds
            .find_available(ward_type)
            .cloned()
            .collect()
    }

    /// Occupancy per ward.
    #[must_use]
    pub fn ward_occupancy(&self) -> Vec<WardOccupancy> {
        self.inner.lock().state.beds.occupancy()
    }

    /// Copy of the committed state.
    #[must_use]
    pub fn snapshot(&self) -> HospitalSnapshot {
        self.inner.lock().state.clone()
    }

    /// Dashboard figures from the committed state.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> SchedulerStats {
        let inner = self.inner.lock();
        let state = &inner.state;
        let mut stats = SchedulerStats::default();
        let mut wait_total = 0_u64;
        let mut stay_total_ms = 0_u128;
        let mut stays = 0_usize;

        for admission in state.admissions.iter() {
            match admission.status() {
                AdmissionStatus::Active => stats.active += 1,
                AdmissionStatus::Waiting => {
                    stats.waiting += 1;
                    wait_total += u64::from(admission.estimated_wait_time().unwrap_or(0));
                }
                AdmissionStatus::Discharged => {
                    stats.discharged += 1;
                    if let (Some(start), Some(end)) =
                        (admission.admission_date_ms(), admission.discharge_date_ms())
                    {
                        stay_total_ms += end.saturating_sub(start);
                        stays += 1;
                    }
                }
            }
            if admission.is_open() {
                *stats.triage_counts.entry(admission.priority_level()).or_insert(0) += 1;
            }
        }

        for bed in state.beds.beds().filter(|b| b.is_free()) {
            stats.available_beds += 1;
            if state.beds.ward(bed.ward_id).is_some_and(|w| w.is_er) {
                stats.available_er_beds += 1;
            }
        }
        if stats.waiting > 0 {
            stats.average_estimated_wait_minutes = wait_total as f64 / stats.waiting as f64;
        }
        if stays > 0 {
            let day_ms = (24 * MS_PER_HOUR) as f64;
            stats.average_length_of_stay_days = Some(stay_total_ms as f64 / day_ms / stays as f64);
        }
        stats
    }

    /// Offer a just-freed bed to the best waiting admission of the same ward type.
    fn fill_bed(
        &self,
        beds: &mut BedPool,
        admissions: &mut AdmissionRegistry,
        bed_id: BedId,
        now_ms: u128,
        events: &mut Vec<AdmissionEvent>,
    ) -> Result<Option<AdmissionId>, SchedulerError> {
        let slots = self.queue.recompute_queue(admissions, now_ms);
        let free = beds.bed(bed_id).is_some_and(Bed::is_free);
        let ward_type = beds.ward_type_of(bed_id)?;
        let candidate = slots
            .iter()
            .find(|slot| slot.ward_type == ward_type)
            .map(|slot| slot.admission_id);

        let assigned = match candidate {
            Some(admission_id) if free => {
                admissions.update(admission_id, |adm| beds.allocate(bed_id, adm, now_ms))?;
                events.push(AdmissionEvent::BedAssigned {
                    admission_id,
                    bed_id,
                });
                tracing::info!(admission = admission_id, bed = bed_id, "queued admission moved into freed bed");
                Some(admission_id)
            }
            _ => None,
        };

        let waiting = if assigned.is_some() {
            self.queue.recompute_queue(admissions, now_ms).len()
        } else {
            slots.len()
        };
        events.push(AdmissionEvent::QueueRecomputed { waiting });
        Ok(assigned)
    }

    fn cloned(admissions: &AdmissionRegistry, id: AdmissionId) -> Result<Admission, SchedulerError> {
        admissions
            .get(id)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(format!("admission {id}")))
    }

    /// Run `op` against a copy of the state, commit it, then publish while still holding
    /// the state lock so events leave in commit order. A run that changes nothing is
    /// neither committed nor published.
    fn transact<R>(
        &self,
        ctx: OpContext,
        op: impl FnOnce(&mut HospitalSnapshot, &mut Vec<AdmissionEvent>) -> Result<R, SchedulerError>,
    ) -> Result<R, SchedulerError> {
        let mut events = Vec::new();
        let mut inner = self.inner.lock();
        let mut working = inner.state.clone();
        let out = op(&mut working, &mut events)?;
        if working == inner.state {
            tracing::trace!("no state change, skipping commit");
            return Ok(out);
        }
        inner.store.commit(&working)?;
        inner.state = working;
        self.publish(ctx, &events);
        drop(inner);
        Ok(out)
    }

    fn publish(&self, ctx: OpContext, events: &[AdmissionEvent]) {
        if events.is_empty() {
            return;
        }
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            for event in events {
                sink.record(build_audit_event(
                    event.admission_id(),
                    event.bed_id(),
                    ctx.actor,
                    event.action(),
                    ctx.now_ms,
                    serde_json::to_string(event).ok(),
                ));
            }
        }
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }
}
