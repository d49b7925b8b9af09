//! Priority scoring and queue ordering for waiting admissions.
//!
//! A waiting admission's score starts at its triage weight and drops by one point for
//! every `hours_per_point` hours waited, up to `max_time_boost` points, never below 1.
//! The queue is rebuilt from scratch on every event: waiting admissions are re-scored,
//! sorted by `(score, created_at)`, and given 1-based positions and wait estimates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::admission::{Admission, AdmissionRegistry, AdmissionStatus};
use crate::core::bed_pool::WardType;
use crate::core::TriageCategory;
use crate::util::clock::MS_PER_HOUR;
use crate::util::serde::{AdmissionId, PatientId};

/// Lowest score any admission can reach.
pub const MIN_PRIORITY_SCORE: f64 = 1.0;

/// Tunables of the scoring and wait-estimate formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityPolicy {
    /// Minutes of treatment assumed per admission ahead in the queue.
    pub average_treatment_minutes: u32,
    /// Hours of waiting worth one point of urgency.
    pub hours_per_point: f64,
    /// Cap on the urgency gained from waiting.
    pub max_time_boost: f64,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            average_treatment_minutes: 30,
            hours_per_point: 2.0,
            max_time_boost: 3.0,
        }
    }
}

impl PriorityPolicy {
    /// Validate policy values.
    pub fn validate(&self) -> Result<(), String> {
        if self.average_treatment_minutes == 0 {
            return Err("average_treatment_minutes must be greater than 0".into());
        }
        if !(self.hours_per_point.is_finite() && self.hours_per_point > 0.0) {
            return Err("hours_per_point must be a positive number".into());
        }
        if !(self.max_time_boost.is_finite() && self.max_time_boost >= 0.0) {
            return Err("max_time_boost must be a non-negative number".into());
        }
        Ok(())
    }
}

/// One row of the recomputed queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSlot {
    /// Waiting admission.
    pub admission_id: AdmissionId,
    /// Its patient.
    pub patient_id: PatientId,
    /// Ward type it waits for.
    pub ward_type: WardType,
    /// Triage category.
    pub category: TriageCategory,
    /// Score at recompute time.
    pub priority_score: f64,
    /// 1-based rank.
    pub position: u32,
    /// Estimated minutes until a bed.
    pub estimated_wait_minutes: u32,
}

/// Sort key: lower score first, FIFO within equal scores, id as final tiebreak.
#[derive(Debug, Clone, Copy)]
struct QueueKey {
    score: f64,
    created_at_ms: u128,
    id: AdmissionId,
}

impl QueueKey {
    const fn of(admission: &Admission) -> Self {
        Self {
            score: admission.priority_score(),
            created_at_ms: admission.created_at_ms(),
            id: admission.id(),
        }
    }
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueKey {}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.created_at_ms.cmp(&other.created_at_ms))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Computes scores and orders the waiting set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriorityQueue {
    policy: PriorityPolicy,
}

impl PriorityQueue {
    /// Queue manager using `policy`.
    #[must_use]
    pub const fn new(policy: PriorityPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> &PriorityPolicy {
        &self.policy
    }

    /// Score of `category` after waiting from `created_at_ms` until `now_ms`.
    ///
    /// A `now_ms` earlier than `created_at_ms` counts as no wait.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, category: TriageCategory, created_at_ms: u128, now_ms: u128) -> f64 {
        let base = f64::from(category.weight());
        let waited_ms = now_ms.saturating_sub(created_at_ms);
        let wait_hours = waited_ms as f64 / MS_PER_HOUR as f64;
        let time_factor = (wait_hours / self.policy.hours_per_point).min(self.policy.max_time_boost);
        (base - time_factor).max(MIN_PRIORITY_SCORE)
    }

    /// Recompute and store an admission's score at `now_ms`.
    pub fn update_priority_score(&self, admission: &mut Admission, now_ms: u128) -> f64 {
        let score = self.score(admission.priority_level(), admission.created_at_ms(), now_ms);
        admission.set_priority_score(score);
        score
    }

    /// Re-score, sort and rank every waiting admission.
    ///
    /// Non-waiting admissions lose any stale queue slot. Positions are the FIFO rank. The
    /// estimate is `(k + 1) * average_treatment_minutes` where `k` counts waiting
    /// admissions with a strictly lower score, so equal scores share one estimate.
    /// Ward types are not considered when counting who is ahead.
    pub fn recompute_queue(&self, registry: &mut AdmissionRegistry, now_ms: u128) -> Vec<QueueSlot> {
        let mut keys = Vec::new();
        for admission in registry.records_mut() {
            if admission.status() == AdmissionStatus::Waiting {
                self.update_priority_score(admission, now_ms);
                keys.push(QueueKey::of(admission));
            } else {
                admission.clear_queue_slot();
            }
        }
        keys.sort_unstable();

        let mut slots = Vec::with_capacity(keys.len());
        let mut run_start = 0;
        for (rank, key) in keys.iter().enumerate() {
            if rank > 0 && keys[rank - 1].score.total_cmp(&key.score) != Ordering::Equal {
                run_start = rank;
            }
            let position = u32::try_from(rank + 1).unwrap_or(u32::MAX);
            let tied_rank = u32::try_from(run_start + 1).unwrap_or(u32::MAX);
            let estimated = tied_rank.saturating_mul(self.policy.average_treatment_minutes);
            // Ids come from the registry walk above, so the update cannot miss.
            let slot = registry.update(key.id, |admission| {
                admission.set_queue_slot(position, estimated);
                Ok(QueueSlot {
                    admission_id: admission.id(),
                    patient_id: admission.patient_id,
                    ward_type: admission.ward_type,
                    category: admission.priority_level(),
                    priority_score: admission.priority_score(),
                    position,
                    estimated_wait_minutes: estimated,
                })
            });
            if let Ok(slot) = slot {
                slots.push(slot);
            }
        }
        tracing::debug!(waiting = slots.len(), "queue recomputed");
        slots
    }
}
