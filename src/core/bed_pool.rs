//! Ward and bed occupancy tracking.
//!
//! The pool is the only place where bed occupancy changes. A bed's occupant is set by
//! [`BedPool::allocate`] and cleared by [`BedPool::release`]; nothing else writes it, so a
//! bed is occupied exactly when an active admission references it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::admission::{Admission, AdmissionStatus};
use crate::core::SchedulerError;
use crate::util::serde::{AdmissionId, BedId, PatientId, WardId};

/// Kind of ward a bed belongs to and an admission waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WardType {
    /// Emergency room.
    Emergency,
    /// General medical ward.
    General,
    /// Intensive care.
    Icu,
    /// Children's ward.
    Pediatric,
    /// Maternity ward.
    Maternity,
    /// Surgical ward.
    Surgical,
}

impl WardType {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::General => "general",
            Self::Icu => "icu",
            Self::Pediatric => "pediatric",
            Self::Maternity => "maternity",
            Self::Surgical => "surgical",
        }
    }
}

impl fmt::Display for WardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WardType {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emergency" | "er" => Ok(Self::Emergency),
            "general" => Ok(Self::General),
            "icu" => Ok(Self::Icu),
            "pediatric" => Ok(Self::Pediatric),
            "maternity" => Ok(Self::Maternity),
            "surgical" => Ok(Self::Surgical),
            other => Err(SchedulerError::Validation(format!("unknown ward type `{other}`"))),
        }
    }
}

/// A ward groups beds of one type at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    /// Ward identifier.
    pub id: WardId,
    /// Display name.
    pub name: String,
    /// Ward type used for queue matching.
    pub ward_type: WardType,
    /// Floor number.
    pub floor: i32,
    /// Whether this ward counts toward emergency-room capacity.
    pub is_er: bool,
}

/// Service state of a bed, independent of occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedStatus {
    /// Usable for admissions.
    InService,
    /// Out of service for cleaning or repair.
    Maintenance,
}

/// Binding of a bed to the active admission that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Admission holding the bed.
    pub admission_id: AdmissionId,
    /// Patient of that admission.
    pub patient_id: PatientId,
    /// When the bed was taken.
    pub since_ms: u128,
}

/// A single bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    /// Bed identifier.
    pub id: BedId,
    /// Owning ward.
    pub ward_id: WardId,
    /// Bed number within the ward.
    pub number: u32,
    /// Equipment installed at the bed.
    pub equipment: Vec<String>,
    status: BedStatus,
    occupant: Option<Occupancy>,
    last_cleaned_ms: Option<u128>,
}

impl Bed {
    /// Current service state.
    #[must_use]
    pub const fn status(&self) -> BedStatus {
        self.status
    }

    /// Current occupant, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<&Occupancy> {
        self.occupant.as_ref()
    }

    /// Whether an active admission holds this bed.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// In service and unoccupied.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.occupant.is_none() && matches!(self.status, BedStatus::InService)
    }

    /// When the bed last came back from maintenance.
    #[must_use]
    pub const fn last_cleaned_ms(&self) -> Option<u128> {
        self.last_cleaned_ms
    }
}

/// Occupancy figures for one ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardOccupancy {
    /// Ward identifier.
    pub ward_id: WardId,
    /// Ward name.
    pub name: String,
    /// Ward type.
    pub ward_type: WardType,
    /// Beds held by active admissions.
    pub occupied: usize,
    /// Beds that can take a patient right now.
    pub available: usize,
    /// Beds under maintenance.
    pub maintenance: usize,
    /// All beds in the ward.
    pub total: usize,
}

/// All wards and beds of one hospital.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedPool {
    wards: BTreeMap<WardId, Ward>,
    beds: BTreeMap<BedId, Bed>,
    /// Bed ids sorted by `(ward id, bed number, bed id)`.
    order: Vec<BedId>,
}

impl BedPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ward.
    pub fn add_ward(&mut self, ward: Ward) -> Result<(), SchedulerError> {
        if self.wards.contains_key(&ward.id) {
            return Err(SchedulerError::Conflict(format!("ward {} already exists", ward.id)));
        }
        self.wards.insert(ward.id, ward);
        Ok(())
    }

    /// Register an in-service bed in an existing ward.
    pub fn add_bed(
        &mut self,
        id: BedId,
        ward_id: WardId,
        number: u32,
        equipment: Vec<String>,
    ) -> Result<(), SchedulerError> {
        if !self.wards.contains_key(&ward_id) {
            return Err(SchedulerError::NotFound(format!("ward {ward_id}")));
        }
        if self.beds.contains_key(&id) {
            return Err(SchedulerError::Conflict(format!("bed {id} already exists")));
        }
        if self
            .beds
            .values()
            .any(|b| b.ward_id == ward_id && b.number == number)
        {
            return Err(SchedulerError::Conflict(format!(
                "ward {ward_id} already has bed number {number}"
            )));
        }

        self.beds.insert(
            id,
            Bed {
                id,
                ward_id,
                number,
                equipment,
                status: BedStatus::InService,
                occupant: None,
                last_cleaned_ms: None,
            },
        );
        let key = (ward_id, number, id);
        let beds = &self.beds;
        let slot = self
            .order
            .partition_point(|other| beds.get(other).is_some_and(|b| (b.ward_id, b.number, b.id) < key));
        self.order.insert(slot, id);
        Ok(())
    }

    /// Look up a ward.
    #[must_use]
    pub fn ward(&self, id: WardId) -> Option<&Ward> {
        self.wards.get(&id)
    }

    /// All wards in id order.
    pub fn wards(&self) -> impl Iterator<Item = &Ward> + '_ {
        self.wards.values()
    }

    /// Look up a bed.
    #[must_use]
    pub fn bed(&self, id: BedId) -> Option<&Bed> {
        self.beds.get(&id)
    }

    /// All beds in slot order.
    pub fn beds(&self) -> impl Iterator<Item = &Bed> + '_ {
        self.order.iter().filter_map(|id| self.beds.get(id))
    }

    /// Ward type of the ward a bed belongs to.
    pub fn ward_type_of(&self, bed_id: BedId) -> Result<WardType, SchedulerError> {
        let bed = self
            .beds
            .get(&bed_id)
            .ok_or_else(|| SchedulerError::NotFound(format!("bed {bed_id}")))?;
        self.wards
            .get(&bed.ward_id)
            .map(|w| w.ward_type)
            .ok_or_else(|| SchedulerError::NotFound(format!("ward {}", bed.ward_id)))
    }

    /// Bind a free bed to a waiting admission and make the admission active.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown bed, `Conflict` when the bed is occupied or under
    /// maintenance, `InvalidState` when the admission is not waiting. Nothing changes on
    /// error.
    pub fn allocate(
        &mut self,
        bed_id: BedId,
        admission: &mut Admission,
        now_ms: u128,
    ) -> Result<(), SchedulerError> {
        let bed = self
            .beds
            .get_mut(&bed_id)
            .ok_or_else(|| SchedulerError::NotFound(format!("bed {bed_id}")))?;
        if let Some(current) = bed.occupant {
            return Err(SchedulerError::Conflict(format!(
                "bed {bed_id} is occupied by admission {}",
                current.admission_id
            )));
        }
        if bed.status == BedStatus::Maintenance {
            return Err(SchedulerError::Conflict(format!(
                "bed {bed_id} is under maintenance"
            )));
        }
        if admission.status() != AdmissionStatus::Waiting {
            return Err(SchedulerError::InvalidState(format!(
                "admission {} is {}, only waiting admissions can take a bed",
                admission.id(),
                admission.status()
            )));
        }

        bed.occupant = Some(Occupancy {
            admission_id: admission.id(),
            patient_id: admission.patient_id,
            since_ms: now_ms,
        });
        admission.activate(bed_id, now_ms);
        tracing::debug!(bed = bed_id, admission = admission.id(), "bed allocated");
        Ok(())
    }

    /// Clear a bed's occupancy. Releasing a free bed is a no-op returning `None`.
    pub fn release(&mut self, bed_id: BedId) -> Result<Option<Occupancy>, SchedulerError> {
        let bed = self
            .beds
            .get_mut(&bed_id)
            .ok_or_else(|| SchedulerError::NotFound(format!("bed {bed_id}")))?;
        let released = bed.occupant.take();
        if let Some(occupancy) = released {
            tracing::debug!(bed = bed_id, admission = occupancy.admission_id, "bed released");
        }
        Ok(released)
    }

    /// Free, in-service beds of `ward_type` in `(ward id, bed number, bed id)` order.
    pub fn find_available(&self, ward_type: WardType) -> impl Iterator<Item = &Bed> + '_ {
        self.beds().filter(move |bed| {
            bed.is_free()
                && self
                    .wards
                    .get(&bed.ward_id)
                    .is_some_and(|w| w.ward_type == ward_type)
        })
    }

    /// Change a bed's service state. Returns whether anything changed.
    ///
    /// An occupied bed cannot be taken out of service.
    pub fn set_status(
        &mut self,
        bed_id: BedId,
        status: BedStatus,
        now_ms: u128,
    ) -> Result<bool, SchedulerError> {
        let bed = self
            .beds
            .get_mut(&bed_id)
            .ok_or_else(|| SchedulerError::NotFound(format!("bed {bed_id}")))?;
        if bed.status == status {
            return Ok(false);
        }
        match status {
            BedStatus::Maintenance => {
                if let Some(current) = bed.occupant {
                    return Err(SchedulerError::Conflict(format!(
                        "bed {bed_id} is occupied by admission {}",
                        current.admission_id
                    )));
                }
            }
            BedStatus::InService => bed.last_cleaned_ms = Some(now_ms),
        }
        bed.status = status;
        Ok(true)
    }

    /// Number of beds in a ward that can take a patient now.
    pub fn available_beds(&self, ward_id: WardId) -> Result<usize, SchedulerError> {
        self.ward_beds(ward_id)
            .map(|beds| beds.filter(|b| b.is_free()).count())
    }

    /// First free bed of a ward in bed-number order.
    pub fn next_available_bed(&self, ward_id: WardId) -> Result<Option<&Bed>, SchedulerError> {
        self.ward_beds(ward_id).map(|mut beds| beds.find(|b| b.is_free()))
    }

    /// Occupancy figures per ward, in ward id order.
    #[must_use]
    pub fn occupancy(&self) -> Vec<WardOccupancy> {
        self.wards
            .values()
            .map(|ward| {
                let mut row = WardOccupancy {
                    ward_id: ward.id,
                    name: ward.name.clone(),
                    ward_type: ward.ward_type,
                    occupied: 0,
                    available: 0,
                    maintenance: 0,
                    total: 0,
                };
                for bed in self.beds.values().filter(|b| b.ward_id == ward.id) {
                    row.total += 1;
                    if bed.is_occupied() {
                        row.occupied += 1;
                    } else if bed.status == BedStatus::Maintenance {
                        row.maintenance += 1;
                    } else {
                        row.available += 1;
                    }
                }
                row
            })
            .collect()
    }

    /// Check that every bed belongs to a known ward and that the slot order lists each
    /// bed exactly once, sorted by `(ward id, bed number, bed id)`.
    pub fn verify_layout(&self) -> Result<(), String> {
        if let Some(bed) = self.beds.values().find(|b| !self.wards.contains_key(&b.ward_id)) {
            return Err(format!("bed {} is in unknown ward {}", bed.id, bed.ward_id));
        }
        if self.order.len() != self.beds.len() {
            return Err(format!(
                "slot order lists {} beds but the pool holds {}",
                self.order.len(),
                self.beds.len()
            ));
        }
        let mut previous: Option<(WardId, u32, BedId)> = None;
        for id in &self.order {
            let bed = self
                .beds
                .get(id)
                .ok_or_else(|| format!("slot order names unknown bed {id}"))?;
            let key = (bed.ward_id, bed.number, bed.id);
            if previous.is_some_and(|p| p >= key) {
                return Err(format!("slot order is not sorted at bed {id}"));
            }
            previous = Some(key);
        }
        Ok(())
    }

    fn ward_beds(
        &self,
        ward_id: WardId,
    ) -> Result<impl Iterator<Item = &Bed> + '_, SchedulerError> {
        if !self.wards.contains_key(&ward_id) {
            return Err(SchedulerError::NotFound(format!("ward {ward_id}")));
        }
        Ok(self.beds().filter(move |b| b.ward_id == ward_id))
    }
}
