//! In-memory patient directory.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::{PatientDirectory, PatientSummary};
use crate::util::serde::PatientId;

/// Patient lookup table shared between the scheduler and whoever registers patients.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    patients: RwLock<HashMap<PatientId, PatientSummary>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a patient.
    pub fn insert(&self, patient: PatientSummary) {
        self.patients.write().insert(patient.id, patient);
    }

    /// Number of known patients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.read().len()
    }

    /// Whether no patient is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.read().is_empty()
    }
}

impl PatientDirectory for InMemoryDirectory {
    fn lookup(&self, id: PatientId) -> Option<PatientSummary> {
        self.patients.read().get(&id).cloned()
    }
}
