//! In-memory snapshot store.

use crate::core::{AdmissionStore, HospitalSnapshot, SchedulerError};

/// Keeps the last committed snapshot in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshot: Option<HospitalSnapshot>,
    commits: u64,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot, as if it had been committed earlier.
    #[must_use]
    pub const fn with_snapshot(snapshot: HospitalSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            commits: 0,
        }
    }

    /// Number of commits accepted so far.
    #[must_use]
    pub const fn commits(&self) -> u64 {
        self.commits
    }

    /// Last committed snapshot.
    #[must_use]
    pub const fn last(&self) -> Option<&HospitalSnapshot> {
        self.snapshot.as_ref()
    }
}

impl AdmissionStore for InMemoryStore {
    fn load(&mut self) -> Result<Option<HospitalSnapshot>, SchedulerError> {
        Ok(self.snapshot.clone())
    }

    fn commit(&mut self, snapshot: &HospitalSnapshot) -> Result<(), SchedulerError> {
        self.snapshot = Some(snapshot.clone());
        self.commits += 1;
        Ok(())
    }
}
