//! Runtime adapters and API surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod rescore;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;

pub use api::{
    admission_board, discharge, health, list_wards, submit_admission, update_triage,
    waiting_queue, AdmissionSubmission, AdmissionView, Health, QueueEntryView, TriageUpdate,
    WardSnapshot,
};
#[cfg(feature = "tokio-runtime")]
pub use rescore::{spawn_rescore_loop, RescoreHandle};
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::{Spawn, TokioSpawner};
