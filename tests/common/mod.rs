//! Shared fixtures for integration tests.

#![allow(dead_code)]

use ward_admission::core::{
    AdmissionRequest, AdmissionScheduler, AdmissionStore, BedPool, PriorityPolicy, TriageCategory,
    Ward, WardType,
};
use ward_admission::infra::InMemoryStore;

/// One hour in milliseconds.
pub const HOUR: u128 = ward_admission::util::MS_PER_HOUR;

/// ER ward 1 with `er_beds` beds (ids 100..), ICU ward 2 with `icu_beds` beds (ids 200..).
pub fn hospital(er_beds: u32, icu_beds: u32) -> BedPool {
    let mut pool = BedPool::new();
    pool.add_ward(Ward {
        id: 1,
        name: "Emergency".into(),
        ward_type: WardType::Emergency,
        floor: 0,
        is_er: true,
    })
    .unwrap();
    pool.add_ward(Ward {
        id: 2,
        name: "Intensive Care".into(),
        ward_type: WardType::Icu,
        floor: 3,
        is_er: false,
    })
    .unwrap();
    for n in 0..er_beds {
        pool.add_bed(100 + u64::from(n), 1, n + 1, vec![]).unwrap();
    }
    for n in 0..icu_beds {
        pool.add_bed(200 + u64::from(n), 2, n + 1, vec!["ventilator".into()]).unwrap();
    }
    pool
}

/// Open a scheduler with the default policy.
pub fn open_with<S: AdmissionStore>(pool: BedPool, store: S) -> AdmissionScheduler<S> {
    AdmissionScheduler::open(PriorityPolicy::default(), pool, store).unwrap()
}

/// In-memory scheduler over [`hospital`].
pub fn scheduler(er_beds: u32, icu_beds: u32) -> AdmissionScheduler<InMemoryStore> {
    open_with(hospital(er_beds, icu_beds), InMemoryStore::new())
}

/// Queue request with an explicit ward type and category.
pub fn request(patient: u64, ward_type: WardType, category: TriageCategory) -> AdmissionRequest {
    AdmissionRequest::new(patient, "admitted from triage")
        .with_ward_type(ward_type)
        .with_priority(category)
}
