//! Tests for builder modules

use std::sync::Arc;

use ward_admission::builders::{build_bed_pool, SchedulerBuilder};
use ward_admission::config::{BedConfig, SchedulerConfig, StoreBackendConfig, WardConfig};
use ward_admission::core::{
    AdmissionRequest, OpContext, PatientSummary, PriorityPolicy, SchedulerError, SharedAuditSink,
    WardType,
};
use ward_admission::infra::{InMemoryDirectory, InMemoryStore};

fn config() -> SchedulerConfig {
    SchedulerConfig {
        policy: PriorityPolicy::default(),
        wards: vec![WardConfig {
            id: 1,
            name: "General".into(),
            ward_type: WardType::General,
            floor: 2,
            is_er: None,
            beds: vec![
                BedConfig {
                    id: 11,
                    number: 2,
                    equipment: vec![],
                },
                BedConfig {
                    id: 10,
                    number: 1,
                    equipment: vec!["oxygen".into()],
                },
            ],
        }],
        store: StoreBackendConfig::InMemory,
        rescore_interval_secs: 30,
    }
}

#[test]
fn test_scheduler_builder_accessors() {
    let builder = SchedulerBuilder::new("st-mary", config());
    assert_eq!(builder.name(), "st-mary");
    assert_eq!(builder.config().rescore_interval_secs, 30);
}

#[test]
fn test_build_bed_pool_orders_beds_by_number() {
    let pool = build_bed_pool(&config()).unwrap();
    let ids: Vec<u64> = pool.find_available(WardType::General).map(|b| b.id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert!(!pool.ward(1).unwrap().is_er);
}

#[test]
fn test_build_rejects_invalid_config() {
    let mut cfg = config();
    cfg.wards.clear();
    let result = SchedulerBuilder::new("empty", cfg).build(InMemoryStore::new());
    assert!(matches!(result, Err(SchedulerError::Validation(_))));
}

#[test]
fn test_build_wires_audit_and_directory() {
    let sink = SharedAuditSink::new(16);
    let directory = Arc::new(InMemoryDirectory::new());
    directory.insert(PatientSummary {
        id: 1,
        name: "Ada".into(),
        age: Some(36),
    });

    let scheduler = SchedulerBuilder::new("st-mary", config())
        .with_audit(Box::new(sink.clone()))
        .with_directory(directory)
        .build(InMemoryStore::new())
        .unwrap();

    let admitted = scheduler
        .submit_admission(
            OpContext::by(5, 100),
            AdmissionRequest::new(1, "pneumonia").with_ward_type(WardType::General),
        )
        .unwrap();
    assert_eq!(admitted.bed(), Some(10));
    assert!(!sink.events().is_empty());

    let unknown = scheduler.submit_admission(
        OpContext::by(5, 100),
        AdmissionRequest::new(2, "fracture").with_ward_type(WardType::General),
    );
    assert!(matches!(unknown, Err(SchedulerError::NotFound(_))));
}

#[test]
fn test_build_from_config_uses_configured_store() {
    let scheduler = SchedulerBuilder::new("st-mary", config())
        .build_from_config()
        .unwrap();
    assert_eq!(scheduler.ward_occupancy()[0].total, 2);
}
