//! Tests for configuration validation

use ward_admission::config::{BedConfig, SchedulerConfig, StoreBackendConfig, WardConfig};
use ward_admission::core::{PriorityPolicy, WardType};

fn ward(id: u64, ward_type: WardType, beds: &[(u64, u32)]) -> WardConfig {
    WardConfig {
        id,
        name: format!("ward-{id}"),
        ward_type,
        floor: 1,
        is_er: None,
        beds: beds
            .iter()
            .map(|&(id, number)| BedConfig {
                id,
                number,
                equipment: vec![],
            })
            .collect(),
    }
}

fn config(wards: Vec<WardConfig>) -> SchedulerConfig {
    SchedulerConfig {
        policy: PriorityPolicy::default(),
        wards,
        store: StoreBackendConfig::InMemory,
        rescore_interval_secs: 60,
    }
}

#[test]
fn test_scheduler_config_validation() {
    let cfg = config(vec![ward(1, WardType::Emergency, &[(1, 1), (2, 2)])]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.bed_count(), 2);
    assert!(cfg.wards[0].is_er());
}

#[test]
fn test_scheduler_config_empty_wards() {
    assert!(config(vec![]).validate().is_err());
}

#[test]
fn test_duplicate_bed_ids_rejected() {
    let cfg = config(vec![
        ward(1, WardType::General, &[(1, 1)]),
        ward(2, WardType::Icu, &[(1, 1)]),
    ]);
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("bed id 1"), "{err}");
}

#[test]
fn test_duplicate_bed_numbers_rejected() {
    let cfg = config(vec![ward(1, WardType::General, &[(1, 3), (2, 3)])]);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_policy_rejected() {
    let mut cfg = config(vec![ward(1, WardType::General, &[(1, 1)])]);
    cfg.policy.hours_per_point = 0.0;
    assert!(cfg.validate().unwrap_err().starts_with("policy invalid"));
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "policy": { "average_treatment_minutes": 45 },
        "wards": [
            {
                "id": 1,
                "name": "ER",
                "ward_type": "emergency",
                "beds": [ { "id": 10, "number": 1, "equipment": ["monitor"] } ]
            },
            {
                "id": 2,
                "name": "ICU",
                "ward_type": "icu",
                "floor": 3,
                "beds": [ { "id": 20, "number": 1 } ]
            }
        ],
        "store": { "kind": "file", "dir": "/var/lib/ward", "stream": "st-mary" }
    }"#;

    let cfg = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.policy.average_treatment_minutes, 45);
    assert!((cfg.policy.hours_per_point - 2.0).abs() < f64::EPSILON);
    assert_eq!(cfg.rescore_interval_secs, 60);
    assert!(cfg.wards[0].is_er());
    assert!(!cfg.wards[1].is_er());
    assert!(matches!(cfg.store, StoreBackendConfig::File { ref stream, .. } if stream == "st-mary"));
}

#[test]
fn test_unknown_ward_type_in_json_fails() {
    let json = r#"{ "wards": [ { "id": 1, "name": "X", "ward_type": "cardiology" } ] }"#;
    assert!(SchedulerConfig::from_json_str(json).unwrap_err().starts_with("parse error"));
}

#[test]
fn test_from_file_missing_path() {
    assert!(SchedulerConfig::from_file("/definitely/not/here.json").is_err());
}
