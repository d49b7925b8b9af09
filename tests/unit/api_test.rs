//! Tests for the API boundary models

use ward_admission::core::{
    AdmissionScheduler, AdmissionStatus, BedPool, PriorityPolicy, SchedulerError, TriageCategory,
    Ward, WardType,
};
use ward_admission::infra::InMemoryStore;
use ward_admission::runtime::api::{
    admission_board, discharge, health, list_wards, submit_admission, update_triage, waiting_queue,
    AdmissionSubmission, TriageUpdate,
};
use ward_admission::util::{ManualClock, MS_PER_HOUR};

fn scheduler() -> AdmissionScheduler<InMemoryStore> {
    let mut pool = BedPool::new();
    pool.add_ward(Ward {
        id: 1,
        name: "ER".into(),
        ward_type: WardType::Emergency,
        floor: 0,
        is_er: true,
    })
    .unwrap();
    pool.add_bed(1, 1, 1, vec![]).unwrap();
    AdmissionScheduler::open(PriorityPolicy::default(), pool, InMemoryStore::new()).unwrap()
}

fn submission(patient: u64, triage: &str) -> AdmissionSubmission {
    AdmissionSubmission {
        patient_id: patient,
        ward_type: Some("ER".into()),
        priority_level: Some(triage.into()),
        admission_reason: "chest pain".into(),
        ..AdmissionSubmission::default()
    }
}

#[test]
fn test_submit_normalizes_triage_text() {
    let s = scheduler();
    let clock = ManualClock::new(0);
    let view = submit_admission(&s, &clock, 8, submission(1, "  URGENT ")).unwrap();
    assert_eq!(view.priority_level, TriageCategory::Urgent);
    assert_eq!(view.triage_color, "yellow");
    assert_eq!(view.status, AdmissionStatus::Active);
    assert_eq!(view.attending_staff_id, Some(8));

    let view = submit_admission(&s, &clock, 8, submission(2, "sparkly")).unwrap();
    assert_eq!(view.priority_level, TriageCategory::Standard);
    assert_eq!(view.queue_position, Some(1));
}

#[test]
fn test_submit_rejects_unknown_ward_type() {
    let s = scheduler();
    let clock = ManualClock::new(0);
    let mut req = submission(1, "urgent");
    req.ward_type = Some("cardiology".into());
    assert!(matches!(
        submit_admission(&s, &clock, 8, req),
        Err(SchedulerError::Validation(_))
    ));
}

#[test]
fn test_queue_board_and_wards() {
    let s = scheduler();
    let clock = ManualClock::new(0);
    let first = submit_admission(&s, &clock, 8, submission(1, "standard")).unwrap();
    submit_admission(&s, &clock, 8, submission(2, "standard")).unwrap();
    submit_admission(&s, &clock, 8, submission(3, "emergency")).unwrap();

    let queue = waiting_queue(&s);
    assert_eq!(queue.iter().map(|e| e.patient_id).collect::<Vec<_>>(), vec![3, 2]);
    assert_eq!(queue[1].estimated_wait_time, 60);

    let board = admission_board(&s);
    assert_eq!(board[0].id, first.id);
    assert_eq!(board.len(), 3);

    let wards = list_wards(&s);
    assert_eq!((wards[0].occupied, wards[0].available), (1, 0));

    let h = health(&s);
    assert!(h.ok);
    assert_eq!(h.waiting, 2);
    assert_eq!(h.available_beds, 0);
}

#[test]
fn test_triage_update_and_discharge() {
    let s = scheduler();
    let clock = ManualClock::new(0);
    let first = submit_admission(&s, &clock, 8, submission(1, "urgent")).unwrap();
    let waiting = submit_admission(&s, &clock, 8, submission(2, "non_urgent")).unwrap();

    clock.advance(MS_PER_HOUR);
    let updated = update_triage(
        &s,
        &clock,
        9,
        TriageUpdate {
            admission_id: waiting.id,
            priority_level: Some("immediate".into()),
            triage_notes: Some("deteriorating".into()),
        },
    )
    .unwrap();
    assert_eq!(updated.priority_level, TriageCategory::Immediate);
    assert!((updated.priority_score - 1.0).abs() < 1e-9);

    let done = discharge(&s, &clock, 9, first.id).unwrap();
    assert_eq!(done.status, AdmissionStatus::Discharged);
    assert_eq!(s.admission(waiting.id).unwrap().bed(), Some(1));
    assert_eq!(s.admission(waiting.id).unwrap().actual_wait_minutes(), Some(60));
}
