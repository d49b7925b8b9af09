//! # Ward Admission
//!
//! Triage-driven admission queue and bed assignment for hospital wards.
//!
//! Patients arriving at the emergency department are triaged into one of five
//! categories. When a bed of the required ward type is free the patient takes it at
//! once; otherwise the admission waits in a priority queue. Queue order is driven by a
//! priority score that starts at the triage weight and improves with time waited, so a
//! low-acuity patient cannot be starved forever by a stream of higher-acuity arrivals.
//! Discharging a patient frees the bed and hands it to the best waiting admission of the
//! same ward type.
//!
//! ## Key Features
//!
//! - **Aging priority score**: `max(1, weight - min(hours / 2, 3))`, lower is seen sooner
//! - **Single bed owner**: every bed is held by at most one active admission, enforced
//!   under one lock per hospital
//! - **All-or-nothing operations**: each mutation commits a full snapshot to the
//!   configured store before it becomes visible
//! - **Audit trail and subscriptions**: committed changes are recorded with the acting
//!   staff member and broadcast to subscribers
//! - **Periodic rescoring**: an optional Tokio task keeps scores and wait estimates fresh
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ward_admission::builders::SchedulerBuilder;
//! use ward_admission::config::SchedulerConfig;
//! use ward_admission::core::{AdmissionRequest, OpContext, TriageCategory, WardType};
//! use ward_admission::infra::store::InMemoryStore;
//!
//! let cfg = SchedulerConfig::from_file("ward.json")?;
//! let scheduler = SchedulerBuilder::new("st-mary", cfg).build(InMemoryStore::new())?;
//!
//! let admission = scheduler.submit_admission(
//!     OpContext::by(attending_id, now_ms),
//!     AdmissionRequest::new(patient_id, "suspected appendicitis")
//!         .with_ward_type(WardType::Surgical)
//!         .with_priority(TriageCategory::Urgent),
//! )?;
//! ```

/// Core scheduling abstractions and bed accounting.
pub mod core;
/// Configuration models for policy, wards and backends.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for snapshot stores and the patient directory.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
