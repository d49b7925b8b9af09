//! Configuration models for policy, wards and backends.

pub mod scheduler;

pub use scheduler::{BedConfig, SchedulerConfig, StoreBackendConfig, WardConfig, CONFIG_PATH_ENV};
