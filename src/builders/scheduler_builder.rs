//! Builders to construct admission schedulers from configuration.

use std::sync::Arc;

use crate::config::{SchedulerConfig, StoreBackendConfig};
use crate::core::{
    AdmissionScheduler, AdmissionStore, AuditSink, BedPool, PatientDirectory, SchedulerError, Ward,
};
use crate::infra::store::{FileStore, InMemoryStore};

/// Build the ward and bed layout described by `cfg`.
pub fn build_bed_pool(cfg: &SchedulerConfig) -> Result<BedPool, SchedulerError> {
    let mut pool = BedPool::new();
    for ward in &cfg.wards {
        pool.add_ward(Ward {
            id: ward.id,
            name: ward.name.clone(),
            ward_type: ward.ward_type,
            floor: ward.floor,
            is_er: ward.is_er(),
        })?;
        for bed in &ward.beds {
            pool.add_bed(bed.id, ward.id, bed.number, bed.equipment.clone())?;
        }
    }
    Ok(pool)
}

/// Open the store backend selected in `cfg`.
pub fn open_store(cfg: &SchedulerConfig) -> Result<Box<dyn AdmissionStore>, SchedulerError> {
    match &cfg.store {
        StoreBackendConfig::InMemory => Ok(Box::new(InMemoryStore::new())),
        StoreBackendConfig::File { dir, stream } => Ok(Box::new(FileStore::new(dir, stream.clone())?)),
    }
}

/// Assembles an [`AdmissionScheduler`] for one hospital.
pub struct SchedulerBuilder {
    name: String,
    config: SchedulerConfig,
    audit: Option<Box<dyn AuditSink>>,
    directory: Option<Arc<dyn PatientDirectory>>,
}

impl SchedulerBuilder {
    /// Start a builder for the hospital called `name`.
    pub fn new(name: impl Into<String>, config: SchedulerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            audit: None,
            directory: None,
        }
    }

    /// Hospital name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration being built from.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Record committed changes to `sink`.
    #[must_use]
    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Check patients against `directory` on submission.
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn PatientDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Validate the configuration and open a scheduler over `store`.
    pub fn build<S: AdmissionStore>(self, store: S) -> Result<AdmissionScheduler<S>, SchedulerError> {
        self.config
            .validate()
            .map_err(|e| SchedulerError::Validation(format!("config invalid: {e}")))?;
        let layout = build_bed_pool(&self.config)?;
        let mut scheduler = AdmissionScheduler::open(self.config.policy, layout, store)?;
        if let Some(sink) = self.audit {
            scheduler = scheduler.with_audit(sink);
        }
        if let Some(directory) = self.directory {
            scheduler = scheduler.with_directory(directory);
        }
        tracing::info!(
            hospital = %self.name,
            wards = self.config.wards.len(),
            beds = self.config.bed_count(),
            "admission scheduler ready"
        );
        Ok(scheduler)
    }

    /// Build using the store backend named in the configuration.
    pub fn build_from_config(self) -> Result<AdmissionScheduler<Box<dyn AdmissionStore>>, SchedulerError> {
        let store = open_store(&self.config)?;
        self.build(store)
    }
}
