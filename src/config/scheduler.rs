//! Scheduler configuration structures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{PriorityPolicy, WardType};
use crate::util::serde::{BedId, WardId};

/// Environment variable naming the JSON config file read by [`SchedulerConfig::from_env`].
pub const CONFIG_PATH_ENV: &str = "WARD_ADMISSION_CONFIG";

/// Snapshot store selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    #[default]
    InMemory,
    /// JSON snapshot file under `dir`, named after `stream`.
    File {
        /// Directory holding the snapshot.
        dir: PathBuf,
        /// Snapshot name, usually the hospital name.
        stream: String,
    },
}

/// One bed of a ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedConfig {
    /// Bed identifier, unique across the hospital.
    pub id: BedId,
    /// Bed number within the ward.
    pub number: u32,
    /// Installed equipment.
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// One ward and its beds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardConfig {
    /// Ward identifier.
    pub id: WardId,
    /// Display name.
    pub name: String,
    /// Ward type used for queue matching.
    pub ward_type: WardType,
    /// Floor number.
    #[serde(default)]
    pub floor: i32,
    /// Counts toward emergency-room capacity. Defaults to `ward_type == emergency`.
    #[serde(default)]
    pub is_er: Option<bool>,
    /// Beds in this ward.
    #[serde(default)]
    pub beds: Vec<BedConfig>,
}

impl WardConfig {
    /// Effective emergency-room flag.
    #[must_use]
    pub fn is_er(&self) -> bool {
        self.is_er.unwrap_or(self.ward_type == WardType::Emergency)
    }
}

const fn default_rescore_interval_secs() -> u64 {
    60
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Scoring and wait-estimate constants.
    #[serde(default)]
    pub policy: PriorityPolicy,
    /// Ward and bed layout used when the store holds no snapshot yet.
    pub wards: Vec<WardConfig>,
    /// Snapshot store backend.
    #[serde(default)]
    pub store: StoreBackendConfig,
    /// Seconds between background rescoring passes.
    #[serde(default = "default_rescore_interval_secs")]
    pub rescore_interval_secs: u64,
}

impl SchedulerConfig {
    /// Validate the policy and the ward layout.
    pub fn validate(&self) -> Result<(), String> {
        self.policy
            .validate()
            .map_err(|e| format!("policy invalid: {e}"))?;
        if self.wards.is_empty() {
            return Err("at least one ward must be defined".into());
        }
        if self.rescore_interval_secs == 0 {
            return Err("rescore_interval_secs must be greater than 0".into());
        }

        let mut ward_ids = std::collections::BTreeSet::new();
        let mut bed_ids = std::collections::BTreeSet::new();
        for ward in &self.wards {
            if !ward_ids.insert(ward.id) {
                return Err(format!("ward id {} defined twice", ward.id));
            }
            if ward.name.trim().is_empty() {
                return Err(format!("ward {} needs a name", ward.id));
            }
            let mut numbers = std::collections::BTreeSet::new();
            for bed in &ward.beds {
                if !bed_ids.insert(bed.id) {
                    return Err(format!("bed id {} defined twice", bed.id));
                }
                if !numbers.insert(bed.number) {
                    return Err(format!(
                        "ward `{}` has bed number {} twice",
                        ward.name, bed.number
                    ));
                }
            }
        }
        if let StoreBackendConfig::File { stream, .. } = &self.store {
            if stream.trim().is_empty() {
                return Err("file store needs a stream name".into());
            }
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_json_str(&input)
    }

    /// Load `.env` if present, then read the file named by `WARD_ADMISSION_CONFIG`.
    pub fn from_env() -> Result<Self, String> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(format!("cannot load .env: {e}"));
            }
        }
        let path = std::env::var(CONFIG_PATH_ENV).map_err(|_| format!("{CONFIG_PATH_ENV} is not set"))?;
        tracing::info!(path = %path, "loading scheduler config");
        Self::from_file(path)
    }

    /// Total number of configured beds.
    #[must_use]
    pub fn bed_count(&self) -> usize {
        self.wards.iter().map(|w| w.beds.len()).sum()
    }
}
