//! Run report

use crate::validator::ValidationResult;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use mig_model::{Architecture, ServiceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// What happened to one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Generated and materialised
    Succeeded {
        /// Unit directory
        unit: PathBuf,
        /// Files written for the unit
        files: Vec<PathBuf>,
        /// Archives written for the unit
        archives: Vec<PathBuf>,
        /// Non-fatal problems met on the way
        warnings: Vec<String>,
    },
    /// Contributed nothing
    Failed {
        /// Unit directory
        unit: PathBuf,
        /// Reason shown in the report
        reason: String,
    },
}

impl UnitOutcome {
    /// Unit directory
    #[must_use]
    pub fn unit(&self) -> &Path {
        match self {
            Self::Succeeded { unit, .. } | Self::Failed { unit, .. } => unit,
        }
    }

    /// Check if the unit produced output
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Persisted summary of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Run identifier
    pub run_id: Ulid,
    /// Target architecture
    pub architecture: Architecture,
    /// Adapter selection for hexagonal output
    pub service_type: ServiceType,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Run time in milliseconds
    pub duration_ms: u64,
    /// Every discovered unit, in discovery order
    pub processed_units: Vec<PathBuf>,
    /// Every generated file, sorted
    pub generated_files: Vec<PathBuf>,
    /// Project directory to build result
    pub validation: BTreeMap<PathBuf, ValidationResult>,
    /// Archives written, per-unit first then run-wide
    pub archives: Vec<PathBuf>,
    /// Unit directory to failure reason
    pub failures: IndexMap<PathBuf, String>,
    /// Recovered problems from every phase
    pub warnings: Vec<String>,
}

impl MigrationReport {
    /// Create empty report for a run starting now
    #[must_use]
    pub fn new(architecture: Architecture, service_type: ServiceType) -> Self {
        Self {
            run_id: Ulid::new(),
            architecture,
            service_type,
            started_at: Utc::now(),
            duration_ms: 0,
            processed_units: Vec::new(),
            generated_files: Vec::new(),
            validation: BTreeMap::new(),
            archives: Vec::new(),
            failures: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Record one unit's outcome
    pub fn record(&mut self, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Succeeded {
                archives, warnings, ..
            } => {
                self.archives.extend(archives);
                self.warnings.extend(warnings);
            }
            UnitOutcome::Failed { unit, reason } => {
                self.failures.insert(unit, reason);
            }
        }
    }

    /// Units that produced output
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.processed_units.len().saturating_sub(self.failures.len())
    }

    /// Check if every unit succeeded
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    /// Returns the serializer error.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load a report written by a previous run
    ///
    /// # Errors
    /// Returns the I/O or parse error as `std::io::Error`.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(std::io::Error::from)
    }
}
