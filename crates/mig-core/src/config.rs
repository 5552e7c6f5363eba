//! Run configuration
//!
//! Loaded from TOML (every field optional) and then overridden by CLI flags
//! through the `with_*` builders.

use crate::error::ConfigError;
use mig_emit::naming::is_valid_package;
use mig_index::IndexBackend;
use mig_model::{Architecture, ServiceType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where each unit's projects are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// Every unit writes under the output root; shared scaffolding is last-writer-wins
    #[default]
    Shared,
    /// Each unit writes under `<output-root>/<unit-dir-name>`
    PerUnit,
}

/// Migration run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Root containing candidate units
    pub input_root: PathBuf,
    /// Root receiving projects, archives and the report
    pub output_root: PathBuf,
    /// Root package for generated sources
    pub package_root: String,
    /// Generation architecture
    pub architecture: Architecture,
    /// Adapter selection for hexagonal generation
    pub service_type: ServiceType,
    /// Process units concurrently
    pub parallel: bool,
    /// Worker count when parallel
    pub max_workers: usize,
    /// Per-unit output placement
    pub output_layout: OutputLayout,
    /// Similarity index backend
    pub index_backend: IndexBackend,
    /// Run the build validator after packaging
    pub validate: bool,
    /// Bound on a single project build
    pub build_timeout_secs: u64,
    /// Build tool executable
    pub build_tool: String,
    /// Directory depth searched for generated projects
    pub project_search_depth: usize,
    /// Emit an API gateway project routing to every service
    pub generate_gateway: bool,
    /// Report file name under the output root
    pub report_file_name: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("input"),
            output_root: PathBuf::from("output"),
            package_root: "com.example.migration".to_string(),
            architecture: Architecture::Layered,
            service_type: ServiceType::Combined,
            parallel: true,
            max_workers: 4,
            output_layout: OutputLayout::Shared,
            index_backend: IndexBackend::Embedding,
            validate: true,
            build_timeout_secs: 300,
            build_tool: "mvn".to_string(),
            project_search_depth: 2,
            generate_gateway: false,
            report_file_name: "migration_report.json".to_string(),
        }
    }
}

impl MigrationConfig {
    /// Create default configuration for the given roots
    #[must_use]
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check invariants the run relies on
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if !is_valid_package(&self.package_root) {
            return Err(ConfigError::InvalidPackage(self.package_root.clone()));
        }
        if self.build_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Workers actually used for `units` units
    #[must_use]
    pub fn effective_workers(&self, units: usize) -> usize {
        if self.parallel && units > 1 {
            self.max_workers.max(1)
        } else {
            1
        }
    }

    /// Output root for one unit's projects
    #[must_use]
    pub fn unit_root(&self, unit_dir_name: &str) -> PathBuf {
        match self.output_layout {
            OutputLayout::Shared => self.output_root.clone(),
            OutputLayout::PerUnit => self.output_root.join(unit_dir_name),
        }
    }

    /// Build timeout
    #[inline]
    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Report file path
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_root.join(&self.report_file_name)
    }

    /// With root Java package
    #[inline]
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package_root = package.into();
        self
    }

    /// With target architecture
    #[inline]
    #[must_use]
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    /// With hexagonal service type
    #[inline]
    #[must_use]
    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    /// With concurrent unit processing on or off
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// With worker limit
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// With output layout
    #[inline]
    #[must_use]
    pub fn with_output_layout(mut self, layout: OutputLayout) -> Self {
        self.output_layout = layout;
        self
    }

    /// With similarity index backend
    #[inline]
    #[must_use]
    pub fn with_index_backend(mut self, backend: IndexBackend) -> Self {
        self.index_backend = backend;
        self
    }

    /// With build validation on or off
    #[inline]
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// With per-project build timeout
    #[inline]
    #[must_use]
    pub fn with_build_timeout_secs(mut self, secs: u64) -> Self {
        self.build_timeout_secs = secs;
        self
    }

    /// With build tool executable
    #[inline]
    #[must_use]
    pub fn with_build_tool(mut self, tool: impl Into<String>) -> Self {
        self.build_tool = tool.into();
        self
    }

    /// With gateway generation on or off
    #[inline]
    #[must_use]
    pub fn with_gateway(mut self, gateway: bool) -> Self {
        self.generate_gateway = gateway;
        self
    }
}
