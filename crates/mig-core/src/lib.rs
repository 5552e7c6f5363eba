//! Process Migration Core
//!
//! Orchestrates a migration run over a directory of legacy units:
//! - Discovers units and builds the shared similarity index
//! - Analyses and classifies each unit
//! - Dispatches generation on a bounded worker pool
//! - Packages per-unit and run-wide archives
//! - Validates generated projects with the external build tool
//! - Writes a JSON report
//!
//! # Example
//!
//! ```rust,no_run
//! use mig_core::{MigrationConfig, Orchestrator};
//! use mig_model::Architecture;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MigrationConfig::new("legacy", "generated")
//!     .with_architecture(Architecture::Hexagonal)
//!     .with_max_workers(8);
//!
//! let report = Orchestrator::new(config)?.execute().await?;
//! println!("{} units, {} files", report.processed_units.len(), report.generated_files.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod analyzer;
pub mod archive;
pub mod config;
pub mod error;
pub mod materialize;
pub mod orchestrator;
pub mod phase;
pub mod pool;
pub mod report;
pub mod validator;

pub use analyzer::{IndexingPolicy, ParsedUnit, UnitAnalyzer};
pub use archive::{ArchiveBuilder, ArchiveManifest};
pub use config::{MigrationConfig, OutputLayout};
pub use error::{ArchiveError, ConfigError, MigrationError, PoolError, WriteError};
pub use mig_emit::AnalysisContext;
pub use orchestrator::Orchestrator;
pub use phase::RunPhase;
pub use pool::{PoolStats, WorkerPool};
pub use report::{MigrationReport, UnitOutcome};
pub use validator::{BuildOutput, BuildTool, BuildValidator, MavenTool, ValidationResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running migrations
    pub use crate::{
        BuildValidator, MigrationConfig, MigrationError, MigrationReport, Orchestrator, OutputLayout, RunPhase,
        UnitAnalyzer, ValidationResult,
    };
    pub use mig_model::{Architecture, ServiceType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use mig_index::{EmbeddingIndex, SimilarityIndex};
    use mig_model::{ProtocolTag, Unit};
    use mig_test_utils::Workspace;
    use std::sync::Arc;

    #[test]
    fn analyzer_feeds_dispatcher() {
        let workspace = Workspace::new();
        let dir = workspace.loan_unit("loans");
        let unit = Arc::new(Unit::from_directory(&dir).unwrap().unwrap());
        let index: Arc<dyn SimilarityIndex> = Arc::new(EmbeddingIndex::new());

        let ctx = UnitAnalyzer::new().analyze(unit, index, workspace.output(), "com.example.loan");
        let files = mig_emit::ArchitectureDispatcher::new()
            .dispatch(&ctx, mig_model::Architecture::Layered, mig_model::ServiceType::Combined)
            .unwrap();

        for protocol in ProtocolTag::ALL {
            assert!(files.paths().any(|p| p.starts_with(workspace.output().join(protocol.as_str()))));
        }
    }

    #[test]
    fn config_defaults_build_an_orchestrator() {
        let orchestrator = Orchestrator::new(MigrationConfig::default()).unwrap();
        assert_eq!(orchestrator.phase(), RunPhase::Init);
        assert!(orchestrator.index().is_empty());
    }
}
