//! Process Migration Emitters
//!
//! Turns an analysed unit into literal project files.
//!
//! # Components
//!
//! - [`AnalysisContext`]: per-unit working state shared by every emitter
//! - [`Emitter`]: the single `emit` capability
//! - [`EmitterRegistry`]: lookup table from [`EmitterKind`] to emitter
//! - [`ArchitectureDispatcher`]: picks emitters by architecture and merges their output
//! - [`GatewayEmitter`]: run-wide API gateway project
//!
//! Emitters are pure: they build a [`GeneratedFileMap`](mig_model::GeneratedFileMap)
//! and never touch the filesystem. Every file carries the [`FileTag`](mig_model::FileTag)
//! of the emitter that produced it.
//!
//! # Example
//!
//! ```rust
//! use mig_emit::{AnalysisContext, ArchitectureDispatcher};
//! use mig_index::NullIndex;
//! use mig_model::{Architecture, ProtocolTag, ServiceType, Unit};
//! use std::sync::Arc;
//!
//! let unit = Arc::new(Unit::new("/in/loans", Vec::new()));
//! let mut ctx = AnalysisContext::new(unit, "/out", "com.example.loans", Arc::new(NullIndex));
//! ctx.protocols.insert(ProtocolTag::Rest);
//!
//! let files = ArchitectureDispatcher::new()
//!     .dispatch(&ctx, Architecture::Layered, ServiceType::Combined)
//!     .unwrap();
//! assert!(files.paths().all(|p| p.starts_with("/out/rest")));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod gateway;
mod hexagonal;
mod java;
mod layered;
pub mod naming;

pub use context::{AnalysisContext, SchemaDocument};
pub use dispatch::ArchitectureDispatcher;
pub use emitter::{Emitter, EmitterKind, EmitterRegistry};
pub use error::{DispatchError, EmitError};
pub use gateway::{GatewayEmitter, GatewayRoute};
pub use hexagonal::{HexagonalDomainEmitter, HexagonalRestEmitter, HexagonalSoapEmitter};
pub use layered::{RestEmitter, SoapEmitter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod test_support {
    use crate::context::AnalysisContext;
    use mig_index::NullIndex;
    use mig_model::{ProcessDefinition, Unit};
    use std::path::Path;
    use std::sync::Arc;

    /// Context in `com.example.loan`; schemas are written under `dir/unit`
    pub(crate) fn context_with(dir: &Path, processes: Vec<ProcessDefinition>, schemas: &[(&str, &str)]) -> AnalysisContext {
        context_in_package(dir, "com.example.loan", processes, schemas)
    }

    pub(crate) fn context_in_package(
        dir: &Path,
        package: &str,
        processes: Vec<ProcessDefinition>,
        schemas: &[(&str, &str)],
    ) -> AnalysisContext {
        let unit_dir = mig_test_utils::write_unit(dir, "unit", schemas);
        let unit = Arc::new(Unit::new(&unit_dir, Vec::new()));
        let mut ctx = AnalysisContext::new(unit, dir.join("out"), package, Arc::new(NullIndex));
        ctx.processes = processes;
        ctx.schemas = schemas.iter().map(|(name, _)| unit_dir.join(name)).collect();
        ctx
    }
}
