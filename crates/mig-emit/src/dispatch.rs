//! Architecture dispatch
//!
//! Provides [`ArchitectureDispatcher`], which turns an architecture choice
//! into a list of [`EmitterKind`]s, runs them through the
//! [`EmitterRegistry`] and merges their output.
//!
//! # Selection
//!
//! - **Layered**: one emitter per protocol in the context's classification
//! - **Hexagonal**: the domain emitter, then one adapter per protocol of the
//!   requested service type; classification is ignored

use crate::context::AnalysisContext;
use crate::emitter::{EmitterKind, EmitterRegistry};
use crate::error::DispatchError;
use mig_model::{Architecture, GeneratedFileMap, ProtocolTag, ServiceType};

/// Runs the emitters an architecture requires for one unit
#[derive(Debug, Clone)]
pub struct ArchitectureDispatcher {
    registry: EmitterRegistry,
}

impl Default for ArchitectureDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchitectureDispatcher {
    /// Create dispatcher over the built-in emitters
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(EmitterRegistry::with_defaults())
    }

    /// Create dispatcher over a custom registry
    #[must_use]
    pub fn with_registry(registry: EmitterRegistry) -> Self {
        Self { registry }
    }

    /// Emitter registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &EmitterRegistry {
        &self.registry
    }

    /// Emitters to run, in order
    #[must_use]
    pub fn plan(ctx: &AnalysisContext, architecture: Architecture, service_type: ServiceType) -> Vec<EmitterKind> {
        match architecture {
            Architecture::Layered => {
                if ctx.protocols.is_empty() {
                    vec![EmitterKind::layered(ProtocolTag::Rest)]
                } else {
                    ctx.protocols.iter().copied().map(EmitterKind::layered).collect()
                }
            }
            Architecture::Hexagonal => std::iter::once(EmitterKind::HexagonalDomain)
                .chain(service_type.protocols().iter().copied().map(EmitterKind::hexagonal_adapter))
                .collect(),
        }
    }

    /// Produce every file for one unit
    ///
    /// The result also carries the files already accumulated on the context
    /// (traceability metadata). Any emitter failure fails the whole unit:
    /// partial output is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if an emitter is missing or fails, or if it
    /// writes outside the context's output root.
    pub fn dispatch(
        &self,
        ctx: &AnalysisContext,
        architecture: Architecture,
        service_type: ServiceType,
    ) -> Result<GeneratedFileMap, DispatchError> {
        if architecture == Architecture::Layered && ctx.protocols.is_empty() {
            tracing::warn!(unit = %ctx.unit().name(), "unit was never classified; assuming rest");
        }

        let mut files = GeneratedFileMap::new();
        for kind in Self::plan(ctx, architecture, service_type) {
            let emitter = self.registry.get(kind).ok_or(DispatchError::MissingEmitter(kind))?;
            let output = emitter.emit(ctx, service_type).map_err(|e| {
                tracing::error!(unit = %ctx.unit().name(), emitter = %kind, error = %e, "emitter failed");
                DispatchError::emitter(kind, e)
            })?;
            if let Some(path) = output.paths().find(|p| !p.starts_with(ctx.output_root())) {
                return Err(DispatchError::PathEscapesRoot {
                    path: path.to_path_buf(),
                    root: ctx.output_root().to_path_buf(),
                });
            }
            tracing::debug!(unit = %ctx.unit().name(), emitter = %kind, files = output.len(), "emitter done");
            files.merge(output);
        }
        files.merge(ctx.generated.clone());

        tracing::info!(
            unit = %ctx.unit().name(),
            architecture = %architecture,
            files = files.len(),
            "dispatched"
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use crate::error::EmitError;
    use crate::test_support::context_with;
    use mig_model::FileTag;
    use mig_test_utils::http_process;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Failing;

    impl Emitter for Failing {
        fn emit(&self, _ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
            Err(EmitError::Failed("template exploded".into()))
        }
    }

    #[derive(Debug)]
    struct Escaping;

    impl Emitter for Escaping {
        fn emit(&self, _ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
            let mut files = GeneratedFileMap::new();
            files.insert("/etc/passwd", "", FileTag::Shared);
            Ok(files)
        }
    }

    #[test]
    fn layered_plan_follows_classification() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with(dir.path(), Vec::new(), &[]);
        assert_eq!(
            ArchitectureDispatcher::plan(&ctx, Architecture::Layered, ServiceType::Soap),
            vec![EmitterKind::Rest]
        );

        ctx.protocols.insert(ProtocolTag::Soap);
        ctx.protocols.insert(ProtocolTag::Rest);
        assert_eq!(
            ArchitectureDispatcher::plan(&ctx, Architecture::Layered, ServiceType::Rest),
            vec![EmitterKind::Rest, EmitterKind::Soap]
        );
    }

    #[test]
    fn hexagonal_plan_ignores_classification() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with(dir.path(), Vec::new(), &[]);
        ctx.protocols.insert(ProtocolTag::Rest);
        assert_eq!(
            ArchitectureDispatcher::plan(&ctx, Architecture::Hexagonal, ServiceType::Soap),
            vec![EmitterKind::HexagonalDomain, EmitterKind::HexagonalSoap]
        );
        assert_eq!(
            ArchitectureDispatcher::plan(&ctx, Architecture::Hexagonal, ServiceType::Combined),
            vec![
                EmitterKind::HexagonalDomain,
                EmitterKind::HexagonalRest,
                EmitterKind::HexagonalSoap
            ]
        );
    }

    #[test]
    fn shared_context_files_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with(dir.path(), vec![http_process()], &[]);
        ctx.protocols.insert(ProtocolTag::Rest);
        let trace = ctx.output_root().join("traceability/LoanApproval.json");
        ctx.generated.insert(&trace, "{}", FileTag::Shared);

        let files = ArchitectureDispatcher::new()
            .dispatch(&ctx, Architecture::Layered, ServiceType::Combined)
            .unwrap();
        assert_eq!(files.get(&trace).unwrap().tag, FileTag::Shared);
        assert!(files.is_rooted_under(ctx.output_root()));
    }

    #[test]
    fn failing_emitter_fails_the_unit() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with(dir.path(), Vec::new(), &[]);
        ctx.protocols.insert(ProtocolTag::Rest);
        ctx.protocols.insert(ProtocolTag::Soap);

        let registry = EmitterRegistry::with_defaults().with(EmitterKind::Soap, Failing);
        let err = ArchitectureDispatcher::with_registry(registry)
            .dispatch(&ctx, Architecture::Layered, ServiceType::Combined)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Emitter { kind: EmitterKind::Soap, .. }));
    }

    #[test]
    fn missing_and_escaping_emitters_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with(dir.path(), Vec::new(), &[]);

        let empty = ArchitectureDispatcher::with_registry(EmitterRegistry::new());
        assert!(matches!(
            empty.dispatch(&ctx, Architecture::Hexagonal, ServiceType::Rest),
            Err(DispatchError::MissingEmitter(EmitterKind::HexagonalDomain))
        ));

        let escaping = ArchitectureDispatcher::with_registry(EmitterRegistry::new().with(EmitterKind::Rest, Escaping));
        assert!(matches!(
            escaping.dispatch(&ctx, Architecture::Layered, ServiceType::Rest),
            Err(DispatchError::PathEscapesRoot { .. })
        ));
    }
}
