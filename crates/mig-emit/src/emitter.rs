//! Emitter capability and lookup table
//!
//! Provides [`Emitter`], the single `emit` capability, and
//! [`EmitterRegistry`], which maps each [`EmitterKind`] to its emitter.

use crate::context::AnalysisContext;
use crate::error::EmitError;
use crate::hexagonal::{HexagonalDomainEmitter, HexagonalRestEmitter, HexagonalSoapEmitter};
use crate::layered::{RestEmitter, SoapEmitter};
use mig_model::{GeneratedFileMap, ProtocolTag, ServiceType};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Turns an analysis context into literal output files
///
/// Implementations must be deterministic: the same context yields the
/// same keys and contents.
pub trait Emitter: Send + Sync + fmt::Debug {
    /// Produce files for one unit
    ///
    /// `service_type` is the adapter selection of the run; layered
    /// emitters ignore it.
    fn emit(&self, ctx: &AnalysisContext, service_type: ServiceType) -> Result<GeneratedFileMap, EmitError>;
}

/// Closed set of emitter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EmitterKind {
    /// Layered REST project
    Rest,
    /// Layered SOAP project
    Soap,
    /// Hexagonal domain, ports, output adapters and wiring
    HexagonalDomain,
    /// Hexagonal REST input adapter
    HexagonalRest,
    /// Hexagonal SOAP input adapter
    HexagonalSoap,
}

impl EmitterKind {
    /// All kinds
    pub const ALL: [EmitterKind; 5] = [
        EmitterKind::Rest,
        EmitterKind::Soap,
        EmitterKind::HexagonalDomain,
        EmitterKind::HexagonalRest,
        EmitterKind::HexagonalSoap,
    ];

    /// Layered emitter for a protocol
    #[inline]
    #[must_use]
    pub fn layered(protocol: ProtocolTag) -> Self {
        match protocol {
            ProtocolTag::Rest => Self::Rest,
            ProtocolTag::Soap => Self::Soap,
        }
    }

    /// Hexagonal adapter emitter for a protocol
    #[inline]
    #[must_use]
    pub fn hexagonal_adapter(protocol: ProtocolTag) -> Self {
        match protocol {
            ProtocolTag::Rest => Self::HexagonalRest,
            ProtocolTag::Soap => Self::HexagonalSoap,
        }
    }

    /// Stable lower-case name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Soap => "soap",
            Self::HexagonalDomain => "hexagonal-domain",
            Self::HexagonalRest => "hexagonal-rest",
            Self::HexagonalSoap => "hexagonal-soap",
        }
    }
}

impl Display for EmitterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup table from emitter kind to emitter
#[derive(Debug, Clone, Default)]
pub struct EmitterRegistry {
    emitters: HashMap<EmitterKind, Arc<dyn Emitter>>,
}

impl EmitterRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            emitters: HashMap::new(),
        }
    }

    /// Create registry with the built-in emitters
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(EmitterKind::Rest, RestEmitter);
        registry.register(EmitterKind::Soap, SoapEmitter);
        registry.register(EmitterKind::HexagonalDomain, HexagonalDomainEmitter);
        registry.register(EmitterKind::HexagonalRest, HexagonalRestEmitter);
        registry.register(EmitterKind::HexagonalSoap, HexagonalSoapEmitter);
        registry
    }

    /// Register (or replace) the emitter for a kind
    pub fn register(&mut self, kind: EmitterKind, emitter: impl Emitter + 'static) {
        self.emitters.insert(kind, Arc::new(emitter));
    }

    /// With an emitter replaced
    #[must_use]
    pub fn with(mut self, kind: EmitterKind, emitter: impl Emitter + 'static) -> Self {
        self.register(kind, emitter);
        self
    }

    /// Get emitter for kind
    #[inline]
    #[must_use]
    pub fn get(&self, kind: EmitterKind) -> Option<&Arc<dyn Emitter>> {
        self.emitters.get(&kind)
    }

    /// Check if kind is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: EmitterKind) -> bool {
        self.emitters.contains_key(&kind)
    }

    /// Number of registered emitters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Noop;

    impl Emitter for Noop {
        fn emit(&self, _ctx: &AnalysisContext, _service_type: ServiceType) -> Result<GeneratedFileMap, EmitError> {
            Ok(GeneratedFileMap::new())
        }
    }

    #[test]
    fn registry_with_defaults_covers_every_kind() {
        let registry = EmitterRegistry::with_defaults();
        assert_eq!(registry.len(), EmitterKind::ALL.len());
        for kind in EmitterKind::ALL {
            assert!(registry.contains(kind), "missing {kind}");
        }
    }

    #[test]
    fn register_replaces_existing() {
        let registry = EmitterRegistry::with_defaults().with(EmitterKind::Rest, Noop);
        assert_eq!(registry.len(), 5);
        assert!(format!("{:?}", registry.get(EmitterKind::Rest).unwrap()).contains("Noop"));
    }

    #[test]
    fn kind_lookup_by_protocol() {
        assert_eq!(EmitterKind::layered(ProtocolTag::Soap), EmitterKind::Soap);
        assert_eq!(EmitterKind::hexagonal_adapter(ProtocolTag::Rest), EmitterKind::HexagonalRest);
    }
}
