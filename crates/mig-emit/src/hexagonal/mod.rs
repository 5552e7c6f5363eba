//! Hexagonal emitters
//!
//! One project under `<unit-root>/hexagonal` in package `<package>.hexagonal`:
//! a protocol-independent domain with ports, written by
//! [`HexagonalDomainEmitter`], plus one input adapter per protocol of the
//! selected service type.

mod domain;
mod rest;
mod soap;

pub use domain::HexagonalDomainEmitter;
pub use rest::HexagonalRestEmitter;
pub use soap::HexagonalSoapEmitter;

use crate::context::AnalysisContext;
use crate::error::EmitError;
use crate::java::{checked_package, Project};
use crate::naming::{camel_case, pascal_case};
use mig_model::{FileTag, SchemaField, ServiceHint};
use std::fmt::Write as _;

const SEGMENT: &str = "hexagonal";

/// Hexagonal project rooted under the unit's output root
fn project(ctx: &AnalysisContext, tag: FileTag) -> Result<Project, EmitError> {
    let package = checked_package(ctx.package())?;
    Ok(Project::new(
        ctx.output_root().join(SEGMENT),
        format!("{package}.{SEGMENT}"),
        tag,
    ))
}

/// Output ports and the adapters implementing them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputPort {
    Persistence,
    Messaging,
    HttpClient,
}

impl OutputPort {
    const ALL: [OutputPort; 3] = [OutputPort::Persistence, OutputPort::Messaging, OutputPort::HttpClient];

    /// Ports a context needs, in a fixed order
    fn required(ctx: &AnalysisContext) -> Vec<OutputPort> {
        Self::ALL.into_iter().filter(|p| ctx.needs(p.hint())).collect()
    }

    fn hint(self) -> ServiceHint {
        match self {
            Self::Persistence => ServiceHint::Database,
            Self::Messaging => ServiceHint::Messaging,
            Self::HttpClient => ServiceHint::Http,
        }
    }

    fn interface(self) -> &'static str {
        match self {
            Self::Persistence => "PersistencePort",
            Self::Messaging => "MessagingPort",
            Self::HttpClient => "HttpClientPort",
        }
    }

    fn adapter(self) -> &'static str {
        match self {
            Self::Persistence => "JpaPersistenceAdapter",
            Self::Messaging => "JmsMessagingAdapter",
            Self::HttpClient => "WebClientHttpAdapter",
        }
    }

    /// Sub-package of the adapter, relative to the project package
    fn adapter_package(self) -> &'static str {
        match self {
            Self::Persistence => "adapter.output.persistence",
            Self::Messaging => "adapter.output.messaging",
            Self::HttpClient => "adapter.output.http",
        }
    }

    fn field(self) -> String {
        camel_case(self.interface())
    }
}

/// Setter calls copying every field from `from` into `to`
fn copy_fields(fields: &[SchemaField], from: &str, to: &str, indent: &str) -> String {
    let mut out = String::new();
    for field in fields {
        let accessor = pascal_case(&field.name);
        let _ = writeln!(out, "{indent}{to}.set{accessor}({from}.get{accessor}());");
    }
    out
}
