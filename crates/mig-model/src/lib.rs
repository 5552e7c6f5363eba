//! Process Migration Model
//!
//! Shared domain types for the migration pipeline.
//!
//! # Core Concepts
//!
//! - [`Unit`]: One discovered source directory and its artifact files
//! - [`ActivityDescriptor`]: One parsed process activity with its configuration and transitions
//! - [`ProcessDefinition`]: A parsed process graph
//! - [`SchemaEntity`]: A schema-declared entity with ordered, typed fields
//! - [`ProtocolTag`] / [`Architecture`] / [`ServiceType`]: Generation selectors
//! - [`GeneratedFileMap`]: Output path → tagged literal content
//!
//! # Example
//!
//! ```rust
//! use mig_model::{FileTag, GeneratedFileMap, ProtocolTag};
//!
//! let mut files = GeneratedFileMap::new();
//! files.insert("/out/rest/pom.xml", "<project/>", FileTag::Protocol(ProtocolTag::Rest));
//! assert_eq!(files.with_tag(FileTag::Protocol(ProtocolTag::Rest)).len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod activity;
mod file_map;
mod process;
mod protocol;
mod schema;
mod unit;

pub use activity::{ActivityDescriptor, ActivityKind, Transition};
pub use file_map::{FileTag, GeneratedFile, GeneratedFileMap};
pub use process::{ProcessDefinition, Starter};
pub use protocol::{Architecture, ProtocolTag, SelectorError, ServiceHint, ServiceType};
pub use schema::{SchemaEntity, SchemaField, SemanticType};
pub use unit::{ArtifactKind, Unit, UnitArtifact};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
