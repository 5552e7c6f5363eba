//! Process Migration Readers
//!
//! The boundary between legacy artifact files and the model types.
//!
//! # Readers
//!
//! - [`ProcessReader`]: `.process` files into a `ProcessDefinition`
//! - [`SchemaReader`]: `.xsd` files into ordered `SchemaEntity` lists
//!
//! Both are namespace-agnostic and never panic on malformed input; every
//! failure is a [`ParseError`] the caller can log and skip.
//!
//! # Example
//!
//! ```rust
//! use mig_readers::{ArtifactReader, SchemaReader};
//! use std::path::Path;
//!
//! let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!   <xs:element name="LoanRequest"><xs:complexType><xs:sequence>
//!     <xs:element name="amount" type="xs:decimal"/>
//!   </xs:sequence></xs:complexType></xs:element>
//! </xs:schema>"#;
//!
//! let entities = SchemaReader.parse(xsd, Path::new("Loan.xsd")).unwrap();
//! assert_eq!(entities[0].name, "LoanRequest");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod readers;
mod xml;

pub use error::ParseError;
pub use readers::{ArtifactReader, ProcessReader, SchemaReader};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
