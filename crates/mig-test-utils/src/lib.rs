//! Testing utilities for the process migration workspace
//!
//! Shared fixtures: artifact documents, parsed processes and on-disk unit trees.

#![allow(missing_docs)]

use mig_model::{ActivityDescriptor, ActivityKind, ProcessDefinition, Transition};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema declaring `LoanRequest { amount: decimal, term: int }`
pub const LOAN_REQUEST_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:loans">
  <xs:element name="LoanRequest">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="amount" type="xs:decimal"/>
        <xs:element name="term" type="xs:int"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

/// Process with a single HTTP activity
pub const HTTP_PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pd:process xmlns:pd="http://ns.tibco.com/bw/process" name="LoanApproval">
  <pd:starter name="onRequest" ref="httpReceiver"/>
  <pd:activity name="CallCreditBureau" type="http">
    <pd:http method="POST" url="http://bureau/score"/>
  </pd:activity>
</pd:process>
"#;

/// Process with database, messaging and generic activities, no HTTP marker
pub const SETTLEMENT_PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pd:process xmlns:pd="http://ns.tibco.com/bw/process" name="Settlement">
  <pd:activity name="StoreSettlement" type="jdbc">
    <pd:sql>INSERT INTO settlements (id, amount) VALUES (?, ?)<pd:param name="id" type="string"/></pd:sql>
  </pd:activity>
  <pd:activity name="PublishSettlement" type="jms">
    <pd:jms queue="settlement.events" connection-factory="cf"/>
  </pd:activity>
  <pd:activity name="Audit" type="mapper"/>
  <pd:transition from="StoreSettlement" to="PublishSettlement"/>
  <pd:transition from="PublishSettlement" to="Audit" condition="published"/>
</pd:process>
"#;

/// Parsed form of [`HTTP_PROCESS`]
pub fn http_process() -> ProcessDefinition {
    let mut process = ProcessDefinition::new("LoanApproval");
    process.activities.push(
        ActivityDescriptor::new(ActivityKind::HttpCall, "CallCreditBureau")
            .with_entry("method", "POST")
            .with_entry("url", "http://bureau/score")
            .with_entry("content_type", "application/json"),
    );
    process
}

/// Database + messaging process without any HTTP marker
pub fn settlement_process() -> ProcessDefinition {
    let mut process = ProcessDefinition::new("Settlement");
    process.activities.push(
        ActivityDescriptor::new(ActivityKind::DatabaseCall, "StoreSettlement")
            .with_entry("sql", "INSERT INTO settlements (id, amount) VALUES (?, ?)"),
    );
    process.activities.push(
        ActivityDescriptor::new(ActivityKind::MessageCall, "PublishSettlement").with_entry("queue", "settlement.events"),
    );
    process.attach_transition(Transition::new("StoreSettlement", "PublishSettlement", None));
    process
}

/// Write a unit directory with the given `(file name, content)` pairs
pub fn write_unit(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (file, content) in files {
        fs::write(dir.join(file), content).unwrap();
    }
    dir
}

/// Temporary input and output roots
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create workspace with an empty `input/` directory
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        Self { dir }
    }

    /// Temporary root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Input root holding unit directories
    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    /// Output root; not created
    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    /// Add a unit under the input root
    pub fn unit(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        write_unit(&self.input(), name, files)
    }

    /// Unit with one schema and one HTTP process
    pub fn loan_unit(&self, name: &str) -> PathBuf {
        self.unit(name, &[("LoanRequest.xsd", LOAN_REQUEST_XSD), ("LoanApproval.process", HTTP_PROCESS)])
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
