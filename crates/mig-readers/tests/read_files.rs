//! Reading artifacts from disk

use mig_model::{ActivityKind, SemanticType};
use mig_readers::{ArtifactReader, ParseError, ProcessReader, SchemaReader};
use std::fs;

#[test]
fn reads_unit_artifacts_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let process_path = dir.path().join("LoanApproval.process");
    let schema_path = dir.path().join("Loan.xsd");

    fs::write(
        &process_path,
        r#"<process><activity name="CallCreditBureau" type="http"><http method="GET" url="http://bureau"/></activity></process>"#,
    )
    .unwrap();
    fs::write(
        &schema_path,
        r#"<schema><element name="LoanRequest"><complexType><sequence>
             <element name="amount" type="xs:decimal"/><element name="term" type="xs:int"/>
           </sequence></complexType></element></schema>"#,
    )
    .unwrap();

    let process = ProcessReader.read(&process_path).unwrap();
    assert_eq!(process.name, "LoanApproval");
    assert_eq!(process.source.as_deref(), Some(process_path.as_path()));
    assert_eq!(process.activities[0].kind, ActivityKind::HttpCall);
    assert_eq!(process.activities[0].config_value("method"), Some("GET"));

    let entities = SchemaReader.read(&schema_path).unwrap();
    assert_eq!(entities[0].fields[0].ty, SemanticType::Decimal);
    assert_eq!(entities[0].fields[1].ty, SemanticType::Integer);
}

#[test]
fn truncated_file_is_recoverable_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Broken.process");
    fs::write(&path, "<process name=\"Broken\"><activity name=\"a\"").unwrap();

    let err = ProcessReader.read(&path).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. } | ParseError::MissingRoot(_)));
}
