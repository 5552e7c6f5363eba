//! Dispatch across architectures, end to end through the public API

use mig_emit::{AnalysisContext, ArchitectureDispatcher};
use mig_index::NullIndex;
use mig_model::{Architecture, FileTag, ProtocolTag, ServiceType, Unit};
use mig_test_utils::{http_process, settlement_process, Workspace, LOAN_REQUEST_XSD};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn loan_context(workspace: &Workspace) -> AnalysisContext {
    let dir = workspace.unit("loans", &[("LoanRequest.xsd", LOAN_REQUEST_XSD)]);
    let unit = Arc::new(Unit::new(&dir, Vec::new()));
    let mut ctx = AnalysisContext::new(unit, workspace.output(), "com.example.loan", Arc::new(NullIndex));
    ctx.processes.push(http_process());
    ctx.schemas.push(dir.join("LoanRequest.xsd"));
    ctx
}

#[test]
fn layered_emits_one_project_per_protocol() {
    let workspace = Workspace::new();
    let mut ctx = loan_context(&workspace);
    ctx.protocols.extend(ProtocolTag::ALL);

    let files = ArchitectureDispatcher::new()
        .dispatch(&ctx, Architecture::Layered, ServiceType::Combined)
        .unwrap();
    assert_eq!(
        files.tags(),
        vec![FileTag::Protocol(ProtocolTag::Rest), FileTag::Protocol(ProtocolTag::Soap)]
    );
    for protocol in ProtocolTag::ALL {
        let root = workspace.output().join(protocol.as_str());
        assert!(files.contains(&root.join("pom.xml")), "no {protocol} pom");
        assert!(files
            .with_tag(FileTag::Protocol(protocol))
            .is_rooted_under(&root));
    }
}

#[test]
fn hexagonal_soap_never_emits_rest_adapter() {
    let workspace = Workspace::new();
    let mut ctx = loan_context(&workspace);
    ctx.protocols.insert(ProtocolTag::Rest);

    let files = ArchitectureDispatcher::new()
        .dispatch(&ctx, Architecture::Hexagonal, ServiceType::Soap)
        .unwrap();
    assert_eq!(
        files.tags(),
        vec![FileTag::HexagonalDomain, FileTag::HexagonalAdapter(ProtocolTag::Soap)]
    );
    assert!(!files.paths().any(|p| p.to_string_lossy().contains("adapter/input/rest")));
    assert!(files.is_rooted_under(&workspace.output().join("hexagonal")));
}

#[test]
fn units_with_separate_roots_never_collide() {
    let workspace = Workspace::new();
    let dispatcher = ArchitectureDispatcher::new();

    let mut maps = Vec::new();
    for (name, process) in [("alpha", http_process()), ("beta", settlement_process())] {
        let dir = workspace.unit(name, &[]);
        let unit = Arc::new(Unit::new(&dir, Vec::new()));
        let mut ctx = AnalysisContext::new(unit, workspace.output().join(name), "com.example", Arc::new(NullIndex));
        ctx.processes.push(process);
        ctx.protocols.insert(ProtocolTag::Rest);
        maps.push(dispatcher.dispatch(&ctx, Architecture::Layered, ServiceType::Combined).unwrap());
    }

    let total: usize = maps.iter().map(mig_model::GeneratedFileMap::len).sum();
    let mut union = mig_model::GeneratedFileMap::new();
    for map in maps {
        union.merge(map);
    }
    assert_eq!(union.len(), total);
}
