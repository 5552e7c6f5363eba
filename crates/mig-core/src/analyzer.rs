//! Unit analysis
//!
//! Turns a discovered [`Unit`] into an [`AnalysisContext`]:
//! - Parse every process definition (best effort)
//! - Collect schema artifacts by reference
//! - Index activities into the shared [`SimilarityIndex`]
//! - Derive service hints from index lookups
//! - Classify the protocols the unit needs
//!
//! Reading and indexing are separate steps so the orchestrator can fill the
//! index for every unit before any unit is dispatched.

use mig_emit::AnalysisContext;
use mig_index::SimilarityIndex;
use mig_model::{ActivityKind, ArtifactKind, FileTag, ProcessDefinition, ProtocolTag, ServiceHint, Unit};
use mig_readers::{ArtifactReader, ProcessReader};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Matches inspected per hint query
pub const HINT_DEPTH: usize = 3;

/// Hint lookups: query text and the activity kind a match must have
const HINT_QUERIES: [(ServiceHint, &str, ActivityKind); 3] = [
    (ServiceHint::Http, "REST or HTTP service call", ActivityKind::HttpCall),
    (ServiceHint::Messaging, "JMS messaging operation", ActivityKind::MessageCall),
    (ServiceHint::Database, "SQL database operation", ActivityKind::DatabaseCall),
];

/// Whether [`UnitAnalyzer::analyze`] writes to the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexingPolicy {
    /// Index the unit's activities during analysis
    #[default]
    Eager,
    /// The index was already filled by a shared indexing pass
    Skip,
}

/// A unit whose process definitions have been read
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    /// Source unit
    pub unit: Arc<Unit>,
    /// Definitions that parsed
    pub processes: Vec<ProcessDefinition>,
    /// One message per artifact that did not
    pub warnings: Vec<String>,
}

impl ParsedUnit {
    /// First parsed process name, else the directory name
    #[must_use]
    pub fn unit_name(&self) -> &str {
        self.processes
            .first()
            .map(|p| p.name.as_str())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.unit.name())
    }

    /// Total activity count
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.processes.iter().map(|p| p.activities.len()).sum()
    }
}

#[derive(Debug, Serialize)]
struct TraceRecord<'a> {
    unit: &'a str,
    directory: &'a str,
    processes: Vec<TraceProcess<'a>>,
    schemas: Vec<String>,
    hints: &'a BTreeSet<ServiceHint>,
    protocols: &'a BTreeSet<ProtocolTag>,
}

#[derive(Debug, Serialize)]
struct TraceProcess<'a> {
    name: &'a str,
    activities: usize,
    transitions: usize,
}

/// Builds analysis contexts for units
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitAnalyzer {
    policy: IndexingPolicy,
}

impl UnitAnalyzer {
    /// Create analyzer that indexes eagerly
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With indexing policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: IndexingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Indexing policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> IndexingPolicy {
        self.policy
    }

    /// Parse every process definition of a unit
    ///
    /// A definition that fails to read is logged and left out.
    #[must_use]
    pub fn read(&self, unit: Arc<Unit>) -> ParsedUnit {
        let mut processes = Vec::new();
        let mut warnings = Vec::new();
        for path in unit.artifacts_of(ArtifactKind::ProcessDefinition) {
            match ProcessReader.read(path) {
                Ok(process) => processes.push(process),
                Err(e) => {
                    tracing::warn!(unit = %unit.name(), error = %e, "process definition skipped");
                    warnings.push(e.to_string());
                }
            }
        }
        ParsedUnit {
            unit,
            processes,
            warnings,
        }
    }

    /// Append every parsed activity to the index
    pub fn index(parsed: &ParsedUnit, index: &dyn SimilarityIndex) {
        for process in &parsed.processes {
            index.index_process(process);
        }
        tracing::debug!(unit = %parsed.unit.name(), activities = parsed.activity_count(), "indexed");
    }

    /// Read, index (per policy) and build the context in one step
    #[must_use]
    pub fn analyze(
        &self,
        unit: Arc<Unit>,
        index: Arc<dyn SimilarityIndex>,
        output_root: impl Into<PathBuf>,
        package: &str,
    ) -> AnalysisContext {
        let parsed = self.read(unit);
        if self.policy == IndexingPolicy::Eager {
            Self::index(&parsed, index.as_ref());
        }
        Self::context(parsed, index, output_root, package)
    }

    /// Build the context of an already-read unit
    ///
    /// Never fails: a unit with nothing parseable yields an empty context
    /// classified as rest.
    #[must_use]
    pub fn context(
        parsed: ParsedUnit,
        index: Arc<dyn SimilarityIndex>,
        output_root: impl Into<PathBuf>,
        package: &str,
    ) -> AnalysisContext {
        let ParsedUnit {
            unit,
            processes,
            warnings,
        } = parsed;
        let schemas: Vec<PathBuf> = unit.artifacts_of(ArtifactKind::Schema).map(Path::to_path_buf).collect();

        let mut ctx = AnalysisContext::new(unit, output_root, package, index);
        ctx.processes = processes;
        ctx.schemas = schemas;
        ctx.warnings = warnings;
        ctx.hints = Self::hints(ctx.index());
        ctx.protocols = Self::classify(&ctx);
        Self::attach_traceability(&mut ctx);

        tracing::info!(
            unit = %ctx.unit().name(),
            processes = ctx.processes.len(),
            schemas = ctx.schemas.len(),
            protocols = ?ctx.protocols,
            "analyzed"
        );
        ctx
    }

    /// Protocols a context needs; never empty
    ///
    /// A schema suggests soap; an activity with an HTTP marker in its kind or
    /// name suggests rest. With no signal the unit is assumed to be rest.
    #[must_use]
    pub fn classify(ctx: &AnalysisContext) -> BTreeSet<ProtocolTag> {
        let mut tags = BTreeSet::new();
        if !ctx.schemas.is_empty() {
            tags.insert(ProtocolTag::Soap);
        }
        if ctx.activities().any(mig_model::ActivityDescriptor::has_http_marker) {
            tags.insert(ProtocolTag::Rest);
        }
        if tags.is_empty() {
            tags.insert(ProtocolTag::Rest);
        }
        tags
    }

    /// Service hints from index lookups
    ///
    /// A hint holds when any of the top matches for its query has the
    /// matching activity kind.
    #[must_use]
    pub fn hints(index: &dyn SimilarityIndex) -> BTreeSet<ServiceHint> {
        HINT_QUERIES
            .iter()
            .filter(|(_, text, kind)| index.query(text, HINT_DEPTH).iter().any(|m| &m.descriptor.kind == kind))
            .map(|(hint, _, _)| *hint)
            .collect()
    }

    fn attach_traceability(ctx: &mut AnalysisContext) {
        let record = TraceRecord {
            unit: ctx.unit_name(),
            directory: ctx.unit().name(),
            processes: ctx
                .processes
                .iter()
                .map(|p| TraceProcess {
                    name: &p.name,
                    activities: p.activities.len(),
                    transitions: p.transitions.len(),
                })
                .collect(),
            schemas: ctx
                .schemas
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
            hints: &ctx.hints,
            protocols: &ctx.protocols,
        };
        let path = ctx
            .output_root()
            .join("traceability")
            .join(format!("{}.json", ctx.unit_name()));
        match serde_json::to_string_pretty(&record) {
            Ok(json) => ctx.generated.insert(path, json, FileTag::Shared),
            Err(e) => tracing::warn!(unit = %ctx.unit().name(), error = %e, "traceability record skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mig_index::{EmbeddingIndex, NullIndex};
    use mig_model::ActivityDescriptor;
    use mig_test_utils::{Workspace, HTTP_PROCESS, LOAN_REQUEST_XSD, SETTLEMENT_PROCESS};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn unit_at(dir: &Path) -> Arc<Unit> {
        Arc::new(Unit::from_directory(dir).unwrap().unwrap_or_else(|| Unit::new(dir, Vec::new())))
    }

    #[test]
    fn loan_unit_is_rest_and_soap() {
        let workspace = Workspace::new();
        let dir = workspace.loan_unit("loans");
        let index: Arc<dyn SimilarityIndex> = Arc::new(EmbeddingIndex::new());

        let ctx = UnitAnalyzer::new().analyze(unit_at(&dir), Arc::clone(&index), workspace.output(), "com.example");
        assert_eq!(ctx.processes.len(), 1);
        assert_eq!(ctx.schemas, vec![dir.join("LoanRequest.xsd")]);
        assert_eq!(ctx.protocols, BTreeSet::from([ProtocolTag::Rest, ProtocolTag::Soap]));
        assert_eq!(index.len(), 1);
        assert!(ctx.hints.contains(&ServiceHint::Http));
    }

    #[test]
    fn empty_unit_defaults_to_rest() {
        let workspace = Workspace::new();
        let dir = workspace.unit("empty", &[]);

        let ctx = UnitAnalyzer::new().analyze(unit_at(&dir), Arc::new(NullIndex), workspace.output(), "com.example");
        assert!(ctx.processes.is_empty());
        assert_eq!(ctx.protocols, BTreeSet::from([ProtocolTag::Rest]));
    }

    #[test]
    fn malformed_process_is_a_warning() {
        let workspace = Workspace::new();
        let dir = workspace.unit(
            "mixed",
            &[("Broken.process", ""), ("Settle.process", SETTLEMENT_PROCESS)],
        );

        let ctx = UnitAnalyzer::new().analyze(unit_at(&dir), Arc::new(NullIndex), workspace.output(), "com.example");
        assert_eq!(ctx.processes.len(), 1);
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn skip_policy_leaves_index_alone() {
        let workspace = Workspace::new();
        let dir = workspace.unit("loans", &[("LoanApproval.process", HTTP_PROCESS)]);
        let index: Arc<dyn SimilarityIndex> = Arc::new(EmbeddingIndex::new());

        let analyzer = UnitAnalyzer::new().with_policy(IndexingPolicy::Skip);
        let _ = analyzer.analyze(unit_at(&dir), Arc::clone(&index), workspace.output(), "com.example");
        assert!(index.is_empty());
    }

    #[test]
    fn traceability_is_written_under_unit_root() {
        let workspace = Workspace::new();
        let dir = workspace.unit(
            "loans",
            &[("LoanApproval.process", HTTP_PROCESS), ("LoanRequest.xsd", LOAN_REQUEST_XSD)],
        );

        let ctx = UnitAnalyzer::new().analyze(unit_at(&dir), Arc::new(NullIndex), workspace.output(), "com.example");
        let path = workspace.output().join("traceability/LoanApproval.json");
        let file = ctx.generated.get(&path).unwrap();
        assert_eq!(file.tag, FileTag::Shared);

        let json: serde_json::Value = serde_json::from_str(&file.content).unwrap();
        assert_eq!(json["unit"], "LoanApproval");
        assert_eq!(json["processes"][0]["activities"], 1);
        assert_eq!(json["protocols"], serde_json::json!(["rest", "soap"]));
        assert_eq!(json["schemas"], serde_json::json!(["LoanRequest.xsd"]));
    }

    #[test]
    fn hints_need_a_matching_kind() {
        let index = EmbeddingIndex::new();
        assert!(UnitAnalyzer::hints(&index).is_empty());

        index.index(ActivityDescriptor::new(ActivityKind::MessageCall, "PublishSettlement").with_entry("queue", "jms.out"));
        assert_eq!(UnitAnalyzer::hints(&index), BTreeSet::from([ServiceHint::Messaging]));
    }

    proptest! {
        #[test]
        fn classification_is_never_empty(
            names in proptest::collection::vec("[a-zA-Z]{0,12}", 0..6),
            kinds in proptest::collection::vec("[a-z]{0,8}", 0..6),
            with_schema in any::<bool>(),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let mut process = ProcessDefinition::new("p");
            for (name, kind) in names.iter().zip(kinds.iter()) {
                process.activities.push(ActivityDescriptor::new(ActivityKind::from_type_str(kind), name.clone()));
            }
            let mut ctx = AnalysisContext::new(
                Arc::new(Unit::new(dir.path(), Vec::new())),
                dir.path().join("out"),
                "com.example",
                Arc::new(NullIndex),
            );
            ctx.processes.push(process);
            if with_schema {
                ctx.schemas.push(dir.path().join("s.xsd"));
            }

            let tags = UnitAnalyzer::classify(&ctx);
            prop_assert!(!tags.is_empty());
            prop_assert_eq!(tags.contains(&ProtocolTag::Soap), with_schema);
        }
    }
}
