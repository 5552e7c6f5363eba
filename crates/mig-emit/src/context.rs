//! Per-unit analysis context
//!
//! Provides [`AnalysisContext`], the working state threaded from analysis
//! through dispatch. One context per unit; only the similarity index
//! handle is shared across units.

use crate::naming::pascal_case;
use mig_index::SimilarityIndex;
use mig_model::{
    ActivityDescriptor, ActivityKind, GeneratedFileMap, ProcessDefinition, ProtocolTag, SchemaEntity, ServiceHint,
    Unit,
};
use mig_readers::{ArtifactReader, SchemaReader};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A schema file loaded for emitters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    /// Source path
    pub path: PathBuf,
    /// Raw file content
    pub content: String,
    /// Declared entities
    pub entities: Vec<SchemaEntity>,
}

impl SchemaDocument {
    /// File name of the source schema
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "schema.xsd".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Working state for one unit
pub struct AnalysisContext {
    unit: Arc<Unit>,
    output_root: PathBuf,
    package: String,
    index: Arc<dyn SimilarityIndex>,
    /// Successfully parsed process definitions
    pub processes: Vec<ProcessDefinition>,
    /// Schema artifacts, by reference
    pub schemas: Vec<PathBuf>,
    /// Files produced during analysis (traceability metadata)
    pub generated: GeneratedFileMap,
    /// Service kinds suggested by index lookups
    pub hints: BTreeSet<ServiceHint>,
    /// Protocols the unit needs, set by classification
    pub protocols: BTreeSet<ProtocolTag>,
    /// Non-fatal problems met while analysing
    pub warnings: Vec<String>,
    documents: OnceCell<Vec<SchemaDocument>>,
}

impl AnalysisContext {
    /// Create empty context for a unit
    #[must_use]
    pub fn new(
        unit: Arc<Unit>,
        output_root: impl Into<PathBuf>,
        package: impl Into<String>,
        index: Arc<dyn SimilarityIndex>,
    ) -> Self {
        Self {
            unit,
            output_root: output_root.into(),
            package: package.into(),
            index,
            processes: Vec::new(),
            schemas: Vec::new(),
            generated: GeneratedFileMap::new(),
            hints: BTreeSet::new(),
            protocols: BTreeSet::new(),
            warnings: Vec::new(),
            documents: OnceCell::new(),
        }
    }

    /// Source unit
    #[inline]
    #[must_use]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Output root for this unit's projects
    #[inline]
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Root package for generated sources
    #[inline]
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Shared similarity index (read-only use)
    #[inline]
    #[must_use]
    pub fn index(&self) -> &dyn SimilarityIndex {
        self.index.as_ref()
    }

    /// Unit name: the first parsed process's name, else the directory name
    #[must_use]
    pub fn unit_name(&self) -> &str {
        self.processes
            .first()
            .map(|p| p.name.as_str())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.unit.name())
    }

    /// Class-name stem for generated services
    #[must_use]
    pub fn service_name(&self) -> String {
        pascal_case(self.unit_name())
    }

    /// All parsed activities across processes
    pub fn activities(&self) -> impl Iterator<Item = &ActivityDescriptor> {
        self.processes.iter().flat_map(|p| p.activities.iter())
    }

    /// Check if the unit needs an integration, by activity kind or index hint
    #[must_use]
    pub fn needs(&self, hint: ServiceHint) -> bool {
        let kind = match hint {
            ServiceHint::Http => ActivityKind::HttpCall,
            ServiceHint::Messaging => ActivityKind::MessageCall,
            ServiceHint::Database => ActivityKind::DatabaseCall,
        };
        self.hints.contains(&hint) || self.processes.iter().any(|p| p.has_kind(&kind))
    }

    /// Schema documents, read on first use
    ///
    /// Unreadable schemas are skipped with a warning; the result is cached
    /// so every emitter sees the same documents.
    pub fn schema_documents(&self) -> &[SchemaDocument] {
        self.documents.get_or_init(|| {
            self.schemas
                .iter()
                .filter_map(|path| {
                    let content = match std::fs::read_to_string(path) {
                        Ok(content) => content,
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "schema unreadable; skipped");
                            return None;
                        }
                    };
                    match SchemaReader.parse(&content, path) {
                        Ok(entities) => Some(SchemaDocument {
                            path: path.clone(),
                            content,
                            entities,
                        }),
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "schema malformed; skipped");
                            None
                        }
                    }
                })
                .collect()
        })
    }

    /// Entities declared across all schemas, first declaration wins
    #[must_use]
    pub fn entities(&self) -> Vec<&SchemaEntity> {
        let mut seen = BTreeSet::new();
        self.schema_documents()
            .iter()
            .flat_map(|d| d.entities.iter())
            .filter(|e| seen.insert(e.name.as_str()))
            .collect()
    }
}

impl fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("unit", &self.unit.name())
            .field("output_root", &self.output_root)
            .field("package", &self.package)
            .field("processes", &self.processes.len())
            .field("schemas", &self.schemas.len())
            .field("hints", &self.hints)
            .field("protocols", &self.protocols)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mig_index::NullIndex;

    fn context(dir: &Path) -> AnalysisContext {
        let unit = Arc::new(Unit::new(dir.join("loan-unit"), Vec::new()));
        AnalysisContext::new(unit, dir.join("out"), "com.example", Arc::new(NullIndex))
    }

    #[test]
    fn unit_name_prefers_first_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        assert_eq!(ctx.unit_name(), "loan-unit");
        assert_eq!(ctx.service_name(), "LoanUnit");

        ctx.processes.push(ProcessDefinition::new("LoanApproval"));
        assert_eq!(ctx.unit_name(), "LoanApproval");
    }

    #[test]
    fn needs_combines_activities_and_hints() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        assert!(!ctx.needs(ServiceHint::Database));

        let mut process = ProcessDefinition::new("P");
        process
            .activities
            .push(ActivityDescriptor::new(ActivityKind::DatabaseCall, "Store"));
        ctx.processes.push(process);
        ctx.hints.insert(ServiceHint::Messaging);

        assert!(ctx.needs(ServiceHint::Database));
        assert!(ctx.needs(ServiceHint::Messaging));
        assert!(!ctx.needs(ServiceHint::Http));
    }

    #[test]
    fn schema_documents_skip_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("Loan.xsd");
        std::fs::write(
            &good,
            r#"<schema><element name="LoanRequest"><complexType><sequence><element name="amount" type="decimal"/></sequence></complexType></element></schema>"#,
        )
        .unwrap();
        let bad = dir.path().join("Broken.xsd");
        std::fs::write(&bad, "<schema><element").unwrap();

        let mut ctx = context(dir.path());
        ctx.schemas = vec![bad, good, dir.path().join("Missing.xsd")];

        assert_eq!(ctx.schema_documents().len(), 1);
        assert_eq!(ctx.schema_documents()[0].file_name(), "Loan.xsd");
        assert_eq!(ctx.entities()[0].name, "LoanRequest");
    }
}
