//! Migration orchestrator
//!
//! Drives one run through its phases:
//!
//! 1. **Discovering**: immediate subdirectories of the input root holding a
//!    recognised artifact become units
//! 2. **Indexing**: every unit is read and its activities indexed, before
//!    any unit is dispatched
//! 3. **Dispatching**: per unit, analyse, dispatch, write files and write
//!    the unit's archives; units run on the worker pool
//! 4. **Packaging**: run-wide source archives and the optional gateway
//! 5. **Validating**: build every generated project
//! 6. **Reporting**: write the JSON report
//!
//! Only input-root problems, configuration errors and an unusable output
//! root abort the run. A unit that fails is recorded and the run goes on.

use crate::analyzer::{ParsedUnit, UnitAnalyzer};
use crate::archive::{unit_stems, ArchiveBuilder, ArchiveManifest};
use crate::config::MigrationConfig;
use crate::error::MigrationError;
use crate::materialize::{materialize, write_atomic};
use crate::phase::RunPhase;
use crate::pool::WorkerPool;
use crate::report::{MigrationReport, UnitOutcome};
use crate::validator::BuildValidator;
use futures::stream::{FuturesUnordered, StreamExt};
use mig_emit::{ArchitectureDispatcher, GatewayEmitter, GatewayRoute};
use mig_index::{build_index, SimilarityIndex};
use mig_model::{Architecture, GeneratedFileMap, ProtocolTag, ServiceType, Unit};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// First upstream port handed to gateway routes
const FIRST_ROUTE_PORT: u16 = 8081;

/// Settings every unit job needs, cloned into the job
#[derive(Debug, Clone)]
struct UnitJob {
    output_root: PathBuf,
    unit_root: PathBuf,
    archive_stem: String,
    package: String,
    architecture: Architecture,
    service_type: ServiceType,
}

/// Result of one unit job
#[derive(Debug)]
struct UnitRun {
    outcome: UnitOutcome,
    files: GeneratedFileMap,
    services: Vec<(String, ProtocolTag)>,
}

impl UnitRun {
    fn failed(unit: &Path, reason: impl Into<String>) -> Self {
        Self {
            outcome: UnitOutcome::Failed {
                unit: unit.to_path_buf(),
                reason: reason.into(),
            },
            files: GeneratedFileMap::new(),
            services: Vec::new(),
        }
    }
}

/// Runs a whole migration
#[derive(Debug)]
pub struct Orchestrator {
    config: MigrationConfig,
    index: Arc<dyn SimilarityIndex>,
    dispatcher: Arc<ArchitectureDispatcher>,
    validator: BuildValidator,
    phase: RunPhase,
}

impl Orchestrator {
    /// Create orchestrator for a validated configuration
    ///
    /// # Errors
    /// Returns [`MigrationError::Config`] if the configuration is rejected.
    pub fn new(config: MigrationConfig) -> Result<Self, MigrationError> {
        config.validate()?;
        let validator = BuildValidator::maven(config.build_tool.clone(), config.build_timeout())
            .with_search_depth(config.project_search_depth);
        Ok(Self {
            index: build_index(config.index_backend),
            dispatcher: Arc::new(ArchitectureDispatcher::new()),
            validator,
            phase: RunPhase::default(),
            config,
        })
    }

    /// With build validator
    #[must_use]
    pub fn with_validator(mut self, validator: BuildValidator) -> Self {
        self.validator = validator;
        self
    }

    /// With dispatcher
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: ArchitectureDispatcher) -> Self {
        self.dispatcher = Arc::new(dispatcher);
        self
    }

    /// With similarity index
    #[must_use]
    pub fn with_index(mut self, index: Arc<dyn SimilarityIndex>) -> Self {
        self.index = index;
        self
    }

    /// Run configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Shared similarity index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<dyn SimilarityIndex> {
        &self.index
    }

    /// Build validator
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &BuildValidator {
        &self.validator
    }

    /// Units under the input root, sorted by path
    ///
    /// A subdirectory that cannot be read is skipped with a warning.
    ///
    /// # Errors
    /// Returns an error if the input root is missing, not a directory or
    /// unreadable.
    pub fn discover(&self) -> Result<Vec<Unit>, MigrationError> {
        let root = &self.config.input_root;
        if !root.exists() {
            return Err(MigrationError::InputRootMissing(root.clone()));
        }
        if !root.is_dir() {
            return Err(MigrationError::InputRootNotDirectory(root.clone()));
        }

        let mut units = Vec::new();
        for entry in std::fs::read_dir(root).map_err(|e| MigrationError::io(root, e))? {
            let entry = entry.map_err(|e| MigrationError::io(root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match Unit::from_directory(&path) {
                Ok(Some(unit)) => units.push(unit),
                Ok(None) => tracing::debug!(dir = %path.display(), "no recognised artifacts"),
                Err(e) => tracing::warn!(dir = %path.display(), error = %e, "unreadable unit directory; skipped"),
            }
        }
        units.sort_by(|a, b| a.path().cmp(b.path()));
        tracing::info!(root = %root.display(), units = units.len(), "discovered units");
        Ok(units)
    }

    /// Run every phase and write the report
    ///
    /// # Errors
    /// Returns a [`MigrationError`] only for fatal conditions; unit,
    /// archive and build failures are recorded in the report instead.
    pub async fn execute(&mut self) -> Result<MigrationReport, MigrationError> {
        let started = Instant::now();
        let mut report = MigrationReport::new(self.config.architecture, self.config.service_type);
        tracing::info!(
            run_id = %report.run_id,
            input = %self.config.input_root.display(),
            output = %self.config.output_root.display(),
            architecture = %self.config.architecture,
            service_type = %self.config.service_type,
            "migration started"
        );

        self.phase.advance(RunPhase::Discovering)?;
        let units = self.discover()?;
        std::fs::create_dir_all(&self.config.output_root)
            .map_err(|e| MigrationError::io(&self.config.output_root, e))?;
        let output_root = absolute_root(&self.config.output_root)?;
        self.config.output_root.clone_from(&output_root);
        report.processed_units = units.iter().map(|u| u.path().to_path_buf()).collect();

        self.phase.advance(RunPhase::Indexing)?;
        let parsed = self.index_units(units);

        self.phase.advance(RunPhase::Dispatching)?;
        let (aggregate, services) = self.dispatch_units(parsed, &mut report).await;

        self.phase.advance(RunPhase::Packaging)?;
        let aggregate = self.package(aggregate, &services, &mut report);
        report.generated_files = aggregate.paths().map(Path::to_path_buf).collect();

        self.phase.advance(RunPhase::Validating)?;
        if self.config.validate {
            report.validation = self.validator.validate_all(&output_root).await;
        } else {
            tracing::info!("build validation disabled");
        }

        self.phase.advance(RunPhase::Reporting)?;
        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.write_report(&report)?;

        self.phase.advance(RunPhase::Done)?;
        tracing::info!(
            run_id = %report.run_id,
            units = report.processed_units.len(),
            failed = report.failures.len(),
            files = report.generated_files.len(),
            archives = report.archives.len(),
            duration_ms = report.duration_ms,
            "migration finished"
        );
        Ok(report)
    }

    /// Read every unit and fill the shared index
    fn index_units(&self, units: Vec<Unit>) -> Vec<ParsedUnit> {
        let analyzer = UnitAnalyzer::new();
        let parsed: Vec<ParsedUnit> = units.into_iter().map(|u| analyzer.read(Arc::new(u))).collect();
        for unit in &parsed {
            UnitAnalyzer::index(unit, self.index.as_ref());
        }
        tracing::info!(units = parsed.len(), indexed = self.index.len(), "shared index built");
        parsed
    }

    async fn dispatch_units(
        &self,
        parsed: Vec<ParsedUnit>,
        report: &mut MigrationReport,
    ) -> (GeneratedFileMap, BTreeSet<(String, ProtocolTag)>) {
        let workers = self.config.effective_workers(parsed.len());
        let pool = WorkerPool::new(workers);
        tracing::info!(units = parsed.len(), workers, "dispatching units");

        let stems = unit_stems(parsed.iter().map(|p| (p.unit.name(), p.unit_name())));
        let mut aggregate = GeneratedFileMap::new();
        let mut services = BTreeSet::new();
        let mut collect = |run: UnitRun| {
            aggregate.merge(run.files);
            services.extend(run.services);
            report.record(run.outcome);
        };

        if workers == 1 {
            for (unit, stem) in parsed.into_iter().zip(stems) {
                collect(self.run_unit(&pool, unit, stem).await);
            }
        } else {
            let mut running: FuturesUnordered<_> = parsed
                .into_iter()
                .zip(stems)
                .map(|(unit, stem)| self.run_unit(&pool, unit, stem))
                .collect();
            while let Some(run) = running.next().await {
                collect(run);
            }
        }

        let stats = pool.stats().await;
        tracing::info!(
            dispatched = stats.dispatched,
            completed = stats.completed,
            failed = stats.failed,
            peak_active = stats.peak_active,
            "worker pool drained"
        );
        (aggregate, services)
    }

    async fn run_unit(&self, pool: &WorkerPool, parsed: ParsedUnit, archive_stem: String) -> UnitRun {
        let unit_path = parsed.unit.path().to_path_buf();
        let job = UnitJob {
            output_root: self.config.output_root.clone(),
            unit_root: self.config.unit_root(parsed.unit.name()),
            archive_stem,
            package: self.config.package_root.clone(),
            architecture: self.config.architecture,
            service_type: self.config.service_type,
        };
        let index = Arc::clone(&self.index);
        let dispatcher = Arc::clone(&self.dispatcher);

        let label = parsed.unit.name().to_string();
        match pool.run(label, move || process_unit(&job, parsed, index, &dispatcher)).await {
            Ok(run) => run,
            Err(e) => UnitRun::failed(&unit_path, e.to_string()),
        }
    }

    /// Run-wide archives and the gateway project
    fn package(
        &self,
        mut aggregate: GeneratedFileMap,
        services: &BTreeSet<(String, ProtocolTag)>,
        report: &mut MigrationReport,
    ) -> GeneratedFileMap {
        let root = &self.config.output_root;
        let builder = ArchiveBuilder::new(root);
        let mut manifests = ArchiveManifest::source_aggregates(
            &aggregate,
            self.config.architecture,
            self.config.service_type,
            root,
        );

        if self.config.generate_gateway {
            let routes: Vec<GatewayRoute> = services
                .iter()
                .zip(FIRST_ROUTE_PORT..)
                .map(|((service, protocol), port)| GatewayRoute::new(service.clone(), *protocol, port))
                .collect();
            match GatewayEmitter::new(root, self.config.package_root.clone()).emit(&routes) {
                Ok(files) => match materialize(&files) {
                    Ok(_) => {
                        manifests.extend(ArchiveManifest::gateway(&files, root));
                        aggregate.merge(files);
                    }
                    Err(e) => report.warnings.push(format!("gateway not written: {e}")),
                },
                Err(e) => report.warnings.push(format!("gateway not generated: {e}")),
            }
        }

        for manifest in &manifests {
            match builder.build(manifest) {
                Ok(path) => report.archives.push(path),
                Err(e) => {
                    tracing::error!(archive = manifest.file_name(), error = %e, "archive dropped");
                    report.warnings.push(e.to_string());
                }
            }
        }
        aggregate
    }

    fn write_report(&self, report: &MigrationReport) -> Result<(), MigrationError> {
        let path = self.config.report_path();
        let json = report
            .to_json()
            .map_err(|e| MigrationError::io(&path, std::io::Error::from(e)))?;
        write_atomic(&path, &json).map_err(|e| MigrationError::io(e.path, e.source))?;
        tracing::info!(report = %path.display(), "report written");
        Ok(())
    }
}

/// Absolute form of the output root; relative roots are taken from the
/// working directory
fn absolute_root(root: &Path) -> Result<PathBuf, MigrationError> {
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(root))
        .map_err(|e| MigrationError::io(root, e))
}

/// Analyse, dispatch, write and archive one unit
fn process_unit(
    job: &UnitJob,
    parsed: ParsedUnit,
    index: Arc<dyn SimilarityIndex>,
    dispatcher: &ArchitectureDispatcher,
) -> UnitRun {
    let unit_path = parsed.unit.path().to_path_buf();
    let ctx = UnitAnalyzer::context(parsed, index, &job.unit_root, &job.package);

    let files = match dispatcher.dispatch(&ctx, job.architecture, job.service_type) {
        Ok(files) => files,
        Err(e) => {
            tracing::error!(unit = %ctx.unit().name(), error = %e, "unit failed");
            return UnitRun::failed(&unit_path, e.to_string());
        }
    };
    let written = match materialize(&files) {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(unit = %ctx.unit().name(), error = %e, "unit output not written");
            return UnitRun::failed(&unit_path, e.to_string());
        }
    };

    let mut warnings = ctx.warnings.clone();
    let builder = ArchiveBuilder::new(&job.output_root);
    let mut archives = Vec::new();
    let manifests = ArchiveManifest::for_unit(
        &job.archive_stem,
        &files,
        job.architecture,
        job.service_type,
        &job.output_root,
    );
    for manifest in manifests {
        match builder.build(&manifest) {
            Ok(path) => archives.push(path),
            Err(e) => {
                tracing::error!(unit = %ctx.unit().name(), archive = manifest.file_name(), error = %e, "archive dropped");
                warnings.push(e.to_string());
            }
        }
    }

    let protocols: Vec<ProtocolTag> = match job.architecture {
        Architecture::Layered => ctx.protocols.iter().copied().collect(),
        Architecture::Hexagonal => job.service_type.protocols().to_vec(),
    };
    let service = ctx.service_name();
    UnitRun {
        outcome: UnitOutcome::Succeeded {
            unit: unit_path,
            files: written,
            archives,
            warnings,
        },
        files,
        services: protocols.into_iter().map(|p| (service.clone(), p)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{BuildOutput, BuildTool};
    use async_trait::async_trait;
    use mig_test_utils::{Workspace, HTTP_PROCESS, LOAN_REQUEST_XSD};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Debug)]
    struct AbsentTool;

    #[async_trait]
    impl BuildTool for AbsentTool {
        fn name(&self) -> &str {
            "absent"
        }

        async fn probe(&self) -> Result<String, String> {
            Err("absent not found on PATH".to_string())
        }

        async fn package(&self, _project: &Path) -> std::io::Result<BuildOutput> {
            unreachable!("build must not run without the tool")
        }
    }

    fn orchestrator(workspace: &Workspace, config: MigrationConfig) -> Orchestrator {
        let config = MigrationConfig {
            input_root: workspace.input(),
            output_root: workspace.output(),
            ..config
        };
        Orchestrator::new(config)
            .unwrap()
            .with_validator(BuildValidator::new(Arc::new(AbsentTool), Duration::from_secs(1)))
    }

    #[test]
    fn discover_filters_and_sorts() {
        let workspace = Workspace::new();
        workspace.unit("zeta", &[("Z.process", HTTP_PROCESS)]);
        workspace.unit("alpha", &[("A.xsd", LOAN_REQUEST_XSD)]);
        workspace.unit("notes", &[("README.md", "# notes")]);
        workspace.unit("legacy", &[("app.bwp", "")]);
        std::fs::write(workspace.input().join("stray.process"), HTTP_PROCESS).unwrap();

        let units = orchestrator(&workspace, MigrationConfig::default()).discover().unwrap();
        let names: Vec<&str> = units.iter().map(Unit::name).collect();
        assert_eq!(names, vec!["alpha", "legacy", "zeta"]);
    }

    #[test]
    fn missing_input_root_is_fatal() {
        let workspace = Workspace::new();
        let config = MigrationConfig::new(workspace.root().join("nope"), workspace.output());
        let err = Orchestrator::new(config).unwrap().discover().unwrap_err();
        assert!(matches!(err, MigrationError::InputRootMissing(_)));

        let file = workspace.root().join("file");
        std::fs::write(&file, "").unwrap();
        let err = Orchestrator::new(MigrationConfig::new(&file, workspace.output()))
            .unwrap()
            .discover()
            .unwrap_err();
        assert!(matches!(err, MigrationError::InputRootNotDirectory(_)));
    }

    #[test]
    fn relative_output_root_is_made_absolute() {
        let resolved = absolute_root(Path::new("out")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::env::current_dir().unwrap().join("out"));

        let fixed = Path::new("/srv/migrated");
        assert_eq!(absolute_root(fixed).unwrap(), fixed);
    }

    #[tokio::test]
    async fn units_sharing_a_process_name_keep_their_archives() {
        let workspace = Workspace::new();
        workspace.unit("Alpha", &[("LoanApproval.process", HTTP_PROCESS)]);
        workspace.unit("Beta", &[("LoanApproval.process", HTTP_PROCESS)]);

        let config = MigrationConfig::default()
            .with_output_layout(crate::config::OutputLayout::PerUnit)
            .with_parallel(false)
            .with_validation(false);
        let report = orchestrator(&workspace, config).execute().await.unwrap();

        let per_unit: Vec<&PathBuf> = report
            .archives
            .iter()
            .filter(|p| p.file_name().is_some_and(|n| !n.to_string_lossy().starts_with("src_")))
            .collect();
        let unique: BTreeSet<&&PathBuf> = per_unit.iter().collect();
        assert_eq!(per_unit.len(), 2);
        assert_eq!(unique.len(), 2);

        for dir in ["Alpha", "Beta"] {
            let archive = workspace.output().join(format!("{dir}_LoanApproval_rest.zip"));
            assert!(report.archives.contains(&archive), "missing {}", archive.display());
            let zip = zip::ZipArchive::new(std::fs::File::open(&archive).unwrap()).unwrap();
            assert!(zip.file_names().all(|name| name.starts_with(dir)), "{dir} archive holds foreign entries");
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Orchestrator::new(MigrationConfig::default().with_max_workers(0)).unwrap_err();
        assert!(matches!(err, MigrationError::Config(_)));
    }

    #[tokio::test]
    async fn execute_walks_all_phases() {
        let workspace = Workspace::new();
        workspace.loan_unit("loans");

        let mut orchestrator = orchestrator(&workspace, MigrationConfig::default());
        let report = orchestrator.execute().await.unwrap();
        assert_eq!(orchestrator.phase(), RunPhase::Done);
        assert!(report.is_clean());
        assert!(workspace.output().join("migration_report.json").is_file());
        assert!(report.archives.contains(&workspace.output().join("LoanApproval_rest.zip")));
        assert!(report.archives.contains(&workspace.output().join("LoanApproval_soap.zip")));
        assert!(report.archives.contains(&workspace.output().join("src_rest.zip")));

        let rest = workspace.output().join("rest");
        assert!(!report.validation[&rest].tool_found);
        assert!(!report.validation[&rest].compiled);
    }

    #[tokio::test]
    async fn second_run_is_rejected_by_the_phase_machine() {
        let workspace = Workspace::new();
        workspace.loan_unit("loans");

        let mut orchestrator = orchestrator(&workspace, MigrationConfig::default().with_validation(false));
        orchestrator.execute().await.unwrap();
        assert!(matches!(
            orchestrator.execute().await,
            Err(MigrationError::InvalidTransition { .. })
        ));
    }
}
