//! Build validation of generated projects
//!
//! A project is any directory directly holding `pom.xml` or a `src/`
//! directory. Validation never fails: a missing descriptor, a missing tool,
//! a spawn error, a non-zero exit or a timeout all end up in the
//! [`ValidationResult`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use walkdir::WalkDir;

/// Build descriptor file name
pub const BUILD_DESCRIPTOR: &str = "pom.xml";

/// Source-tree marker directory
pub const SOURCE_MARKER: &str = "src";

/// Outcome of validating one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The build tool was found and answered its version probe
    pub tool_found: bool,
    /// The build exited successfully
    pub compiled: bool,
    /// No build was attempted because the project has no descriptor
    pub skipped: bool,
    /// Combined build output, or the reason nothing ran
    pub output: String,
}

impl ValidationResult {
    /// Project without a build descriptor
    #[must_use]
    pub fn no_descriptor() -> Self {
        Self {
            skipped: true,
            output: format!("no {BUILD_DESCRIPTOR} present; build skipped"),
            ..Self::default()
        }
    }

    /// Build tool unavailable
    #[must_use]
    pub fn tool_unavailable(reason: impl Into<String>) -> Self {
        Self {
            output: reason.into(),
            ..Self::default()
        }
    }

    /// A build was attempted
    #[must_use]
    pub fn attempted(compiled: bool, output: impl Into<String>) -> Self {
        Self {
            tool_found: true,
            compiled,
            skipped: false,
            output: output.into(),
        }
    }
}

/// Output of one build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Exit status was success
    pub success: bool,
    /// stdout followed by stderr
    pub output: String,
}

/// External build tool
#[async_trait]
pub trait BuildTool: Send + Sync + fmt::Debug {
    /// Executable name, for messages
    fn name(&self) -> &str;

    /// Check the tool is installed; returns its version line
    async fn probe(&self) -> Result<String, String>;

    /// Package the project, skipping tests
    async fn package(&self, project: &Path) -> std::io::Result<BuildOutput>;
}

/// Maven on the `PATH`
#[derive(Debug, Clone)]
pub struct MavenTool {
    executable: String,
}

impl MavenTool {
    /// Create tool for an executable name or path
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl Default for MavenTool {
    fn default() -> Self {
        Self::new("mvn")
    }
}

#[async_trait]
impl BuildTool for MavenTool {
    fn name(&self) -> &str {
        &self.executable
    }

    async fn probe(&self) -> Result<String, String> {
        if which::which(&self.executable).is_err() {
            return Err(format!("{} not found on PATH", self.executable));
        }
        let output = Command::new(&self.executable)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run {} --version: {e}", self.executable))?;
        if !output.status.success() {
            return Err(format!("{} --version exited with {}", self.executable, output.status));
        }
        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        tracing::debug!(tool = %self.executable, version = %version, "build tool found");
        Ok(version)
    }

    async fn package(&self, project: &Path) -> std::io::Result<BuildOutput> {
        let output = Command::new(&self.executable)
            .arg("-DskipTests")
            .arg("package")
            .current_dir(project)
            .kill_on_drop(true)
            .output()
            .await?;
        Ok(BuildOutput {
            success: output.status.success(),
            output: format!(
                "{}\n{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ),
        })
    }
}

/// Finds and builds generated projects
#[derive(Debug)]
pub struct BuildValidator {
    tool: Arc<dyn BuildTool>,
    timeout: Duration,
    search_depth: usize,
    probe: OnceCell<Result<String, String>>,
}

impl BuildValidator {
    /// Create validator over a build tool
    #[must_use]
    pub fn new(tool: Arc<dyn BuildTool>, timeout: Duration) -> Self {
        Self {
            tool,
            timeout,
            search_depth: 2,
            probe: OnceCell::new(),
        }
    }

    /// Validator running Maven
    #[must_use]
    pub fn maven(executable: impl Into<String>, timeout: Duration) -> Self {
        Self::new(Arc::new(MavenTool::new(executable)), timeout)
    }

    /// With project search depth below the root
    #[inline]
    #[must_use]
    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth.max(1);
        self
    }

    /// Directories under `root` that look like projects, sorted
    ///
    /// Searches up to the configured depth and does not descend into a
    /// directory once it qualifies.
    #[must_use]
    pub fn discover_projects(&self, root: &Path) -> Vec<PathBuf> {
        let mut projects = Vec::new();
        let mut entries = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.search_depth)
            .sort_by_file_name()
            .into_iter();
        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "unreadable entry during project search");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            if is_project(entry.path()) {
                projects.push(entry.into_path());
                entries.skip_current_dir();
            }
        }
        projects
    }

    /// Validate one project
    pub async fn validate(&self, project: &Path) -> ValidationResult {
        if !project.join(BUILD_DESCRIPTOR).is_file() {
            tracing::info!(project = %project.display(), "no build descriptor; skipped");
            return ValidationResult::no_descriptor();
        }

        let probe = self.probe.get_or_init(|| self.probe_tool()).await;
        if let Err(reason) = probe {
            tracing::warn!(project = %project.display(), reason = %reason, "build tool unavailable");
            return ValidationResult::tool_unavailable(reason.clone());
        }

        match tokio::time::timeout(self.timeout, self.tool.package(project)).await {
            Ok(Ok(build)) => {
                if build.success {
                    tracing::info!(project = %project.display(), "build succeeded");
                } else {
                    tracing::warn!(project = %project.display(), "build failed");
                }
                ValidationResult::attempted(build.success, build.output)
            }
            Ok(Err(e)) => {
                tracing::warn!(project = %project.display(), error = %e, "build could not start");
                ValidationResult::attempted(false, format!("failed to run {}: {e}", self.tool.name()))
            }
            Err(_) => {
                tracing::warn!(project = %project.display(), timeout_secs = self.timeout.as_secs(), "build timed out");
                ValidationResult::attempted(
                    false,
                    format!("{} timed out after {}s", self.tool.name(), self.timeout.as_secs()),
                )
            }
        }
    }

    async fn probe_tool(&self) -> Result<String, String> {
        match tokio::time::timeout(self.timeout, self.tool.probe()).await {
            Ok(probe) => probe,
            Err(_) => Err(format!(
                "{} --version timed out after {}s",
                self.tool.name(),
                self.timeout.as_secs()
            )),
        }
    }

    /// Validate every project under `root`, one at a time
    pub async fn validate_all(&self, root: &Path) -> BTreeMap<PathBuf, ValidationResult> {
        let mut results = BTreeMap::new();
        for project in self.discover_projects(root) {
            let result = self.validate(&project).await;
            results.insert(project, result);
        }
        results
    }
}

fn is_project(dir: &Path) -> bool {
    dir.join(BUILD_DESCRIPTOR).is_file() || dir.join(SOURCE_MARKER).is_dir()
}
