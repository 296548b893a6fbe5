//! Target builders
//!
//! The [`Builder`] trait is the seam between command orchestration and the
//! toolchain: build, clean, load, debug, size, and test execution for one
//! resolved target. [`TargetBuilder`] is the concrete implementation that
//! drives the configured compiler and probe commands.

use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

use crate::config::defaults::BIN_ROOT;
use crate::core::package::Package;
use crate::core::project::{ProjectSession, ToolchainConfig};
use crate::core::target::{test_target_name, Target};
use crate::error::BuildError;

/// Size of one build artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeEntry {
    /// Artifact path relative to the target's bin directory
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Artifact sizes for one target
#[derive(Debug, Clone, Default)]
pub struct SizeReport {
    /// Per-artifact sizes, ordered by path
    pub entries: Vec<SizeEntry>,
    /// Total size in bytes
    pub total: u64,
}

/// Build operations over one resolved target
pub trait Builder {
    /// Build the target
    fn build(&mut self) -> Result<(), BuildError>;

    /// Remove the target's build artifacts
    fn clean(&mut self) -> Result<(), BuildError>;

    /// Load the built image onto the board
    fn load(&mut self, extra_cmd: Option<&str>) -> Result<(), BuildError>;

    /// Open a debugger session against the board
    fn debug(&mut self, extra_cmd: Option<&str>, attach_only: bool) -> Result<(), BuildError>;

    /// Report artifact sizes
    fn size(&mut self) -> Result<SizeReport, BuildError>;

    /// Build and execute the unit-test binary for `pack`
    fn test(&mut self, pack: &Package) -> Result<(), BuildError>;
}

/// Creates builders bound to a resolved target
pub trait BuilderFactory {
    /// Construct a builder for `target` within `session`
    fn builder_for(
        &self,
        session: &ProjectSession,
        target: &Target,
    ) -> Result<Box<dyn Builder>, BuildError>;
}

/// Factory producing [`TargetBuilder`]s from the project toolchain
#[derive(Debug, Default)]
pub struct ToolchainBuilderFactory;

impl BuilderFactory for ToolchainBuilderFactory {
    fn builder_for(
        &self,
        session: &ProjectSession,
        target: &Target,
    ) -> Result<Box<dyn Builder>, BuildError> {
        TargetBuilder::new(session, target).map(|b| Box::new(b) as Box<dyn Builder>)
    }
}

/// Root directory for all build output within a project
pub fn bin_root(project_root: &Path) -> PathBuf {
    project_root.join(BIN_ROOT)
}

/// Concrete builder invoking the configured toolchain and probe commands
pub struct TargetBuilder {
    target: Target,
    toolchain: ToolchainConfig,
    /// App package resolved at construction time, if the target names one
    app: Option<(String, PathBuf)>,
    bin_dir: PathBuf,
}

impl TargetBuilder {
    /// Create a builder for `target`
    ///
    /// Fails if the target names an app package the project does not
    /// contain.
    pub fn new(session: &ProjectSession, target: &Target) -> Result<Self, BuildError> {
        let project = session.project();

        let app = match &target.config().app {
            Some(name) => {
                let pack = session
                    .package(name)
                    .ok_or_else(|| BuildError::UnknownPackage { name: name.clone() })?;
                Some((pack.name().to_string(), pack.base_path().to_path_buf()))
            }
            None => None,
        };

        Ok(Self {
            target: target.clone(),
            toolchain: project.toolchain().clone(),
            app,
            bin_dir: bin_root(project.base_path()).join(target.name()),
        })
    }

    fn app_artifact(&self) -> Result<PathBuf, BuildError> {
        let (name, _) = self.app.as_ref().ok_or_else(|| BuildError::NoAppPackage {
            target: self.target.name().to_string(),
        })?;
        Ok(self
            .bin_dir
            .join("app")
            .join(format!("{}.elf", test_target_name(name))))
    }

    /// Compile every C source under `base_path` into a single executable
    fn compile(&self, pack_name: &str, base_path: &Path, output: &Path) -> Result<(), BuildError> {
        let mut sources: Vec<PathBuf> = WalkDir::new(base_path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "c"))
            .map(|e| e.path().to_path_buf())
            .collect();
        sources.sort();

        if sources.is_empty() {
            return Err(BuildError::NoSources {
                package: pack_name.to_string(),
            });
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BuildError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        let mut cmd = Command::new(&self.toolchain.cc);
        cmd.args(&self.toolchain.cflags)
            .args(&sources)
            .arg("-o")
            .arg(output);

        let output_text = run_command(cmd)?;
        self.write_log(pack_name, &output_text)?;

        Ok(())
    }

    fn write_log(&self, pack_name: &str, content: &str) -> Result<(), BuildError> {
        let logs_dir = self.bin_dir.join("logs");
        std::fs::create_dir_all(&logs_dir).map_err(|e| BuildError::Io {
            path: logs_dir.clone(),
            error: e.to_string(),
        })?;
        let log_path = logs_dir.join(format!("{}.log", test_target_name(pack_name)));
        std::fs::write(&log_path, content).map_err(|e| BuildError::Io {
            path: log_path,
            error: e.to_string(),
        })
    }

    /// Run a probe command, appending the artifact and any extra arguments
    fn run_probe(
        &self,
        probe_cmd: &str,
        artifact: Option<&Path>,
        extra_cmd: Option<&str>,
    ) -> Result<(), BuildError> {
        let mut parts = probe_cmd.split_whitespace();
        let program = parts.next().ok_or_else(|| BuildError::NoProbeCommand {
            target: self.target.name().to_string(),
            operation: "probe".to_string(),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(parts);
        if let Some(path) = artifact {
            cmd.arg(path);
        }
        if let Some(extra) = extra_cmd {
            cmd.args(extra.split_whitespace());
        }

        run_command(cmd).map(|_| ())
    }

    /// Execute a compiled test binary, mapping failure to [`BuildError::TestFailed`]
    fn run_test_executable(&self, executable: &Path, pack: &Package) -> Result<(), BuildError> {
        if !executable.is_file() {
            return Err(BuildError::MissingArtifact {
                path: executable.to_path_buf(),
            });
        }

        let mut cmd = Command::new(executable);
        cmd.current_dir(pack.base_path());

        let output = cmd.output().map_err(|e| BuildError::CommandSpawn {
            command: executable.display().to_string(),
            error: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(BuildError::TestFailed {
                package: pack.name().to_string(),
                output: combined_output(&output),
            });
        }

        tracing::debug!("Test binary for {} passed", pack.name());
        Ok(())
    }
}

impl Builder for TargetBuilder {
    fn build(&mut self) -> Result<(), BuildError> {
        std::fs::create_dir_all(&self.bin_dir).map_err(|e| BuildError::Io {
            path: self.bin_dir.clone(),
            error: e.to_string(),
        })?;

        match self.app.clone() {
            Some((name, base_path)) => {
                let artifact = self.app_artifact()?;
                tracing::info!("Compiling app package {name}");
                self.compile(&name, &base_path, &artifact)
            }
            // Targets without an app (the base unit-test target and its
            // clones) only need their output directory materialized.
            None => {
                tracing::debug!(
                    "Target {} has no app package, nothing to compile",
                    self.target.name()
                );
                Ok(())
            }
        }
    }

    fn clean(&mut self) -> Result<(), BuildError> {
        if self.bin_dir.exists() {
            std::fs::remove_dir_all(&self.bin_dir).map_err(|e| BuildError::Io {
                path: self.bin_dir.clone(),
                error: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn load(&mut self, extra_cmd: Option<&str>) -> Result<(), BuildError> {
        let probe_cmd = self.target.config().probe.load.clone().ok_or_else(|| {
            BuildError::NoProbeCommand {
                target: self.target.name().to_string(),
                operation: "load".to_string(),
            }
        })?;

        let artifact = self.app_artifact()?;
        if !artifact.is_file() {
            return Err(BuildError::MissingArtifact { path: artifact });
        }

        self.run_probe(&probe_cmd, Some(&artifact), extra_cmd)
    }

    fn debug(&mut self, extra_cmd: Option<&str>, attach_only: bool) -> Result<(), BuildError> {
        let probe_cmd = self.target.config().probe.debug.clone().ok_or_else(|| {
            BuildError::NoProbeCommand {
                target: self.target.name().to_string(),
                operation: "debug".to_string(),
            }
        })?;

        if attach_only {
            return self.run_probe(&probe_cmd, None, extra_cmd);
        }

        let artifact = self.app_artifact()?;
        if !artifact.is_file() {
            return Err(BuildError::MissingArtifact { path: artifact });
        }
        self.run_probe(&probe_cmd, Some(&artifact), extra_cmd)
    }

    fn size(&mut self) -> Result<SizeReport, BuildError> {
        if !self.bin_dir.exists() {
            return Err(BuildError::MissingArtifact {
                path: self.bin_dir.clone(),
            });
        }

        let mut report = SizeReport::default();
        for entry in WalkDir::new(&self.bin_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let metadata = entry.metadata().map_err(|e| BuildError::Io {
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?;
            let name = entry
                .path()
                .strip_prefix(&self.bin_dir)
                .unwrap_or(entry.path())
                .display()
                .to_string();
            report.total += metadata.len();
            report.entries.push(SizeEntry {
                name,
                size: metadata.len(),
            });
        }

        Ok(report)
    }

    fn test(&mut self, pack: &Package) -> Result<(), BuildError> {
        let executable = self
            .bin_dir
            .join("test")
            .join(format!("{}.elf", test_target_name(pack.name())));

        self.compile(pack.name(), pack.base_path(), &executable)?;
        self.run_test_executable(&executable, pack)
    }
}

/// Run an external command, capturing output
///
/// Returns the combined stdout/stderr text on success.
fn run_command(mut cmd: Command) -> Result<String, BuildError> {
    let cmd_display = format_command(&cmd);
    tracing::debug!("Running: {}", cmd_display);

    let output = cmd.output().map_err(|e| BuildError::CommandSpawn {
        command: cmd_display.clone(),
        error: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(BuildError::CommandFailed {
            command: cmd_display,
            status: output.status.to_string(),
            output: combined_output(&output),
        });
    }

    Ok(combined_output(&output))
}

fn combined_output(output: &std::process::Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

fn format_command(cmd: &Command) -> String {
    let mut display = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        display.push(' ');
        display.push_str(&arg.to_string_lossy());
    }
    display
}
