//! Error types for anvil
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Project and package registry errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Project manifest not found
    #[error("No project.toml found at '{path}'. Run anvil from a project root.")]
    ManifestNotFound { path: PathBuf },

    /// Project manifest parse error
    #[error("Failed to parse project.toml: {source}")]
    ManifestParse { source: toml::de::Error },

    /// Package manifest parse error
    #[error("Failed to parse package manifest '{path}': {error}")]
    PackageParse { path: PathBuf, error: String },

    /// Package name does not match the identifier pattern
    #[error("Invalid package name '{name}' in '{path}'")]
    InvalidPackageName { name: String, path: PathBuf },

    /// Two packages declare the same full name
    #[error("Duplicate package name '{name}' (at '{first}' and '{second}')")]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Package not found in the project
    #[error("Package '{name}' not found in project")]
    PackageNotFound { name: String },

    /// IO error while loading the project
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Target store errors
#[derive(Error, Debug)]
pub enum TargetError {
    /// Target not found
    #[error("Target '{name}' not found")]
    NotFound { name: String },

    /// Target definition parse error
    #[error("Failed to parse target '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Target serialization error
    #[error("Failed to serialize target '{name}': {error}")]
    Serialize { name: String, error: String },

    /// IO error while persisting a target
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Build and builder-invocation errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// External command could not be spawned
    #[error("Failed to run '{command}': {error}")]
    CommandSpawn { command: String, error: String },

    /// External command exited with a failure status
    #[error("Command '{command}' failed ({status}):\n{output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    /// Target has no buildable package
    #[error("Target '{target}' has no app package to build")]
    NoAppPackage { target: String },

    /// Target references a package the project does not contain
    #[error("Target references unknown package '{name}'")]
    UnknownPackage { name: String },

    /// Package has no compilable sources
    #[error("Package '{package}' has no sources to compile")]
    NoSources { package: String },

    /// No probe command configured for load/debug
    #[error("Target '{target}' has no {operation} command configured")]
    NoProbeCommand { target: String, operation: String },

    /// Expected build artifact is missing
    #[error("Artifact not found: '{path}'. Build the target first.")]
    MissingArtifact { path: PathBuf },

    /// Test executable reported failure
    #[error("Test failure for package '{package}':\n{output}")]
    TestFailed { package: String, output: String },

    /// IO error during a build step
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Test orchestration errors
#[derive(Error, Debug)]
pub enum TestError {
    /// A named package has no unit tests to run
    #[error("Package '{name}' contains no unit tests")]
    NoUnitTests { name: String },

    /// Selection expanded to nothing
    #[error("No testable packages found")]
    NoTestablePackages,

    /// The canonical base test target is missing
    #[error("Can't find unit test target '{name}'")]
    BaseTargetMissing { name: String },

    /// One or more test packages failed
    #[error("Test failure(s):\nPassed tests: [{}]\nFailed tests: [{}]", passed.join(" "), failed.join(" "))]
    Failures {
        passed: Vec<String>,
        failed: Vec<String>,
    },

    /// Project reload failed mid-batch
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Target resolution or persistence failed
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Builder construction failed
    #[error(transparent)]
    Build(#[from] BuildError),
}
