//! Project session and package registry
//!
//! A [`ProjectSession`] is the explicit context for one build or test
//! iteration: the parsed project manifest plus every package discovered in
//! the project tree. Multi-target loops drop the session and load a fresh
//! one between iterations; references obtained before a reload must never be
//! reused afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::config::defaults::{BIN_ROOT, DEFAULT_CC, PACKAGE_MANIFEST, PROJECT_MANIFEST, TARGET_DIR};
use crate::core::package::{Package, PackageType};
use crate::error::ProjectError;

/// On-disk project manifest (project.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectManifest {
    /// Project declaration
    pub project: ProjectDecl,

    /// Toolchain configuration
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

/// The `[project]` section of project.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDecl {
    /// Project name
    pub name: String,

    /// Project description
    #[serde(default)]
    pub description: Option<String>,
}

/// The `[toolchain]` section of project.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolchainConfig {
    /// Compiler driver command
    #[serde(default = "default_cc")]
    pub cc: String,

    /// Extra compiler flags
    #[serde(default)]
    pub cflags: Vec<String>,
}

fn default_cc() -> String {
    DEFAULT_CC.to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cc: default_cc(),
            cflags: Vec::new(),
        }
    }
}

impl ProjectManifest {
    /// Parse a project manifest from TOML content
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// A loaded project: manifest data plus all discovered packages
#[derive(Debug)]
pub struct Project {
    name: String,
    base_path: PathBuf,
    toolchain: ToolchainConfig,
    packages: BTreeMap<String, Package>,
}

impl Project {
    /// Project name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project root directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Toolchain configuration
    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }

    /// Iterate over all packages, ordered by name
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }
}

/// One build/test iteration's view of the project
///
/// Holds the loaded [`Project`] and the memoized testable-package set.
/// Dropping the session and calling [`ProjectSession::load`] again is the
/// reset operation: it rereads every manifest from disk.
#[derive(Debug)]
pub struct ProjectSession {
    project: Project,
    pub(crate) testable: OnceLock<BTreeSet<String>>,
}

impl ProjectSession {
    /// Load the project rooted at `root`
    ///
    /// Reads project.toml and scans the tree for pkg.toml package manifests.
    /// The `bin/` and `targets/` directories and hidden directories are not
    /// scanned.
    pub fn load(root: &Path) -> Result<Self, ProjectError> {
        let manifest_path = root.join(PROJECT_MANIFEST);
        if !manifest_path.exists() {
            return Err(ProjectError::ManifestNotFound {
                path: root.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(&manifest_path).map_err(|e| ProjectError::Io {
            path: manifest_path.clone(),
            error: e.to_string(),
        })?;
        let manifest = ProjectManifest::from_toml(&content)
            .map_err(|e| ProjectError::ManifestParse { source: e })?;

        let packages = discover_packages(root)?;

        tracing::debug!(
            "Loaded project '{}' with {} packages",
            manifest.project.name,
            packages.len()
        );

        Ok(Self {
            project: Project {
                name: manifest.project.name,
                base_path: root.to_path_buf(),
                toolchain: manifest.toolchain,
                packages,
            },
            testable: OnceLock::new(),
        })
    }

    /// The loaded project
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Look up a package by full name
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.project.packages.get(name)
    }

    /// Resolve a package by full name, failing if it does not exist
    pub fn resolve_package(&self, name: &str) -> Result<&Package, ProjectError> {
        self.package(name).ok_or_else(|| ProjectError::PackageNotFound {
            name: name.to_string(),
        })
    }

    /// All packages of the given type, or every package when `None`
    ///
    /// Results are ordered by package name.
    pub fn packages_of_type(&self, package_type: Option<PackageType>) -> Vec<&Package> {
        self.project
            .packages
            .values()
            .filter(|p| package_type.map_or(true, |t| p.package_type() == t))
            .collect()
    }
}

/// Scan the project tree for pkg.toml manifests
fn discover_packages(root: &Path) -> Result<BTreeMap<String, Package>, ProjectError> {
    let mut packages: BTreeMap<String, Package> = BTreeMap::new();

    let skip_dirs = [root.join(BIN_ROOT), root.join(TARGET_DIR)];
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if skip_dirs.iter().any(|d| entry.path() == d) {
            return false;
        }
        entry.depth() == 0
            || !entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    });

    for entry in walker {
        let entry = entry.map_err(|e| ProjectError::Io {
            path: root.to_path_buf(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() || entry.file_name() != PACKAGE_MANIFEST {
            continue;
        }

        let base_path = entry
            .path()
            .parent()
            .unwrap_or(root)
            .to_path_buf();
        let package = Package::load(&base_path, entry.path())?;

        if let Some(existing) = packages.get(package.name()) {
            return Err(ProjectError::DuplicatePackage {
                name: package.name().to_string(),
                first: existing.base_path().to_path_buf(),
                second: base_path,
            });
        }
        packages.insert(package.name().to_string(), package);
    }

    Ok(packages)
}
