//! Package definition handling
//!
//! Handles parsing of pkg.toml package manifests and the package model used
//! by the rest of the crate.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::ProjectError;

/// Package type discriminator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Application package producing a firmware image
    App,

    /// Library package linked into applications
    Lib,

    /// Board support package
    Bsp,

    /// Unit-test package producing an executable test binary
    UnitTest,
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::App => "app",
            Self::Lib => "lib",
            Self::Bsp => "bsp",
            Self::UnitTest => "unittest",
        };
        f.write_str(s)
    }
}

/// On-disk package manifest (pkg.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// Package declaration
    pub package: PackageDecl,
}

/// The `[package]` section of pkg.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageDecl {
    /// Full package name, e.g. `sys/config`
    pub name: String,

    /// Package type
    #[serde(rename = "type")]
    pub package_type: PackageType,

    /// Package description
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageManifest {
    /// Parse a package manifest from TOML content
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// A package discovered within a project tree
///
/// Packages are read-only once loaded; mutation happens by editing the
/// manifests on disk and reloading the project session.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    package_type: PackageType,
    base_path: PathBuf,
}

impl Package {
    /// Load a package from the directory containing its pkg.toml
    pub fn load(base_path: &Path, manifest_path: &Path) -> Result<Self, ProjectError> {
        let content =
            std::fs::read_to_string(manifest_path).map_err(|e| ProjectError::Io {
                path: manifest_path.to_path_buf(),
                error: e.to_string(),
            })?;

        let manifest =
            PackageManifest::from_toml(&content).map_err(|e| ProjectError::PackageParse {
                path: manifest_path.to_path_buf(),
                error: e.to_string(),
            })?;

        if !is_valid_name(&manifest.package.name) {
            return Err(ProjectError::InvalidPackageName {
                name: manifest.package.name,
                path: manifest_path.to_path_buf(),
            });
        }

        Ok(Self {
            name: manifest.package.name,
            package_type: manifest.package.package_type,
            base_path: base_path.to_path_buf(),
        })
    }

    /// Full package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package type
    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// Directory containing the package's pkg.toml
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Check whether a string is a valid package name
///
/// Names are slash-separated identifier segments, e.g. `sys/config` or
/// `crypto/mbedtls/test`.
pub fn is_valid_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*(/[A-Za-z0-9][A-Za-z0-9_.-]*)*$")
            .expect("Invalid package name pattern")
    });
    re.is_match(name)
}
