//! Target definitions and the on-disk target store
//!
//! A target is a persisted build configuration living at
//! `<project>/targets/<name>/target.toml`. The store resolves targets by
//! name, clones them under new names, and persists them back to disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::defaults::{DEFAULT_BUILD_PROFILE, TARGET_DIR, TARGET_MANIFEST};
use crate::error::TargetError;

/// On-disk target manifest (target.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetManifest {
    /// Target configuration
    pub target: TargetConfig,
}

/// The `[target]` section of target.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    /// Application package built by this target
    #[serde(default)]
    pub app: Option<String>,

    /// Board support package
    #[serde(default)]
    pub bsp: Option<String>,

    /// Build profile
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Probe commands for load/debug
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// External probe software commands
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// Command used to load an image onto the board
    #[serde(default)]
    pub load: Option<String>,

    /// Command used to open a debugger session
    #[serde(default)]
    pub debug: Option<String>,
}

fn default_profile() -> String {
    DEFAULT_BUILD_PROFILE.to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            app: None,
            bsp: None,
            profile: default_profile(),
            probe: ProbeConfig::default(),
        }
    }
}

/// A resolved target
///
/// The name is the target's directory path relative to the project root,
/// e.g. `targets/unittest/sys_config_test`, and is unique within the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    name: String,
    config: TargetConfig,
}

impl Target {
    /// Target name (relative directory path)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target configuration
    pub fn config(&self) -> &TargetConfig {
        &self.config
    }
}

/// Resolves and persists targets under a project root
#[derive(Debug)]
pub struct TargetStore {
    root: PathBuf,
}

impl TargetStore {
    /// Create a store for the project rooted at `root`
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Resolve a target by name
    ///
    /// Accepts either the full relative path (`targets/foo`) or the short
    /// name (`foo`). Returns `Ok(None)` when no target of that name exists.
    pub fn resolve(&self, name: &str) -> Result<Option<Target>, TargetError> {
        for candidate in [name.to_string(), format!("{TARGET_DIR}/{name}")] {
            let manifest_path = self.root.join(&candidate).join(TARGET_MANIFEST);
            if !manifest_path.is_file() {
                continue;
            }

            let content =
                std::fs::read_to_string(&manifest_path).map_err(|e| TargetError::Io {
                    path: manifest_path.clone(),
                    error: e.to_string(),
                })?;
            let manifest: TargetManifest =
                toml::from_str(&content).map_err(|e| TargetError::Parse {
                    path: manifest_path,
                    error: e.to_string(),
                })?;

            return Ok(Some(Target {
                name: candidate,
                config: manifest.target,
            }));
        }

        Ok(None)
    }

    /// Whether a target of exactly this name exists
    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).join(TARGET_MANIFEST).is_file()
    }

    /// Return `candidate` if unused, otherwise the first `candidate_N` that is
    pub fn available_name(&self, candidate: &str) -> String {
        if !self.exists(candidate) {
            return candidate.to_string();
        }

        let mut suffix = 0u32;
        loop {
            let name = format!("{candidate}_{suffix}");
            if !self.exists(&name) {
                return name;
            }
            suffix += 1;
        }
    }

    /// Clone a target's configuration under a new name
    ///
    /// The clone is not persisted until [`TargetStore::save`] is called.
    pub fn clone_target(&self, source: &Target, new_name: &str) -> Target {
        Target {
            name: new_name.to_string(),
            config: source.config.clone(),
        }
    }

    /// Persist a target's configuration to disk
    pub fn save(&self, target: &Target) -> Result<(), TargetError> {
        let dir = self.root.join(target.name());
        std::fs::create_dir_all(&dir).map_err(|e| TargetError::Io {
            path: dir.clone(),
            error: e.to_string(),
        })?;

        let manifest = TargetManifest {
            target: target.config.clone(),
        };
        let content = toml::to_string_pretty(&manifest).map_err(|e| TargetError::Serialize {
            name: target.name().to_string(),
            error: e.to_string(),
        })?;

        let manifest_path = dir.join(TARGET_MANIFEST);
        std::fs::write(&manifest_path, content).map_err(|e| TargetError::Io {
            path: manifest_path,
            error: e.to_string(),
        })
    }
}

/// Map a package name to a safe target-name component
///
/// Path separators and any other characters unsuitable for a target
/// identifier become underscores: `sys/config/test` -> `sys_config_test`.
pub fn test_target_name(package_name: &str) -> String {
    package_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
