//! Clean logic
//!
//! Removing build artifacts: either one target's output directory via its
//! builder, or the entire bin/ root for `clean all`.

use std::path::{Path, PathBuf};

use crate::core::builder::bin_root;
use crate::error::BuildError;

/// Result of a `clean all`
#[derive(Debug)]
pub struct CleanResult {
    /// The directory that was removed, if it existed
    pub removed: Option<PathBuf>,
}

/// Remove the entire build-output root for a project
pub fn clean_all(project_root: &Path) -> Result<CleanResult, BuildError> {
    let root = bin_root(project_root);

    if !root.exists() {
        return Ok(CleanResult { removed: None });
    }

    std::fs::remove_dir_all(&root).map_err(|e| BuildError::Io {
        path: root.clone(),
        error: e.to_string(),
    })?;

    Ok(CleanResult {
        removed: Some(root),
    })
}

/// Check whether a project has any build artifacts
pub fn has_build_artifacts(project_root: &Path) -> bool {
    bin_root(project_root).exists()
}
