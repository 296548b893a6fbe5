//! Clean command implementation
//!
//! Implements `anvil clean` to delete build artifacts for targets, or the
//! whole build-output root with the `all` selector.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::cli::output;
use crate::config::defaults::ALL_KEYWORD;
use crate::core::builder::{bin_root, Builder, TargetBuilder};
use crate::core::clean::clean_all;
use crate::core::project::ProjectSession;
use crate::core::target::{Target, TargetStore};

/// Execute the clean command
pub async fn execute(project_dir: &Path, targets: &[String]) -> Result<()> {
    let clean_everything = targets.iter().any(|name| name == ALL_KEYWORD);

    // Resolve explicit names up front; an invalid name aborts the run.
    let store = TargetStore::new(project_dir);
    let mut resolved: Vec<Target> = Vec::new();
    for name in targets.iter().filter(|name| *name != ALL_KEYWORD) {
        let target = store
            .resolve(name)?
            .ok_or_else(|| anyhow!("Invalid target name: {name}"))?;
        resolved.push(target);
    }

    if clean_everything {
        output::verbose_message(&format!(
            "Cleaning directory {}",
            bin_root(project_dir).display()
        ));
        clean_all(project_dir)?;
        return Ok(());
    }

    let session = ProjectSession::load(project_dir)
        .with_context(|| "Failed to load project")?;
    for target in &resolved {
        let mut builder = TargetBuilder::new(&session, target)?;
        builder
            .clean()
            .with_context(|| format!("Failed to clean target '{}'", target.name()))?;
    }

    Ok(())
}
