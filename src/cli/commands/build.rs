//! Build command implementation
//!
//! Implements `anvil build` to build one or more targets sequentially.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::cli::output;
use crate::core::builder::{Builder, TargetBuilder};
use crate::core::project::ProjectSession;
use crate::core::target::TargetStore;

/// Execute the build command
pub async fn execute(project_dir: &Path, targets: &[String]) -> Result<()> {
    // Verify that all target names are valid before building anything.
    let store = TargetStore::new(project_dir);
    for name in targets {
        store
            .resolve(name)?
            .ok_or_else(|| anyhow!("Invalid target name: {name}"))?;
    }

    for name in targets {
        // Reset the project state for the next build. The target has to be
        // resolved a second time against the fresh session.
        let session = ProjectSession::load(project_dir)
            .with_context(|| "Failed to load project")?;
        let target = store
            .resolve(name)?
            .ok_or_else(|| anyhow!("Failed to resolve target: {name}"))?;

        output::status_message(&format!("Building target {}", target.name()));

        let mut builder = TargetBuilder::new(&session, &target)?;
        builder
            .build()
            .with_context(|| format!("Failed to build target '{name}'"))?;

        output::status_message(&format!(
            "{} Target successfully built: {name}",
            output::status::SUCCESS
        ));
    }

    Ok(())
}
