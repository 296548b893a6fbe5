//! Debug command implementation
//!
//! Implements `anvil debug` to open a debugger session against a board
//! through the target's configured probe software.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::core::builder::{Builder, TargetBuilder};
use crate::core::project::ProjectSession;
use crate::core::target::TargetStore;

/// Execute the debug command
pub async fn execute(
    project_dir: &Path,
    target_name: &str,
    extra_cmd: Option<&str>,
    attach_only: bool,
) -> Result<()> {
    let session = ProjectSession::load(project_dir)
        .with_context(|| "Failed to load project")?;
    let target = TargetStore::new(project_dir)
        .resolve(target_name)?
        .ok_or_else(|| anyhow!("Invalid target name: {target_name}"))?;

    let mut builder = TargetBuilder::new(&session, &target)?;
    builder
        .debug(extra_cmd, attach_only)
        .with_context(|| format!("Failed to debug target '{target_name}'"))?;

    Ok(())
}
