//! Size command implementation
//!
//! Implements `anvil size` to report the size of a target's build
//! artifacts.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::cli::output;
use crate::core::builder::{Builder, TargetBuilder};
use crate::core::project::ProjectSession;
use crate::core::target::TargetStore;

/// Execute the size command
pub async fn execute(project_dir: &Path, target_name: &str) -> Result<()> {
    let session = ProjectSession::load(project_dir)
        .with_context(|| "Failed to load project")?;
    let target = TargetStore::new(project_dir)
        .resolve(target_name)?
        .ok_or_else(|| anyhow!("Invalid target name: {target_name}"))?;

    let mut builder = TargetBuilder::new(&session, &target)?;
    let report = builder
        .size()
        .with_context(|| format!("Failed to size target '{target_name}'"))?;

    if output::is_json() {
        let entries: Vec<serde_json::Value> = report
            .entries
            .iter()
            .map(|e| serde_json::json!({"name": e.name, "size": e.size}))
            .collect();
        println!(
            "{}",
            serde_json::json!({"entries": entries, "total": report.total})
        );
        return Ok(());
    }

    for entry in &report.entries {
        output::status_message(&format!("{:>10}  {}", entry.size, entry.name));
    }
    output::status_message(&format!("{:>10}  total", report.total));

    Ok(())
}
