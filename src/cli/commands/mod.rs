//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod debug;
pub mod load;
pub mod size;

use anyhow::Result;
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build one or more targets
    Build {
        /// Target names to build
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Delete build artifacts for one or more targets, or `all`
    Clean {
        /// Target names to clean, or `all` for every target
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Execute unit tests for one or more packages, or `all`
    Test {
        /// Package names to test, or `all` for every unit-test package
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Load the built image onto the board
    Load {
        /// Target name
        target: String,

        /// Extra commands to send to the probe software
        #[arg(short = 'j', long = "extra-cmd")]
        extra_cmd: Option<String>,
    },

    /// Open a debugger session to the board
    Debug {
        /// Target name
        target: String,

        /// Extra commands to send to the probe software
        #[arg(short = 'j', long = "extra-cmd")]
        extra_cmd: Option<String>,

        /// Attach to a running session without loading the image
        #[arg(long)]
        attach_only: bool,
    },

    /// Report the size of a target's build artifacts
    Size {
        /// Target name
        target: String,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Build { targets } => build::execute(&current_dir, &targets).await,
            Self::Clean { targets } => clean::execute(&current_dir, &targets).await,
            Self::Test { packages } => test::execute(&current_dir, &packages).await,
            Self::Load { target, extra_cmd } => {
                load::execute(&current_dir, &target, extra_cmd.as_deref()).await
            }
            Self::Debug {
                target,
                extra_cmd,
                attach_only,
            } => debug::execute(&current_dir, &target, extra_cmd.as_deref(), attach_only).await,
            Self::Size { target } => size::execute(&current_dir, &target).await,
        }
    }
}
