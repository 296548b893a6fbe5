//! Core business logic module
//!
//! This module contains all business logic for anvil.
//!
//! # Submodules
//!
//! - [`package`] - Package model and pkg.toml parsing
//! - [`project`] - Project session, package registry, and reset discipline
//! - [`target`] - Target definitions and the on-disk target store
//! - [`builder`] - Builder seam and the concrete toolchain builder
//! - [`testing`] - Testable-package classification and the test orchestrator
//! - [`clean`] - Build artifact removal

pub mod builder;
pub mod clean;
pub mod package;
pub mod project;
pub mod target;
pub mod testing;
