//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up package trees and targets.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        project.create_file("project.toml", "[project]\nname = \"test-project\"\n");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file or directory exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Add a package whose directory mirrors its name
    pub fn add_package(&self, name: &str, package_type: &str) {
        self.create_file(
            &format!("{name}/pkg.toml"),
            &format!("[package]\nname = \"{name}\"\ntype = \"{package_type}\"\n"),
        );
    }

    /// Add a target definition
    pub fn add_target(&self, name: &str, content: &str) {
        self.create_file(&format!("{name}/target.toml"), content);
    }

    /// Add the canonical base unit-test target
    pub fn add_base_test_target(&self) {
        self.add_target("targets/unittest", "[target]\nprofile = \"debug\"\n");
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
