//! Default configuration values and well-known names

/// Project manifest file name
pub const PROJECT_MANIFEST: &str = "project.toml";

/// Package manifest file name
pub const PACKAGE_MANIFEST: &str = "pkg.toml";

/// Target definition file name
pub const TARGET_MANIFEST: &str = "target.toml";

/// Directory under the project root where targets live
pub const TARGET_DIR: &str = "targets";

/// Name of the canonical base unit-test target (under [`TARGET_DIR`])
pub const TEST_TARGET_NAME: &str = "unittest";

/// Root directory for build output
pub const BIN_ROOT: &str = "bin";

/// Keyword selecting every target/package
pub const ALL_KEYWORD: &str = "all";

/// Default compiler driver when the project does not configure one
pub const DEFAULT_CC: &str = "cc";

/// Default build profile recorded in new targets
pub const DEFAULT_BUILD_PROFILE: &str = "debug";
