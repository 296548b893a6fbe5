//! Test-target resolution and the batch test orchestrator
//!
//! Three pieces live here: the testable-package classifier (which packages
//! participate in testing at all), the test-target mapper (which unit-test
//! packages run on behalf of a given package), and the orchestrator that
//! synthesizes an isolated target per test package and drives the batch
//! pass/fail loop.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::cli::output;
use crate::config::defaults::{ALL_KEYWORD, TARGET_DIR, TEST_TARGET_NAME};
use crate::core::builder::BuilderFactory;
use crate::core::package::{Package, PackageType};
use crate::core::project::{Project, ProjectSession};
use crate::core::target::{test_target_name, TargetStore};
use crate::error::TestError;

/// Which packages a test invocation selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every unit-test package in the project
    ///
    /// Any explicitly named packages are still resolved first, so a typo
    /// alongside `all` fails the run before anything executes.
    All(Vec<String>),

    /// The unit tests belonging to the named packages
    Names(Vec<String>),
}

impl Selection {
    /// Decide the selection once from raw CLI arguments
    pub fn from_args(args: &[String]) -> Self {
        let names: Vec<String> = args
            .iter()
            .filter(|a| *a != ALL_KEYWORD)
            .cloned()
            .collect();

        if names.len() == args.len() {
            Self::Names(names)
        } else {
            Self::All(names)
        }
    }
}

/// The set of packages that participate in testing
///
/// Contains every unit-test package plus, for each, its nearest non-test
/// ancestor package by path. Memoized on the session; a fresh session (after
/// a reset) recomputes it.
pub fn testable_packages(session: &ProjectSession) -> &BTreeSet<String> {
    session
        .testable
        .get_or_init(|| compute_testable(session.project()))
}

fn compute_testable(project: &Project) -> BTreeSet<String> {
    // Path => package mapping for ancestor lookup, covering every type.
    let by_path: HashMap<&Path, &Package> =
        project.packages().map(|p| (p.base_path(), p)).collect();

    let mut result: BTreeSet<String> = project
        .packages()
        .filter(|p| p.package_type() == PackageType::UnitTest)
        .map(|p| p.name().to_string())
        .collect();

    // Add the nearest non-test ancestor of each unit-test package. The walk
    // stops at the project root and at the first qualifying package.
    let seeds: Vec<&Package> = project
        .packages()
        .filter(|p| p.package_type() == PackageType::UnitTest)
        .collect();
    for seed in seeds {
        let mut cursor = seed.base_path().parent();
        while let Some(dir) = cursor {
            if dir == project.base_path() || !dir.starts_with(project.base_path()) {
                break;
            }
            if let Some(owner) = by_path.get(dir) {
                if owner.package_type() != PackageType::UnitTest {
                    result.insert(owner.name().to_string());
                    break;
                }
            }
            cursor = dir.parent();
        }
    }

    result
}

/// The unit-test packages that run on behalf of `pack`
///
/// A unit-test package tests only itself. Any other package maps to its
/// direct unit-test children (packages whose parent directory is the
/// package's base path). Results are ordered by name; empty means the
/// package has no tests.
pub fn unit_tests_for<'a>(session: &'a ProjectSession, pack: &'a Package) -> Vec<&'a Package> {
    if pack.package_type() == PackageType::UnitTest {
        return vec![pack];
    }

    testable_packages(session)
        .iter()
        .filter_map(|name| session.package(name))
        .filter(|p| {
            p.package_type() == PackageType::UnitTest
                && p.base_path().parent() == Some(pack.base_path())
        })
        .collect()
}

/// Outcome of a batch test run
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TestReport {
    /// Packages whose tests passed, in invocation order
    pub passed: Vec<String>,
    /// Packages whose tests failed, in invocation order
    pub failed: Vec<String>,
}

/// Batch driver for `anvil test`
///
/// Each test package gets its own target, cloned from the base unit-test
/// target under a deterministic name. Generated per-target configuration is
/// keyed by target identity; sharing one target across sequential tests
/// would let one test's generated headers leak into the next, or leave
/// stale headers behind timestamps too coarse to notice.
pub struct TestOrchestrator<'a> {
    root: &'a Path,
    factory: &'a dyn BuilderFactory,
}

impl<'a> TestOrchestrator<'a> {
    /// Create an orchestrator for the project rooted at `root`
    pub fn new(root: &'a Path, factory: &'a dyn BuilderFactory) -> Self {
        Self { root, factory }
    }

    /// Run the selected tests
    ///
    /// Fails fast on resolution errors before anything executes. A single
    /// test's build or run failure is recorded and the batch continues; the
    /// invocation fails afterwards if anything failed.
    pub fn run(&self, selection: &Selection) -> Result<TestReport, TestError> {
        let pack_names = {
            let session = ProjectSession::load(self.root)?;
            resolve_selection(&session, selection)?
        };

        let mut report = TestReport::default();
        for pack_name in &pack_names {
            // Reset the project state so each test starts from a clean
            // slate; package references from before this point are stale.
            let session = ProjectSession::load(self.root)?;
            let store = TargetStore::new(self.root);

            let base = store
                .resolve(TEST_TARGET_NAME)?
                .ok_or_else(|| TestError::BaseTargetMissing {
                    name: TEST_TARGET_NAME.to_string(),
                })?;

            let derived = format!(
                "{TARGET_DIR}/{TEST_TARGET_NAME}/{}",
                test_target_name(pack_name)
            );
            let target = match store.resolve(&derived)? {
                Some(existing) => existing,
                None => {
                    let name = store.available_name(&derived);
                    let clone = store.clone_target(&base, &name);
                    store.save(&clone)?;
                    clone
                }
            };

            let mut builder = self.factory.builder_for(&session, &target)?;

            output::status_message(&format!("Testing package {pack_name}"));

            if let Err(e) = builder.build() {
                output::error_line(&e.to_string());
                report.failed.push(pack_name.clone());
                continue;
            }

            // The package under test must be resolved again now that the
            // project has been reloaded.
            let pack = session.resolve_package(pack_name)?;

            match builder.test(pack) {
                Ok(()) => report.passed.push(pack_name.clone()),
                Err(e) => {
                    output::error_line(&e.to_string());
                    report.failed.push(pack_name.clone());
                }
            }
        }

        if report.failed.is_empty() {
            Ok(report)
        } else {
            Err(TestError::Failures {
                passed: report.passed,
                failed: report.failed,
            })
        }
    }
}

/// Expand a selection into the ordered list of unit-test package names
///
/// Explicit names resolve fail-fast through the mapper; `all` supersedes
/// them with every unit-test package, sorted by full name.
fn resolve_selection(
    session: &ProjectSession,
    selection: &Selection,
) -> Result<Vec<String>, TestError> {
    let (names, select_all) = match selection {
        Selection::All(names) => (names, true),
        Selection::Names(names) => (names, false),
    };

    let mut packs: Vec<String> = Vec::new();
    for name in names {
        let pack = session.resolve_package(name)?;
        let tests = unit_tests_for(session, pack);
        if tests.is_empty() {
            return Err(TestError::NoUnitTests {
                name: pack.name().to_string(),
            });
        }
        packs.extend(tests.iter().map(|p| p.name().to_string()));
    }

    if select_all {
        packs = session
            .packages_of_type(Some(PackageType::UnitTest))
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        packs.sort();
    }

    if packs.is_empty() {
        return Err(TestError::NoTestablePackages);
    }

    Ok(packs)
}
