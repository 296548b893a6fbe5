//! Integration tests for the test orchestrator
//!
//! These tests drive the orchestrator against real on-disk projects with a
//! scripted builder standing in for the toolchain.

mod common;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use anvil::core::builder::{Builder, BuilderFactory, SizeReport};
use anvil::core::package::Package;
use anvil::core::project::ProjectSession;
use anvil::core::target::Target;
use anvil::core::testing::{Selection, TestOrchestrator};
use anvil::error::{BuildError, TestError};
use common::TestProject;

/// Builder factory with scripted failures and an event log
struct ScriptedFactory {
    fail_tests: HashSet<String>,
    fail_builds: HashSet<String>,
    log: Rc<RefCell<Vec<String>>>,
}

impl ScriptedFactory {
    fn new() -> Self {
        Self {
            fail_tests: HashSet::new(),
            fail_builds: HashSet::new(),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn failing_tests(packages: &[&str]) -> Self {
        let mut factory = Self::new();
        factory.fail_tests = packages.iter().map(ToString::to_string).collect();
        factory
    }

    fn events(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn events_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl BuilderFactory for ScriptedFactory {
    fn builder_for(
        &self,
        _session: &ProjectSession,
        target: &Target,
    ) -> Result<Box<dyn Builder>, BuildError> {
        self.log
            .borrow_mut()
            .push(format!("builder_for {}", target.name()));
        Ok(Box::new(ScriptedBuilder {
            target_name: target.name().to_string(),
            fail_tests: self.fail_tests.clone(),
            fail_builds: self.fail_builds.clone(),
            log: Rc::clone(&self.log),
        }))
    }
}

struct ScriptedBuilder {
    target_name: String,
    fail_tests: HashSet<String>,
    fail_builds: HashSet<String>,
    log: Rc<RefCell<Vec<String>>>,
}

impl Builder for ScriptedBuilder {
    fn build(&mut self) -> Result<(), BuildError> {
        self.log.borrow_mut().push(format!("build {}", self.target_name));
        if self.fail_builds.contains(&self.target_name) {
            return Err(BuildError::CommandFailed {
                command: "cc".to_string(),
                status: "exit status: 1".to_string(),
                output: "scripted build failure".to_string(),
            });
        }
        Ok(())
    }

    fn clean(&mut self) -> Result<(), BuildError> {
        Ok(())
    }

    fn load(&mut self, _extra_cmd: Option<&str>) -> Result<(), BuildError> {
        Ok(())
    }

    fn debug(&mut self, _extra_cmd: Option<&str>, _attach_only: bool) -> Result<(), BuildError> {
        Ok(())
    }

    fn size(&mut self) -> Result<SizeReport, BuildError> {
        Ok(SizeReport::default())
    }

    fn test(&mut self, pack: &Package) -> Result<(), BuildError> {
        self.log.borrow_mut().push(format!("test {}", pack.name()));
        if self.fail_tests.contains(pack.name()) {
            return Err(BuildError::TestFailed {
                package: pack.name().to_string(),
                output: "scripted test failure".to_string(),
            });
        }
        Ok(())
    }
}

fn project_with_unit_tests(names: &[&str]) -> TestProject {
    let project = TestProject::new();
    project.add_base_test_target();
    for name in names {
        project.add_package(name, "unittest");
    }
    project
}

#[test]
fn test_all_packages_pass() {
    let project = project_with_unit_tests(&["pkg/a", "pkg/b"]);
    let factory = ScriptedFactory::new();

    let report = TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::All(vec![]))
        .expect("run should succeed");

    assert_eq!(report.passed, vec!["pkg/a", "pkg/b"]);
    assert!(report.failed.is_empty());
}

#[test]
fn test_partial_failure_preserves_order_and_fails_run() {
    let project = project_with_unit_tests(&["pkg/a", "pkg/b", "pkg/c"]);
    let factory = ScriptedFactory::failing_tests(&["pkg/b"]);

    let result = TestOrchestrator::new(&project.path(), &factory).run(&Selection::All(vec![]));

    match result {
        Err(TestError::Failures { passed, failed }) => {
            assert_eq!(passed, vec!["pkg/a", "pkg/c"]);
            assert_eq!(failed, vec!["pkg/b"]);
        }
        other => panic!("Expected Failures, got {other:?}"),
    }

    // The failing package must not stop the packages after it.
    assert_eq!(
        factory.events_with_prefix("test "),
        vec!["test pkg/a", "test pkg/b", "test pkg/c"]
    );
}

#[test]
fn test_build_failure_skips_execution_and_continues() {
    let project = project_with_unit_tests(&["pkg/a", "pkg/b"]);
    let mut factory = ScriptedFactory::new();
    factory.fail_builds.insert("targets/unittest/pkg_a".to_string());

    let result = TestOrchestrator::new(&project.path(), &factory).run(&Selection::All(vec![]));

    match result {
        Err(TestError::Failures { passed, failed }) => {
            assert_eq!(passed, vec!["pkg/b"]);
            assert_eq!(failed, vec!["pkg/a"]);
        }
        other => panic!("Expected Failures, got {other:?}"),
    }

    // pkg/a never reached test execution.
    assert_eq!(factory.events_with_prefix("test "), vec!["test pkg/b"]);
}

#[test]
fn test_all_selector_runs_in_sorted_order() {
    let project = project_with_unit_tests(&["pkg/z", "pkg/a", "pkg/m"]);
    let factory = ScriptedFactory::new();

    let report = TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::All(vec![]))
        .unwrap();

    assert_eq!(report.passed, vec!["pkg/a", "pkg/m", "pkg/z"]);
}

#[test]
fn test_named_package_expands_to_direct_children() {
    let project = TestProject::new();
    project.add_base_test_target();
    project.add_package("sys/config", "lib");
    project.add_package("sys/config/test-a", "unittest");
    project.add_package("sys/config/test-b", "unittest");
    project.add_package("sys/config/nested", "lib");
    project.add_package("sys/config/nested/test", "unittest");
    let factory = ScriptedFactory::new();

    let report = TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::Names(vec!["sys/config".to_string()]))
        .unwrap();

    assert_eq!(report.passed, vec!["sys/config/test-a", "sys/config/test-b"]);
}

#[test]
fn test_target_synthesis_is_idempotent() {
    let project = project_with_unit_tests(&["pkg/a"]);
    let factory = ScriptedFactory::new();
    let root = project.path();

    TestOrchestrator::new(&root, &factory)
        .run(&Selection::All(vec![]))
        .unwrap();
    assert!(project.file_exists("targets/unittest/pkg_a/target.toml"));

    // A second run must reuse the derived target, not clone a variant.
    TestOrchestrator::new(&root, &factory)
        .run(&Selection::All(vec![]))
        .unwrap();

    let entries: Vec<_> = std::fs::read_dir(root.join("targets/unittest"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_each_package_gets_its_own_target() {
    let project = project_with_unit_tests(&["pkg/a", "pkg/b"]);
    let factory = ScriptedFactory::new();

    TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::All(vec![]))
        .unwrap();

    assert!(project.file_exists("targets/unittest/pkg_a/target.toml"));
    assert!(project.file_exists("targets/unittest/pkg_b/target.toml"));
    assert_eq!(
        factory.events_with_prefix("builder_for"),
        vec![
            "builder_for targets/unittest/pkg_a",
            "builder_for targets/unittest/pkg_b"
        ]
    );
}

#[test]
fn test_missing_base_target_is_fatal() {
    let project = TestProject::new();
    project.add_package("pkg/a", "unittest");
    let factory = ScriptedFactory::new();

    let result = TestOrchestrator::new(&project.path(), &factory).run(&Selection::All(vec![]));

    assert!(matches!(result, Err(TestError::BaseTargetMissing { .. })));
    assert!(factory.events().is_empty());
}

#[test]
fn test_package_without_tests_rejected_before_running() {
    let project = TestProject::new();
    project.add_base_test_target();
    project.add_package("sys/log", "lib");
    project.add_package("pkg/a", "unittest");
    let factory = ScriptedFactory::new();

    let result = TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::Names(vec!["sys/log".to_string()]));

    assert!(matches!(result, Err(TestError::NoUnitTests { .. })));
    assert!(factory.events().is_empty());
}

#[test]
fn test_unknown_package_rejected_before_running() {
    let project = project_with_unit_tests(&["pkg/a"]);
    let factory = ScriptedFactory::new();

    let result = TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::Names(vec!["no/such".to_string()]));

    assert!(matches!(result, Err(TestError::Project(_))));
    assert!(factory.events().is_empty());
}

#[test]
fn test_project_with_no_unit_tests_rejected() {
    let project = TestProject::new();
    project.add_base_test_target();
    project.add_package("sys/log", "lib");
    let factory = ScriptedFactory::new();

    let result = TestOrchestrator::new(&project.path(), &factory).run(&Selection::All(vec![]));

    assert!(matches!(result, Err(TestError::NoTestablePackages)));
}

#[test]
fn test_packages_resolved_after_each_reset() {
    let project = project_with_unit_tests(&["pkg/a", "pkg/b"]);
    let factory = ScriptedFactory::new();

    TestOrchestrator::new(&project.path(), &factory)
        .run(&Selection::All(vec![]))
        .unwrap();

    // One fresh builder per package, each handed a package re-resolved from
    // the post-reset session.
    assert_eq!(factory.events_with_prefix("builder_for").len(), 2);
    assert_eq!(
        factory.events_with_prefix("test "),
        vec!["test pkg/a", "test pkg/b"]
    );
}
