//! CLI end-to-end tests that invoke the compiled `labextension` binary.
//!
//! These tests use `env!("CARGO_BIN_EXE_labextension")` to locate the binary
//! and `std::process::Command` to run it with every Jupyter directory
//! redirected into a [`TestSandbox`].

use std::fs;
use std::process::{Command, Output};

use labext_test_utils::{TestPackage, TestSandbox};
use serde_json::{Value, json};

/// Returns the path to the compiled `labextension` binary.
fn labext_bin() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_labextension"))
}

/// Run `labextension` with the given args inside the sandbox.
fn run(sandbox: &TestSandbox, args: &[&str]) -> Output {
    let mut cmd = Command::new(labext_bin());
    cmd.args(args).current_dir(sandbox.root()).env("NO_COLOR", "1");
    for (key, value) in sandbox.env_vars() {
        cmd.env(key, value);
    }
    for key in ["JUPYTER_PATH", "JUPYTER_CONFIG_PATH", "JUPYTER_NO_CONFIG", "RUST_LOG"] {
        cmd.env_remove(key);
    }
    cmd.output().expect("failed to execute labextension binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn assert_success(out: &Output) {
    assert!(
        out.status.success(),
        "command should succeed; stdout:\n{}\nstderr:\n{}",
        stdout(out),
        stderr(out)
    );
}

fn write_package(sandbox: &TestSandbox) {
    TestPackage::new("pkg")
        .file("ext/index.js", "define([], {});")
        .entry("notebook", "ext", "_ext", "_ext/index")
        .write_to(&sandbox.package_dir());
}

// ============================================================================
// 1. install
// ============================================================================

#[test]
fn test_install_file_to_user_location() {
    let sandbox = TestSandbox::new();
    let source = sandbox.write_file("foo.js", "console.log(1);");

    let out = run(&sandbox, &["install", source.to_str().unwrap(), "--user"]);

    assert_success(&out);
    assert_eq!(
        fs::read_to_string(sandbox.user_labextensions().join("foo.js")).unwrap(),
        "console.log(1);"
    );
    assert!(stdout(&out).contains("labextension enable <the entry point> --user"));
}

#[test]
fn test_install_defaults_to_system_location() {
    let sandbox = TestSandbox::new();
    let source = sandbox.write_file("foo.js", "x");

    let out = run(&sandbox, &["install", source.to_str().unwrap()]);

    assert_success(&out);
    assert!(sandbox.system_labextensions().join("foo.js").is_file());
}

#[test]
fn test_install_conflicting_flags_fails() {
    let sandbox = TestSandbox::new();
    let source = sandbox.write_file("foo.js", "x");

    let out = run(
        &sandbox,
        &["install", source.to_str().unwrap(), "--user", "--sys-prefix"],
    );

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("cannot specify more than one"), "stderr: {err}");
    assert!(err.contains("user=true") && err.contains("sys_prefix=true"));
    assert!(!sandbox.user_labextensions().exists());
}

#[test]
fn test_install_py_package_then_enable_py() {
    let sandbox = TestSandbox::new();
    write_package(&sandbox);

    let out = run(&sandbox, &["install", "pkg", "--py", "--user"]);
    assert_success(&out);
    assert!(sandbox.user_labextensions().join("_ext/index.js").is_file());
    assert!(stdout(&out).contains("labextension enable pkg --user --py"));

    let out = run(&sandbox, &["enable", "pkg", "--py", "--user"]);
    assert_success(&out);
    assert_eq!(
        sandbox.load_extension_value(&sandbox.user_nbconfig(), "notebook", "_ext/index"),
        Some(Value::Bool(true))
    );
}

#[test]
fn test_install_py_unknown_package_fails() {
    let sandbox = TestSandbox::new();

    let out = run(&sandbox, &["install", "missing_pkg", "--py"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("missing_pkg"));
}

#[test]
fn test_install_py_without_manifest_is_not_a_labextension() {
    let sandbox = TestSandbox::new();
    TestPackage::new("plain").without_manifest().write_to(&sandbox.package_dir());

    let out = run(&sandbox, &["install", "plain", "--py", "--user"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not a valid labextension"));
}

#[test]
fn test_install_url_is_rejected() {
    let sandbox = TestSandbox::new();

    let out = run(&sandbox, &["install", "https://example.com/ext.zip", "--user"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not supported"));
}

// ============================================================================
// 2. enable / disable
// ============================================================================

#[test]
fn test_enable_disable_round_trip() {
    let sandbox = TestSandbox::new();

    assert_success(&run(&sandbox, &["enable", "my_ext/index", "--section", "tree"]));
    assert_eq!(
        sandbox.read_json(&sandbox.user_nbconfig().join("tree.json")),
        json!({"load_extensions": {"my_ext/index": true}})
    );

    assert_success(&run(&sandbox, &["disable", "my_ext/index", "--section", "tree"]));
    assert_eq!(
        sandbox.read_json(&sandbox.user_nbconfig().join("tree.json")),
        json!({})
    );
}

#[test]
fn test_enable_sys_prefix_scope() {
    let sandbox = TestSandbox::new();

    assert_success(&run(&sandbox, &["enable", "my_ext/index", "--sys-prefix"]));

    assert_eq!(
        sandbox.load_extension_value(&sandbox.env_nbconfig(), "notebook", "my_ext/index"),
        Some(Value::Bool(true))
    );
}

#[test]
fn test_enable_conflicting_scope_fails() {
    let sandbox = TestSandbox::new();

    let out = run(&sandbox, &["enable", "my_ext/index", "--user", "--system"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("cannot specify more than one"));
}

// ============================================================================
// 3. uninstall
// ============================================================================

#[test]
fn test_uninstall_reports_nothing_found() {
    let sandbox = TestSandbox::new();

    let out = run(&sandbox, &["uninstall", "ghost"]);

    assert_success(&out);
    assert!(stdout(&out).contains("No installed extension 'ghost' found."));
}

#[test]
fn test_uninstall_with_require_disables_it() {
    let sandbox = TestSandbox::new();
    let source = sandbox.write_file("src/my_ext/index.js", "x");
    let source_dir = source.parent().unwrap().to_str().unwrap().to_string();
    assert_success(&run(&sandbox, &["install", &source_dir, "--user"]));
    assert_success(&run(&sandbox, &["enable", "my_ext/index"]));

    let out = run(&sandbox, &["uninstall", "my_ext", "--require", "my_ext/index"]);

    assert_success(&out);
    assert!(!sandbox.user_labextensions().join("my_ext").exists());
    assert_eq!(
        sandbox.load_extension_value(&sandbox.user_nbconfig(), "notebook", "my_ext/index"),
        None
    );
}

#[test]
fn test_uninstall_py_from_explicit_location() {
    let sandbox = TestSandbox::new();
    write_package(&sandbox);
    assert_success(&run(&sandbox, &["install", "pkg", "--py", "--sys-prefix"]));
    assert!(sandbox.env_labextensions().join("_ext").exists());

    assert_success(&run(&sandbox, &["uninstall", "pkg", "--py", "--sys-prefix"]));

    assert!(!sandbox.env_labextensions().join("_ext").exists());
}

// ============================================================================
// 4. list
// ============================================================================

#[test]
fn test_list_shows_enabled_and_warnings() {
    let sandbox = TestSandbox::new();
    assert_success(&run(&sandbox, &["enable", "ghost/index"]));

    let out = run(&sandbox, &["list"]);

    assert_success(&out);
    let text = stdout(&out);
    assert!(text.contains("Known labextensions:"));
    assert!(text.contains("config dir:"));
    assert!(text.contains("ghost/index"));
    assert!(text.contains("enabled"));
    assert!(text.contains("ghost/index.js"));
}

#[test]
fn test_list_json_output() {
    let sandbox = TestSandbox::new();
    assert_success(&run(&sandbox, &["enable", "a/index", "--section", "edit"]));

    let out = run(&sandbox, &["list", "--json"]);

    assert_success(&out);
    let value: Value = serde_json::from_str(&stdout(&out)).unwrap();
    let section = &value["config_dirs"][0]["sections"][0];
    assert_eq!(section["section"], "edit");
    assert_eq!(section["extensions"][0]["require"], "a/index");

    let search_path: Vec<&str> = value["labextensions_search_path"]
        .as_array()
        .unwrap()
        .iter()
        .map(|dir| dir.as_str().unwrap())
        .collect();
    let user = sandbox.user_labextensions().display().to_string();
    let env = sandbox.env_labextensions().display().to_string();
    let user_at = search_path.iter().position(|dir| *dir == user).unwrap();
    let env_at = search_path.iter().position(|dir| *dir == env).unwrap();
    assert!(user_at < env_at, "user dir listed after env dir: {search_path:?}");
}
