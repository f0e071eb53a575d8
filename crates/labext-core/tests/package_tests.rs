//! Package discovery and whole-package workflows

use labext_core::{
    ConfigScope, Error, ExtensionMetadataEntry, ExtensionProvider, InstallOptions, JupyterPaths,
    ManifestProvider, ProviderRegistry, ScopeFlags, StaticProvider, Warning, check, develop,
    develop_entries, set_package_state, uninstall_package, validate_metadata_entry,
};
use labext_test_utils::{TestPackage, TestSandbox};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn setup() -> (TestSandbox, JupyterPaths, ProviderRegistry) {
    let sandbox = TestSandbox::new();
    let paths = JupyterPaths::sandboxed(sandbox.root());
    let registry = ProviderRegistry::with_search_path(vec![sandbox.package_dir()]);
    (sandbox, paths, registry)
}

fn sample_package(sandbox: &TestSandbox) {
    TestPackage::new("my_pkg")
        .file("_ext/index.js", "define([], {});")
        .entry("notebook", "_ext", "ext", "ext/index")
        .write_to(&sandbox.package_dir());
}

#[test]
fn develop_then_enable_whole_package() {
    let (sandbox, paths, registry) = setup();
    sample_package(&sandbox);

    let staged = develop(
        "my_pkg",
        &ScopeFlags::user(),
        &InstallOptions::default(),
        &paths,
        &registry,
    )
    .unwrap();
    assert_eq!(staged, vec![sandbox.user_labextensions().join("ext")]);
    assert!(check(["ext/index.js"], &ScopeFlags::user(), &paths).unwrap());

    let results = set_package_state(true, "my_pkg", ConfigScope::User, &paths, &registry).unwrap();
    assert_eq!(results, vec![true]);
    assert_eq!(
        sandbox.load_extension_value(&sandbox.user_nbconfig(), "notebook", "ext/index"),
        Some(Value::Bool(true))
    );

    let results = set_package_state(false, "my_pkg", ConfigScope::User, &paths, &registry).unwrap();
    assert_eq!(results, vec![true]);
    assert_eq!(
        sandbox.load_extension_value(&sandbox.user_nbconfig(), "notebook", "ext/index"),
        None
    );
}

#[test]
fn uninstall_package_removes_assets_and_config() {
    let (sandbox, paths, registry) = setup();
    sample_package(&sandbox);
    develop("my_pkg", &ScopeFlags::user(), &InstallOptions::default(), &paths, &registry).unwrap();
    set_package_state(true, "my_pkg", ConfigScope::User, &paths, &registry).unwrap();

    uninstall_package("my_pkg", &ScopeFlags::user(), &paths, &registry).unwrap();

    assert!(!sandbox.user_labextensions().join("ext").exists());
    assert_eq!(
        sandbox.load_extension_value(&sandbox.user_nbconfig(), "notebook", "ext/index"),
        None
    );
}

#[test]
fn dotted_package_names_map_to_nested_directories() {
    let (sandbox, _paths, registry) = setup();
    TestPackage::new("org.widgets")
        .file("static/index.js", "x")
        .entry("tree", "static", "widgets", "widgets/index")
        .write_to(&sandbox.package_dir());

    let (provider, entries) = registry.resolve_metadata("org.widgets").unwrap();

    assert_eq!(provider.root(), sandbox.package_dir().join("org").join("widgets"));
    assert_eq!(
        entries,
        vec![ExtensionMetadataEntry::new("tree", "static", "widgets", "widgets/index")]
    );
}

#[test]
fn explicit_package_path_is_accepted() {
    let (sandbox, _paths, _registry) = setup();
    let root = TestPackage::new("local")
        .file("static/index.js", "x")
        .entry("notebook", "static", "local", "local/index")
        .write_to(&sandbox.root().join("checkout"));

    let registry = ProviderRegistry::new();
    let (provider, entries) = registry.resolve_metadata(root.to_str().unwrap()).unwrap();

    assert_eq!(provider.name(), "local");
    assert_eq!(entries.len(), 1);
}

#[test]
fn package_without_manifest_is_missing_entry_point() {
    let (sandbox, _paths, registry) = setup();
    TestPackage::new("plain").without_manifest().write_to(&sandbox.package_dir());

    let err = registry.resolve_metadata("plain").unwrap_err();

    assert!(matches!(err, Error::MissingEntryPoint { .. }));
    assert!(err.to_string().contains("not a valid labextension"));
}

#[test]
fn manifest_without_entries_is_missing_entry_point() {
    let (sandbox, _paths, registry) = setup();
    TestPackage::new("empty").write_to(&sandbox.package_dir());

    let err = registry.resolve_metadata("empty").unwrap_err();

    assert!(matches!(err, Error::MissingEntryPoint { .. }));
}

#[test]
fn malformed_manifest_is_a_parse_error() {
    let (sandbox, _paths, registry) = setup();
    sandbox.write_file("packages/broken/labextension.toml", "[[labextension]\nsrc = ");

    let err = registry.resolve_metadata("broken").unwrap_err();

    assert!(matches!(err, Error::ManifestParse { .. }));
}

#[test]
fn unknown_package_is_not_found() {
    let (_sandbox, _paths, registry) = setup();
    let err = registry.resolve_metadata("nope").unwrap_err();
    assert!(matches!(err, Error::PackageNotFound { .. }));
}

#[test]
fn registered_provider_wins_over_search_path() {
    let (sandbox, paths, mut registry) = setup();
    sample_package(&sandbox);
    let assets = sandbox.root().join("static_assets");
    sandbox.write_file("static_assets/bundle/index.js", "x");
    registry.register(StaticProvider::new(
        "my_pkg",
        &assets,
        vec![ExtensionMetadataEntry::new("edit", "bundle", "bundle", "bundle/index")],
    ));

    let staged =
        develop("my_pkg", &ScopeFlags::user(), &InstallOptions::default(), &paths, &registry)
            .unwrap();

    assert_eq!(staged, vec![sandbox.user_labextensions().join("bundle")]);
    assert!(!sandbox.user_labextensions().join("ext").exists());
}

#[test]
fn package_state_skips_entries_without_require() {
    let (sandbox, paths, registry) = setup();
    TestPackage::new("partial")
        .file("a/index.js", "x")
        .bare_entry("a", "a")
        .write_to(&sandbox.package_dir());

    let results = set_package_state(true, "partial", ConfigScope::User, &paths, &registry).unwrap();

    assert!(results.is_empty());
}

#[test]
fn validation_flags_unknown_section_and_missing_asset() {
    let (sandbox, paths, _registry) = setup();
    let root = TestPackage::new("odd")
        .file("static/main.js", "x")
        .entry("lab", "static", "odd", "odd/index")
        .write_to(&sandbox.package_dir());
    let provider = ManifestProvider::new("odd", &root);
    let registry = {
        let mut registry = ProviderRegistry::new();
        registry.register(provider);
        registry
    };

    let staged = develop_entries(
        "odd",
        &ScopeFlags::user(),
        &InstallOptions::default(),
        &paths,
        &registry,
    )
    .unwrap();
    let (entry, dest) = &staged[0];
    let warnings = validate_metadata_entry(entry, dest);

    assert_eq!(
        warnings,
        vec![
            Warning::UnknownSection {
                section: Some("lab".to_string())
            },
            Warning::MissingAsset {
                require: "odd/index".to_string(),
                path: sandbox.user_labextensions().join("odd/index.js"),
            },
        ]
    );
}

#[test]
fn validation_passes_for_well_formed_entry() {
    let (sandbox, paths, registry) = setup();
    sample_package(&sandbox);

    let staged = develop_entries(
        "my_pkg",
        &ScopeFlags::user(),
        &InstallOptions::default(),
        &paths,
        &registry,
    )
    .unwrap();

    for (entry, dest) in &staged {
        assert!(validate_metadata_entry(entry, dest).is_empty());
    }
}

#[test]
fn develop_stages_dest_mirroring_src() {
    let (sandbox, paths, registry) = setup();
    TestPackage::new("pkg")
        .file("ext/index.js", "define([], {});")
        .file("ext/lib/helper.js", "// helper")
        .entry("notebook", "ext", "_ext", "_ext/index")
        .write_to(&sandbox.package_dir());

    develop("pkg", &ScopeFlags::user(), &InstallOptions::default(), &paths, &registry).unwrap();
    set_package_state(true, "pkg", ConfigScope::User, &paths, &registry).unwrap();

    let staged = sandbox.user_labextensions().join("_ext");
    assert!(staged.join("index.js").is_file());
    assert!(staged.join("lib/helper.js").is_file());
    assert_eq!(
        sandbox.load_extension_value(&sandbox.user_nbconfig(), "notebook", "_ext/index"),
        Some(Value::Bool(true))
    );
}
