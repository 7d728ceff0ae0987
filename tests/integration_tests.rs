//! End-to-end tests over the Java fixture trees in `tests/fixtures`.
//!
//! `app` and `common` form a two-module project: `app` depends on `common`,
//! declares one type in a file named differently and carries one file that
//! does not parse.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use depscope::{
    AnalysisConfig, ClassLocationStore, Container, ContainerConfig, DependencyReport,
    ExclusionFilter, JsonClassLocationStore, MethodSelector, OutputConfig,
};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn roots() -> Vec<PathBuf> {
    vec![fixtures().join("app"), fixtures().join("common")]
}

fn service_file() -> PathBuf {
    fixtures().join("app/com/acme/app/OrderService.java")
}

fn container_with(analysis: AnalysisConfig, output_dir: &Path) -> Container {
    Container::new(ContainerConfig {
        analysis,
        output: OutputConfig::new(output_dir, "analysis"),
    })
    .unwrap()
}

fn container() -> (Container, TempDir) {
    let out = TempDir::new().unwrap();
    let container = container_with(AnalysisConfig::new(roots()), out.path());
    (container, out)
}

fn analyze(container: &Container, class: &str, methods: &[&str]) -> DependencyReport {
    let selectors: Vec<MethodSelector> = methods
        .iter()
        .map(|m| MethodSelector::by_name(class, *m))
        .collect();
    container
        .analyze_use_case()
        .analyze(&selectors, false)
        .unwrap()
        .report
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_checkout_dependencies() {
    let (container, _out) = container();
    let report = analyze(&container, "OrderService", &["checkout"]);

    let order = report.get("com.acme.app.Order").unwrap();
    assert!(order.referenced_as_type);
    assert!(order.methods.contains("total()"));
    assert!(order.methods.contains("getStatus()"));

    let status = report.get("com.acme.app.Status").unwrap();
    assert!(status.enum_constants.contains("CANCELLED"));

    let repository = report.get("com.acme.app.OrderRepository").unwrap();
    assert!(repository.methods.contains("save(Order)"));

    let formatter = report.get("com.acme.app.PriceFormatter").unwrap();
    assert!(formatter.methods.contains("format(Money, Currency)"));

    assert!(report.get("com.acme.common.Money").unwrap().referenced_as_type);
    assert!(report
        .get("com.acme.common.Currency")
        .unwrap()
        .enum_constants
        .contains("EUR"));
    assert!(report
        .get("com.acme.common.Audited")
        .unwrap()
        .annotations
        .contains("Audited"));

    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
}

#[test]
fn test_default_exclusions_hide_platform_types() {
    let (container, _out) = container();
    let report = analyze(&container, "OrderService", &["checkout", "count", "skus"]);

    assert!(report.owners().all(|owner| !owner.starts_with("java.")));
    assert!(report.get("com.acme.app.Order").unwrap().methods.contains("getLines()"));
}

#[test]
fn test_without_exclusions_platform_owners_appear() {
    let out = TempDir::new().unwrap();
    let analysis = AnalysisConfig::new(roots()).with_exclusions(ExclusionFilter::none());
    let container = container_with(analysis, out.path());

    let report = analyze(&container, "OrderService", &["count"]);

    let list = report.get("java.util.List").unwrap();
    assert!(list.methods.contains("size()"));
}

#[test]
fn test_record_accessors_and_implicit_enum_methods() {
    let (container, _out) = container();
    let report = analyze(&container, "OrderService", &["skus"]);

    assert!(report.get("com.acme.app.Line").unwrap().methods.contains("quantity()"));
    let status = report.get("com.acme.app.Status").unwrap();
    assert!(status.methods.contains("values()"));
    assert!(status.methods.contains("valueOf(String)"));
    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
}

#[test]
fn test_switch_labels_count_as_enum_constants() {
    let (container, _out) = container();
    let report = analyze(&container, "OrderService", &["describe"]);

    let status = report.get("com.acme.app.Status").unwrap();
    assert!(status.enum_constants.contains("OPEN"));
    assert!(status.enum_constants.contains("PAID"));
    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
}

#[test]
fn test_merging_methods_is_additive() {
    let (container, _out) = container();
    let checkout = analyze(&container, "OrderService", &["checkout"]);
    let describe = analyze(&container, "OrderService", &["describe"]);
    let both = analyze(&container, "OrderService", &["checkout", "describe"]);

    let status = both.get("com.acme.app.Status").unwrap();
    assert!(status.enum_constants.contains("CANCELLED"));
    assert!(status.enum_constants.contains("OPEN"));
    assert!(both.total_classes() >= checkout.total_classes());
    assert!(both.total_classes() >= describe.total_classes());
}

#[test]
fn test_lenient_mode_keeps_diagnostics() {
    let (container, _out) = container();
    let report = analyze(&container, "OrderService", &["legacy"]);

    assert!(!report.diagnostics().is_empty());
    assert!(report
        .diagnostics()
        .iter()
        .any(|d| d.expression.contains("LegacyClient")));
}

#[test]
fn test_strict_mode_fails_on_unresolved() {
    let out = TempDir::new().unwrap();
    let analysis = AnalysisConfig::new(roots()).with_ignore_unresolved(false);
    let container = container_with(analysis, out.path());

    let err = container
        .analyze_use_case()
        .analyze(&[MethodSelector::by_name("OrderService", "legacy")], false)
        .unwrap_err();
    assert!(err.is_unresolved());
    assert!(err.to_string().contains("LegacyClient"));

    let ok = container
        .analyze_use_case()
        .analyze(&[MethodSelector::by_name("OrderService", "checkout")], false);
    assert!(ok.is_ok());
}

#[test]
fn test_locator_variants() {
    let (container, _out) = container();
    let locator = container.locate_use_case();

    let by_simple = locator
        .locate(&MethodSelector::by_name("OrderService", "checkout"))
        .unwrap()
        .unwrap();
    assert_eq!(by_simple.owner, "com.acme.app.OrderService");
    assert_eq!(by_simple.signature, "checkout(Order)");
    assert_eq!(by_simple.start_line, 16);

    let by_qualified = locator
        .locate(&MethodSelector::by_name("com.acme.app.OrderService", "checkout"))
        .unwrap()
        .unwrap();
    assert_eq!(by_qualified.source_file, by_simple.source_file);

    let by_file = locator
        .locate(&MethodSelector::in_file(service_file(), "describe"))
        .unwrap()
        .unwrap();
    assert_eq!(by_file.method_name, "describe");

    let constructor = locator
        .locate(&MethodSelector::by_name("OrderService", "OrderService"))
        .unwrap()
        .unwrap();
    assert_eq!(constructor.signature, "OrderService(OrderRepository)");

    assert!(locator
        .locate(&MethodSelector::by_name("OrderService", "missing"))
        .unwrap()
        .is_none());
    assert!(locator
        .locate(&MethodSelector::by_name("NoSuchClass", "checkout"))
        .unwrap()
        .is_none());
    assert!(locator
        .locate(&MethodSelector::in_file(fixtures().join("nope/Missing.java"), "run"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_broken_file_is_skipped_when_scanning() {
    let (container, _out) = container();
    let locations = container.class_locations().locations();

    assert!(locations.contains("com.acme.app.OrderService"));
    assert!(locations.contains("com.acme.common.Money"));
    assert!(!locations.contains("com.acme.app.Broken"));
    assert_eq!(
        locations
            .get("com.acme.app.PriceFormatter")
            .unwrap()
            .file_name()
            .unwrap(),
        "Formatting.java"
    );
}

#[test]
fn test_broken_target_file_is_a_parse_error() {
    let (container, _out) = container();
    let err = container
        .locate_use_case()
        .locate(&MethodSelector::in_file(
            fixtures().join("app/com/acme/app/Broken.java"),
            "oops",
        ))
        .unwrap_err();

    assert!(err.is_parse_error());
}

#[test]
fn test_inspect_calls_in_range() {
    let (container, _out) = container();
    let inspection = container
        .inspect_calls_use_case()
        .inspect(&service_file(), 17, 24)
        .unwrap();

    let names: Vec<&str> = inspection
        .method_calls
        .iter()
        .map(|c| c.method_name.as_str())
        .collect();
    assert_eq!(names, vec!["total", "getStatus", "save", "format"]);
    assert!(inspection.method_calls.iter().all(|c| c.resolved));

    let format = &inspection.method_calls[3];
    assert_eq!(format.line, 23);
    assert_eq!(
        format.class_qualified_name.as_deref(),
        Some("com.acme.app.PriceFormatter")
    );
    assert_eq!(format.package_name.as_deref(), Some("com.acme.app"));
    assert_eq!(format.argument_owners, vec!["com.acme.common.Currency".to_string()]);
}

#[test]
fn test_inspect_calls_past_last_call_is_empty() {
    let (container, _out) = container();
    let inspection = container
        .inspect_calls_use_case()
        .inspect(&service_file(), 52, 80)
        .unwrap();

    assert!(inspection.method_calls.is_empty());
}

#[test]
fn test_reachability_from_line_range() {
    let (container, _out) = container();
    let target = container
        .locate_use_case()
        .locate(&MethodSelector::by_range(service_file(), 17, 24))
        .unwrap()
        .unwrap();

    let direct = container
        .reachability_use_case()
        .explore(&target, Some(1))
        .unwrap();
    let mut names: Vec<&str> = direct.qualified_names().collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "com.acme.app.Order",
            "com.acme.app.OrderRepository",
            "com.acme.app.PriceFormatter"
        ]
    );

    let all = container.reachability_use_case().explore(&target, None).unwrap();
    for expected in ["com.acme.common.Money", "com.acme.app.Line", "com.acme.common.Currency"] {
        assert!(all.contains(expected), "{} not reached", expected);
    }
    assert!(!all.contains("com.acme.app.OrderService"));

    let mut seen = std::collections::HashSet::new();
    assert!(all.qualified_names().all(|name| seen.insert(name)));
    assert!(all.qualified_names().all(|name| !name.starts_with("java.")));
}

#[test]
fn test_cache_round_trip() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache/locations.json");
    let analysis = AnalysisConfig::new(roots()).with_cache_file(&cache_file);

    let first = container_with(analysis.clone(), dir.path());
    let built = first.class_locations().rebuild_and_save();

    let stored = JsonClassLocationStore::new(&cache_file).load().unwrap().unwrap();
    assert_eq!(stored, *built);

    let second = container_with(analysis, dir.path());
    assert_eq!(*second.class_locations().locations(), *built);
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("locations.json");
    fs::write(&cache_file, "{ definitely not json").unwrap();

    let cold = container().0.class_locations().locations();

    let analysis = AnalysisConfig::new(roots()).with_cache_file(&cache_file);
    let container = container_with(analysis, dir.path());
    let recovered = container.class_locations().locations();

    assert_eq!(*recovered, *cold);
    let rewritten = JsonClassLocationStore::new(&cache_file).load().unwrap();
    assert_eq!(rewritten.as_ref(), Some(&*cold));
}

#[test]
fn test_export_writes_timestamped_report() {
    let (container, out) = container();
    let outcome = container
        .analyze_use_case()
        .analyze(&[MethodSelector::by_name("OrderService", "checkout")], true)
        .unwrap();

    let path = outcome.export_path.unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(path.starts_with(out.path()));
    assert!(name.starts_with("analysis_OrderService_checkout_"));
    assert!(name.ends_with(".json"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["totalClasses"], outcome.report.total_classes());
    assert_eq!(json["dependencies"]["com.acme.app.Status"]["enums"], 1);
}

#[test]
fn test_nested_type_found_by_simple_name() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "pkg/Outer.java",
        "package pkg;\n\npublic class Outer {\n    static class Inner {\n        void run() {\n        }\n    }\n}\n",
    );
    write(dir.path(), "pkg/Other.java", "package pkg;\npublic class Other { void run() {} }\n");
    let container = container_with(AnalysisConfig::new(vec![dir.path().to_path_buf()]), dir.path());
    let locator = container.locate_use_case();

    let simple = locator
        .locate(&MethodSelector::by_name("Inner", "run"))
        .unwrap()
        .unwrap();
    assert_eq!(simple.owner, "pkg.Outer.Inner");
    assert_eq!(simple.start_line, 5);

    let dotted = locator
        .locate(&MethodSelector::by_name("Outer.Inner", "run"))
        .unwrap()
        .unwrap();
    assert_eq!(dotted.owner, "pkg.Outer.Inner");

    assert!(locator
        .locate(&MethodSelector::by_name("Inner", "stop"))
        .unwrap()
        .is_none());
}

#[test]
fn test_scenario_construction_and_static_field() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pkg/Foo.java", "package pkg;\npublic class Foo {}\n");
    write(
        dir.path(),
        "pkg/Bar.java",
        "package pkg;\npublic class Bar { public static int field = 1; }\n",
    );
    write(
        dir.path(),
        "pkg/Runner.java",
        "package pkg;\n\npublic class Runner {\n    void run() {\n        new Foo();\n        int x = Bar.field;\n    }\n}\n",
    );
    let container = container_with(AnalysisConfig::new(vec![dir.path().to_path_buf()]), dir.path());

    let report = analyze(&container, "Runner", &["run"]);

    let owners: Vec<&str> = report.owners().collect();
    assert_eq!(owners, vec!["pkg.Bar", "pkg.Foo"]);
    assert!(report.get("pkg.Foo").unwrap().referenced_as_type);
    let bar = report.get("pkg.Bar").unwrap();
    assert_eq!(bar.fields.iter().collect::<Vec<_>>(), vec!["field"]);
}

#[test]
fn test_archive_types_resolve_by_receiver() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    write(
        &src,
        "app/Gateway.java",
        r#"package app;

import org.vendor.Client;

public class Gateway {
    private Client client;

    public void send(String body) {
        client.post(body);
    }
}
"#,
    );

    let jar = dir.path().join("vendor.jar");
    {
        let mut zip = ZipWriter::new(File::create(&jar).unwrap());
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file("org/vendor/Client.class", options).unwrap();
        zip.write_all(b"\xca\xfe\xba\xbe").unwrap();
        zip.finish().unwrap();
    }

    let without = container_with(AnalysisConfig::new(vec![src.clone()]), dir.path());
    let report = analyze(&without, "Gateway", &["send"]);
    assert!(report.get("org.vendor.Client").is_none());
    assert!(!report.diagnostics().is_empty());

    let analysis = AnalysisConfig::new(vec![src]).with_archives(vec![jar]);
    let with = container_with(analysis, dir.path());
    let report = analyze(&with, "Gateway", &["send"]);
    let client = report.get("org.vendor.Client").unwrap();
    assert!(client.methods.contains("post(?)"));
    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
}

#[test]
fn test_missing_archive_is_skipped() {
    let out = TempDir::new().unwrap();
    let analysis = AnalysisConfig::new(roots()).with_archives(vec![out.path().join("absent.jar")]);
    let container = container_with(analysis, out.path());

    let report = analyze(&container, "OrderService", &["checkout"]);
    assert!(report.get("com.acme.app.Order").is_some());
}
