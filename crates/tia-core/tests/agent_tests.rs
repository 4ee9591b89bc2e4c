use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use tia_codegen::{TraceGenerator, TraceGeneratorFactory};
use tia_core::{Agent, AttachReport, PluginId};
use tia_runtime::{DescriptorRewriter, HookChain, LoaderScope, PluginError, TypedFactory};
use tia_test_utils::{fixtures, tables, LogCapture, RecordingGenerator};
use tracing::level_filters::LevelFilter;

fn attach(agent: &Agent, args: &str) -> (AttachReport, HookChain) {
    let mut host = HookChain::new();
    let report = agent.attach(Some(args), DescriptorRewriter, &mut host);
    (report, host)
}

fn package_config(generator: Value) -> Value {
    json!({
        "filter": { "type": "package", "version": "1.0", "config": ["acme"] },
        "generator": generator,
        "logging": "FINE"
    })
}

fn dir_arg(dir: &Path) -> String {
    format!("  {}  ", dir.display())
}

#[test]
fn test_attach_from_directory_installs_injector() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = fixtures::write_config(
        dir.path(),
        &package_config(json!({ "type": "println", "version": "1.0", "config": "err" })),
    );
    let logs = LogCapture::new();
    let agent = Agent::new().with_dispatch(logs.dispatch());

    let (report, host) = attach(&agent, &dir_arg(dir.path()));
    assert!(report.installed);
    assert_eq!(report.config_file, Some(config_file));
    assert_eq!(report.logging.level(), LevelFilter::DEBUG);
    assert_eq!(report.filter, Some(PluginId::new("package", "1.0")));
    assert_eq!(report.generator, Some(PluginId::new("println", "1.0")));
    assert_eq!(host.len(), 1);
    assert!(logs.contains("trace injector installed"));

    let bytes = fixtures::descriptor_bytes(&fixtures::shape_unit());
    let rewritten = host.dispatch(&LoaderScope::bootstrap(), "acme/Shape", &bytes).unwrap();
    let descriptor = fixtures::decode(&rewritten);
    assert_eq!(descriptor.injections.len(), 2);
    assert!(descriptor
        .injections
        .iter()
        .all(|i| i.snippet.starts_with("java.lang.System.err.println(")));

    let other = fixtures::descriptor_bytes(&fixtures::other_unit());
    assert_eq!(host.dispatch(&LoaderScope::bootstrap(), "other/Other", &other), None);
}

#[test]
fn test_attach_with_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("custom.json");
    std::fs::write(
        &config_file,
        serde_json::to_vec(&package_config(json!({ "type": "logging", "version": "1.0" }))).unwrap(),
    )
    .unwrap();

    let agent = Agent::new().with_dispatch(LogCapture::new().dispatch());
    let (report, host) = attach(&agent, config_file.to_str().unwrap());
    assert!(report.installed);
    assert_eq!(report.generator, Some(PluginId::new("logging", "1.0")));
    assert_eq!(host.len(), 1);
}

#[test]
fn test_missing_generator_section_installs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_config(
        dir.path(),
        &json!({ "filter": { "type": "package", "version": "1.0", "config": "acme" } }),
    );
    let logs = LogCapture::new();
    let agent = Agent::new().with_dispatch(logs.dispatch());

    let (report, host) = attach(&agent, &dir_arg(dir.path()));
    assert!(!report.installed);
    assert_eq!(report.filter, Some(PluginId::new("package", "1.0")));
    assert_eq!(report.generator, None);
    assert!(host.is_empty());
    assert!(logs.contains("no generator section"));
    assert!(logs.contains("no generator, trace injector not installed"));
    assert!(!logs.contains("no filter, trace injector not installed"));
}

#[test]
fn test_unknown_plugin_installs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_config(
        dir.path(),
        &json!({
            "filter": { "type": "regex", "version": "1.0", "config": ".*" },
            "generator": { "type": "println", "version": "9.9" }
        }),
    );
    let logs = LogCapture::new();
    let agent = Agent::new().with_dispatch(logs.dispatch());

    let (report, host) = attach(&agent, &dir_arg(dir.path()));
    assert_eq!((report.filter, report.generator), (None, None));
    assert!(host.is_empty());
    assert!(logs.contains("no filter plugin of type regex version 1.0"));
    assert!(logs.contains("no generator plugin of type println version 9.9"));
    assert!(logs.contains("no filter, trace injector not installed"));
}

#[test]
fn test_unreadable_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("broken.json");
    std::fs::write(&config_file, "{ not json").unwrap();
    let logs = LogCapture::new();
    let agent = Agent::new().with_dispatch(logs.dispatch());

    let (report, host) = attach(&agent, config_file.to_str().unwrap());
    assert!(!report.installed);
    assert_eq!(report.logging.level(), LevelFilter::INFO);
    assert!(host.is_empty());
    assert!(logs.contains("failed to load configuration"));
}

#[test]
fn test_unknown_logging_level_keeps_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = package_config(json!({ "type": "println", "version": "1.0" }));
    config["logging"] = json!("CHATTY");
    fixtures::write_config(dir.path(), &config);
    let logs = LogCapture::new();
    let agent = Agent::new().with_dispatch(logs.dispatch());

    let (report, _host) = attach(&agent, &dir_arg(dir.path()));
    assert!(report.installed);
    assert_eq!(report.logging.level(), LevelFilter::INFO);
    assert!(logs.contains("unknown logging level"));
}

#[test]
fn test_correlation_tables_resolve_against_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let table_dir = dir.path().join("tables");
    std::fs::create_dir(&table_dir).unwrap();
    tables::write_parser_tables(&table_dir).unwrap();
    fixtures::write_config(
        dir.path(),
        &json!({
            "filter": { "type": "sym-ref-tables", "version": "1.0", "config": "tables" },
            "generator": { "type": "println", "version": "1.0" }
        }),
    );
    let agent = Agent::new().with_dispatch(LogCapture::new().dispatch());

    let (report, host) = attach(&agent, &dir_arg(dir.path()));
    assert!(report.installed);

    let bytes = fixtures::descriptor_bytes(&fixtures::example_unit());
    let rewritten = host.dispatch(&LoaderScope::named("app"), "example/Example", &bytes).unwrap();
    let descriptor = fixtures::decode(&rewritten);
    // constructor, describe and lookup; hidden is not in the tables
    assert_eq!(descriptor.injections.len(), 6);
    assert!(descriptor.injections[0]
        .snippet
        .contains("Entering src/example/Example.java::example.Example::Example()|"));
}

#[test]
fn test_missing_table_directory_installs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_config(
        dir.path(),
        &json!({
            "filter": { "type": "sym-ref-tables", "version": "1.0", "config": "nowhere" },
            "generator": { "type": "println", "version": "1.0" }
        }),
    );
    let logs = LogCapture::new();
    let agent = Agent::new().with_dispatch(logs.dispatch());

    let (report, host) = attach(&agent, &dir_arg(dir.path()));
    assert_eq!(report.filter, None);
    assert!(host.is_empty());
    assert!(logs.contains("resource not found"));
}

#[derive(Debug)]
struct RecordingFactory(RecordingGenerator);

impl TypedFactory for RecordingFactory {
    fn plugin_type(&self) -> &str {
        "recording"
    }

    fn plugin_version(&self) -> &str {
        "2.0"
    }
}

impl TraceGeneratorFactory for RecordingFactory {
    fn create_trace_generator(&self, _config: Option<&Value>) -> Result<Box<dyn TraceGenerator>, PluginError> {
        Ok(Box::new(self.0.clone()))
    }
}

#[test]
fn test_registered_factory_is_selectable() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_config(
        dir.path(),
        &package_config(json!({ "type": "recording", "version": "2.0" })),
    );
    let generator = RecordingGenerator::new();
    let agent = Agent::new()
        .with_generator_factory(Box::new(RecordingFactory(generator.clone())))
        .with_dispatch(LogCapture::new().dispatch());

    let (report, host) = attach(&agent, &dir_arg(dir.path()));
    assert_eq!(report.generator, Some(PluginId::new("recording", "2.0")));

    let bytes = fixtures::descriptor_bytes(&fixtures::triple_unit());
    assert!(host.dispatch(&LoaderScope::bootstrap(), "acme/Triple", &bytes).is_some());
    assert_eq!(generator.records().len(), 6);
}
