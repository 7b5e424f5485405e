// Library-level scenarios: full synchronization runs against throwaway
// project checkouts, covering incremental behavior and failure categories.
mod support;

use anyhow::{Result, anyhow};
use dslsync::descriptor::{ComponentModel, ModelMapper};
use dslsync::{
    ArtifactGenerator, EnrichedComponentModel, GeneratedSource, JsonModelMapper, MetadataRegistry,
    SyncError, Synchronizer,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use support::{Project, read};

const FTP: &str = "org.apache.camel.component.file.remote.FtpComponent";
const TIMER: &str = "org.apache.camel.component.timer.TimerComponent";

fn load_registry(project: &Project) -> Result<MetadataRegistry> {
    MetadataRegistry::load(&project.metadata_file(), &project.factories_dir())
}

// Aliased schemes each get a factory, land in the registry flagged, and share
// one dependency entry in the pom.
#[test]
fn full_run_generates_factories_registry_and_pom() -> Result<()> {
    let project = Project::with_pom();
    let ftp = project.component_module("camel-ftp");
    ftp.add_component("ftp", FTP);
    ftp.add_component("ftp2", FTP);
    let timer = project.component_module("camel-timer");
    timer.add_component("timer", TIMER);

    let report = dslsync::run(&project.config(&ftp))?;
    assert_eq!(report.discovered, vec!["ftp", "ftp2"]);
    assert_eq!(report.generated, vec!["ftp", "ftp2"]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.registry_writes, 2);

    let report = dslsync::run(&project.config(&timer))?;
    assert_eq!(report.generated, vec!["timer"]);
    assert_eq!(report.registered, vec!["ftp", "ftp2", "timer"]);

    for class in [
        "FtpComponentBuilderFactory",
        "Ftp2ComponentBuilderFactory",
        "TimerComponentBuilderFactory",
    ] {
        let source = read(&project.factory_source(class));
        assert!(source.starts_with("/*\n * Licensed to the Apache Software Foundation"));
        assert!(source.contains(&format!("public interface {class} {{")));
    }

    let registry = load_registry(&project)?;
    assert_eq!(registry.len(), 3);
    assert!(registry.entry("ftp").is_some_and(|m| m.has_aliases));
    assert!(registry.entry("ftp2").is_some_and(|m| m.has_aliases));
    assert!(registry.entry("timer").is_some_and(|m| !m.has_aliases));
    assert_eq!(
        registry.generated_class_name("ftp2"),
        Some("Ftp2ComponentBuilderFactory")
    );

    let aggregate = read(&project.aggregate_source());
    for accessor in ["ftp()", "ftp2()", "timer()"] {
        assert!(aggregate.contains(accessor), "aggregate misses {accessor}");
    }

    let pom = read(&project.pom());
    assert_eq!(pom.matches("<dependency>").count(), 2);
    assert!(pom.contains("<artifactId>camel-ftp</artifactId>"));
    assert!(pom.contains("<artifactId>camel-timer</artifactId>"));
    assert!(pom.starts_with("<project>\n\t<artifactId>camel-componentdsl</artifactId>"));
    Ok(())
}

// All three components found in one discovery pass against an empty
// registry.
#[test]
fn single_pass_over_aliased_and_plain_components() -> Result<()> {
    let project = Project::with_pom();
    let module = project.component_module("camel-mixed");
    module.add_component_from("timer", TIMER, "camel-timer");
    module.add_component_from("ftp", FTP, "camel-ftp");
    module.add_component_from("ftp2", FTP, "camel-ftp");

    let report = dslsync::run(&project.config(&module))?;
    assert_eq!(report.discovered, vec!["ftp", "ftp2", "timer"]);
    assert_eq!(report.generated, vec!["ftp", "ftp2", "timer"]);
    assert_eq!(report.registered, vec!["ftp", "ftp2", "timer"]);
    assert_eq!(report.registry_writes, 3);

    let registry = load_registry(&project)?;
    assert_eq!(registry.len(), 3);
    assert!(registry.entry("ftp").is_some_and(|m| m.has_aliases));
    assert!(registry.entry("ftp2").is_some_and(|m| m.has_aliases));
    assert!(registry.entry("timer").is_some_and(|m| !m.has_aliases));

    let aggregate = read(&project.aggregate_source());
    for accessor in ["ftp()", "ftp2()", "timer()"] {
        assert!(aggregate.contains(accessor), "aggregate misses {accessor}");
    }

    let pom = read(&project.pom());
    assert_eq!(pom.matches("<dependency>").count(), 2);
    assert!(pom.contains("<artifactId>camel-ftp</artifactId>"));
    assert!(pom.contains("<artifactId>camel-timer</artifactId>"));
    Ok(())
}

// Re-running with unchanged inputs writes nothing and leaves every
// timestamp alone.
#[test]
fn second_run_with_same_inputs_is_a_no_op() -> Result<()> {
    let project = Project::with_pom();
    let ftp = project.component_module("camel-ftp");
    ftp.add_component("ftp", FTP);
    ftp.add_component("ftp2", FTP);

    let first = dslsync::run(&project.config(&ftp))?;
    assert!(first.written() > 0);
    let before = project.snapshot();

    let second = dslsync::run(&project.config(&ftp))?;
    assert_eq!(second.written(), 0);
    assert_eq!(second.registry_writes, 0);
    assert_eq!(second.unchanged(), second.artifacts.len());
    assert_eq!(project.snapshot(), before);
    Ok(())
}

// Components generated by earlier runs stay in the aggregate and the pom even
// when the current module no longer registers them.
#[test]
fn earlier_components_survive_incremental_runs() -> Result<()> {
    let project = Project::with_pom();
    let ftp = project.component_module("camel-ftp");
    ftp.add_component("ftp", FTP);
    ftp.add_component("ftp2", FTP);
    dslsync::run(&project.config(&ftp))?;

    ftp.unregister("ftp2");
    let report = dslsync::run(&project.config(&ftp))?;
    assert_eq!(report.generated, vec!["ftp"]);
    assert_eq!(report.registered, vec!["ftp", "ftp2"]);

    let aggregate = read(&project.aggregate_source());
    assert!(aggregate.contains("ftp2()"));
    assert!(read(&project.pom()).contains("<artifactId>camel-ftp</artifactId>"));
    Ok(())
}

// A registry entry whose generated source disappeared is dropped and no
// longer contributes to the aggregate or the pom.
#[test]
fn entries_without_sources_are_dropped() -> Result<()> {
    let project = Project::with_pom();
    let ftp = project.component_module("camel-ftp");
    ftp.add_component("ftp", FTP);
    dslsync::run(&project.config(&ftp))?;
    let timer = project.component_module("camel-timer");
    timer.add_component("timer", TIMER);
    dslsync::run(&project.config(&timer))?;

    fs::remove_file(project.factory_source("FtpComponentBuilderFactory"))?;
    let report = dslsync::run(&project.config(&timer))?;
    assert_eq!(report.registered, vec!["timer"]);
    assert_eq!(report.registry_writes, 1);

    assert!(!read(&project.aggregate_source()).contains("ftp()"));
    assert!(!read(&project.pom()).contains("camel-ftp"));
    Ok(())
}

// Same-named documents of other kinds are skipped in favor of the component
// descriptor; names without any component descriptor are reported.
#[test]
fn component_descriptor_is_picked_by_kind() -> Result<()> {
    let project = Project::with_pom();
    let module = project.component_module("camel-bean");
    module.register("bean");
    module.register("ghost");
    module.write_descriptor(
        "org.apache.camel.bean.language",
        "bean",
        &json!({"language": {"kind": "language", "name": "bean", "javaType": "org.apache.camel.language.bean.BeanLanguage"}}),
    );
    module.write_descriptor(
        "org.apache.camel.component.bean",
        "bean",
        &json!({"component": {
            "kind": "component",
            "scheme": "bean",
            "javaType": "org.apache.camel.component.bean.BeanComponent",
            "groupId": "org.apache.camel",
            "artifactId": "camel-bean"
        }}),
    );

    let report = dslsync::run(&project.config(&module))?;
    assert_eq!(report.generated, vec!["bean"]);
    assert_eq!(report.skipped, vec!["ghost"]);

    let registry = load_registry(&project)?;
    let bean = registry.entry("bean").ok_or_else(|| anyhow!("bean missing"))?;
    assert_eq!(
        bean.component.java_type,
        "org.apache.camel.component.bean.BeanComponent"
    );
    Ok(())
}

// A module without component registrations touches nothing, not even a
// missing pom.
#[test]
fn module_without_components_is_left_alone() -> Result<()> {
    let project = Project::new();
    let module = project.component_module("camel-support");

    let report = dslsync::run(&project.config(&module))?;
    assert!(report.discovered.is_empty());
    assert!(report.artifacts.is_empty());
    assert_eq!(report.written(), 0);
    assert!(!project.metadata_file().exists());
    assert!(project.snapshot().is_empty());
    Ok(())
}

#[test]
fn missing_pom_is_a_configuration_error() {
    let project = Project::new();
    let module = project.component_module("camel-timer");
    module.add_component("timer", TIMER);

    let err = dslsync::run(&project.config(&module)).expect_err("pom is required");
    assert!(matches!(err, SyncError::Config(_)), "{err}");
    assert!(!err.is_build_failure());
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn pom_without_markers_is_a_configuration_error() {
    let project = Project::new();
    project.write_pom("<project>\n</project>\n");
    let module = project.component_module("camel-timer");
    module.add_component("timer", TIMER);

    let err = dslsync::run(&project.config(&module)).expect_err("markers are required");
    assert!(matches!(err, SyncError::Config(_)), "{err}");
    assert!(err.to_string().contains("start marker"));
    assert_eq!(read(&project.pom()), "<project>\n</project>\n");
}

#[test]
fn corrupt_registry_aborts_the_run() {
    let project = Project::with_pom();
    let module = project.component_module("camel-timer");
    module.add_component("timer", TIMER);
    let metadata = project.metadata_file();
    fs::create_dir_all(metadata.parent().expect("parent")).expect("resources dir");
    fs::write(&metadata, "{ broken").expect("write registry");

    let err = dslsync::run(&project.config(&module)).expect_err("corrupt registry");
    assert!(matches!(err, SyncError::Registry(_)), "{err}");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(read(&metadata), "{ broken");
    assert_eq!(read(&project.pom()), support::POM_TEMPLATE);
}

// Descriptors the mapper rejects are build failures naming the component.
#[test]
fn unmappable_descriptor_is_a_build_failure() {
    let project = Project::with_pom();
    let module = project.component_module("camel-broken");
    module.register("broken");
    module.write_raw_descriptor(
        "org.apache.camel.component.broken",
        "broken",
        "{\n  \"component\": {\n    \"kind\": \"component\",\n    \"scheme\": \"broken\"\n  }\n}\n",
    );

    let err = dslsync::run(&project.config(&module)).expect_err("bad descriptor");
    assert!(err.is_build_failure());
    assert_eq!(err.exit_code(), 2);
    match err {
        SyncError::Generation { subject, .. } => assert_eq!(subject, "broken"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!project.metadata_file().exists());
}

// A descriptor with a blank owning module fails the build up front instead
// of landing in the registry and breaking every later load.
#[test]
fn blank_artifact_id_fails_before_reaching_the_registry() -> Result<()> {
    let project = Project::with_pom();
    let module = project.component_module("camel-odd");
    module.register("odd");
    let descriptor = |artifact: &str| {
        json!({"component": {
            "kind": "component",
            "scheme": "odd",
            "javaType": "org.apache.camel.component.odd.OddComponent",
            "groupId": "org.apache.camel",
            "artifactId": artifact
        }})
    };
    module.write_descriptor("org.apache.camel.component.odd", "odd", &descriptor(""));

    let err = dslsync::run(&project.config(&module)).expect_err("blank artifactId");
    assert!(err.is_build_failure(), "{err}");
    assert!(err.to_string().contains("empty artifactId"), "{err}");
    assert!(!project.metadata_file().exists());

    module.write_descriptor("org.apache.camel.component.odd", "odd", &descriptor("camel-odd"));
    let report = dslsync::run(&project.config(&module))?;
    assert_eq!(report.registered, vec!["odd"]);
    dslsync::run(&project.config(&module))?;
    Ok(())
}

struct DottedNameGenerator;

impl ArtifactGenerator for DottedNameGenerator {
    fn generate_component(
        &self,
        model: &EnrichedComponentModel,
        package: &str,
    ) -> Result<GeneratedSource> {
        Ok(GeneratedSource {
            class_name: format!("Dsl.{}", model.scheme()),
            source: format!("package {package};
"),
        })
    }

    fn generate_aggregate(
        &self,
        _models: &[EnrichedComponentModel],
        package: &str,
    ) -> Result<GeneratedSource> {
        Ok(GeneratedSource {
            class_name: "Everything".to_string(),
            source: format!("package {package};
"),
        })
    }
}

// A generator-chosen class name the registry could not reload is a build
// failure for that component, and the registry on disk stays loadable.
#[test]
fn unloadable_class_name_is_rejected_before_flush() -> Result<()> {
    let project = Project::with_pom();
    let ftp = project.component_module("camel-ftp");
    ftp.add_component("ftp", FTP);
    dslsync::run(&project.config(&ftp))?;
    let registry_before = read(&project.metadata_file());

    let timer = project.component_module("camel-timer");
    timer.add_component("timer", TIMER);
    let config = project.config(&timer);
    let err = Synchronizer::new(&config, &JsonModelMapper, &DottedNameGenerator)
        .run()
        .expect_err("dotted class name");
    assert!(err.is_build_failure(), "{err}");
    match &err {
        SyncError::Generation { subject, .. } => assert_eq!(subject, "timer"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(read(&project.metadata_file()), registry_before);

    let report = dslsync::run(&config)?;
    assert_eq!(report.registered, vec!["ftp", "timer"]);
    Ok(())
}

struct NamingGenerator;

impl ArtifactGenerator for NamingGenerator {
    fn generate_component(
        &self,
        model: &EnrichedComponentModel,
        package: &str,
    ) -> Result<GeneratedSource> {
        Ok(GeneratedSource {
            class_name: format!("Dsl_{}", model.scheme()),
            source: format!("package {package};\ninterface Dsl_{} {{}}\n", model.scheme()),
        })
    }

    fn generate_aggregate(
        &self,
        models: &[EnrichedComponentModel],
        package: &str,
    ) -> Result<GeneratedSource> {
        let schemes: Vec<&str> = models.iter().map(|m| m.scheme()).collect();
        Ok(GeneratedSource {
            class_name: "Everything".to_string(),
            source: format!("package {package};\n// {}\n", schemes.join(",")),
        })
    }
}

struct UppercaseArtifacts;

impl ModelMapper for UppercaseArtifacts {
    fn map_component(&self, descriptor: &str) -> Result<ComponentModel> {
        let mut model = JsonModelMapper.map_component(descriptor)?;
        model.artifact_id = model.artifact_id.to_uppercase();
        Ok(model)
    }
}

// Hosts can plug in their own mapper and generator; the registry records
// whatever class name the generator chose.
#[test]
fn custom_mapper_and_generator_drive_the_pipeline() -> Result<()> {
    let project = Project::with_pom();
    let module = project.component_module("camel-timer");
    module.add_component("timer", TIMER);
    let config = project.config(&module);

    let report = Synchronizer::new(&config, &UppercaseArtifacts, &NamingGenerator).run()?;
    assert_eq!(report.generated, vec!["timer"]);

    assert!(project.factory_source("Dsl_timer").is_file());
    let aggregate = support::package_path(&project.sources_dir(), support::DSL_PACKAGE)
        .join("Everything.java");
    assert!(read(&aggregate).contains("// timer"));

    let registry = load_registry(&project)?;
    assert_eq!(registry.generated_class_name("timer"), Some("Dsl_timer"));
    assert!(read(&project.pom()).contains("<artifactId>CAMEL-TIMER</artifactId>"));
    Ok(())
}

// A custom license header replaces the packaged one on every generated file.
#[test]
fn license_header_override_is_applied() -> Result<()> {
    let project = Project::with_pom();
    let module = project.component_module("camel-timer");
    module.add_component("timer", TIMER);
    let header = project.root().join("header.txt");
    fs::write(&header, "// custom header\n")?;
    let mut config = project.config(&module);
    config.license_header = Some(header);

    dslsync::run(&config)?;
    let source = read(&project.factory_source("TimerComponentBuilderFactory"));
    assert!(source.starts_with("// custom header\npackage org.apache.camel.builder.component.dsl;"));
    assert!(read(&project.aggregate_source()).starts_with("// custom header\n"));
    Ok(())
}
