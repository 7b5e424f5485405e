#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use dslsync::SyncConfig;
use dslsync::descriptor::COMPONENT_SERVICES_DIR;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::SystemTime;
use tempfile::TempDir;

pub const DSL_PACKAGE: &str = "org.apache.camel.builder.component";
pub const FACTORIES_PACKAGE: &str = "org.apache.camel.builder.component.dsl";

pub const POM_TEMPLATE: &str = "<project>\n\
\t<artifactId>camel-componentdsl</artifactId>\n\
\t<dependencies>\n\
\t\t<!-- START: camel components import -->\n\
\t\t<!-- END: camel components import -->\n\
\t</dependencies>\n\
</project>\n";

/// A throwaway checkout: component modules under `components/`, the DSL
/// module under `core/camel-componentdsl`.
pub struct Project {
    temp: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let project = Self { temp };
        fs::create_dir_all(project.module_root()).expect("module root");
        project
    }

    /// Project with the DSL pom already in place.
    pub fn with_pom() -> Self {
        let project = Self::new();
        project.write_pom(POM_TEMPLATE);
        project
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn module_root(&self) -> PathBuf {
        self.root().join("core/camel-componentdsl")
    }

    pub fn pom(&self) -> PathBuf {
        self.module_root().join("pom.xml")
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.module_root().join("src/generated/resources/metadata.json")
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.module_root().join("src/generated/java")
    }

    pub fn factories_dir(&self) -> PathBuf {
        package_path(&self.sources_dir(), FACTORIES_PACKAGE)
    }

    pub fn factory_source(&self, class_name: &str) -> PathBuf {
        self.factories_dir().join(format!("{class_name}.java"))
    }

    pub fn aggregate_source(&self) -> PathBuf {
        package_path(&self.sources_dir(), DSL_PACKAGE).join("ComponentsBuilderFactory.java")
    }

    pub fn write_pom(&self, content: &str) {
        fs::write(self.pom(), content).expect("write pom");
    }

    pub fn component_module(&self, artifact: &str) -> ComponentModule {
        let build_dir = self.root().join("components").join(artifact).join("target");
        fs::create_dir_all(&build_dir).expect("build dir");
        ComponentModule {
            artifact: artifact.to_string(),
            build_dir,
        }
    }

    /// Fully explicit configuration for `module`.
    pub fn config(&self, module: &ComponentModule) -> SyncConfig {
        SyncConfig {
            build_dir: module.build_dir.clone(),
            sources_output_dir: self.sources_dir(),
            resources_output_dir: self.module_root().join("src/generated/resources"),
            dependency_document: self.pom(),
            metadata_file: self.metadata_file(),
            dsl_package: DSL_PACKAGE.to_string(),
            factories_package: FACTORIES_PACKAGE.to_string(),
            license_header: None,
        }
    }

    /// Every regular file under the DSL module with its modification time.
    pub fn snapshot(&self) -> Vec<(PathBuf, SystemTime, String)> {
        let mut files = Vec::new();
        collect_files(&self.module_root(), &mut files).expect("snapshot");
        files.sort();
        files
            .into_iter()
            .map(|path| {
                let modified = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .expect("mtime");
                let content = fs::read_to_string(&path).expect("read");
                (path, modified, content)
            })
            .collect()
    }
}

/// Build output of a single component module.
pub struct ComponentModule {
    pub artifact: String,
    pub build_dir: PathBuf,
}

impl ComponentModule {
    pub fn services_dir(&self) -> PathBuf {
        self.build_dir.join(COMPONENT_SERVICES_DIR)
    }

    /// Register `scheme` and drop its component descriptor next to the
    /// implementing class.
    pub fn add_component(&self, scheme: &str, java_type: &str) {
        self.add_component_from(scheme, java_type, &self.artifact);
    }

    /// Like `add_component`, with the descriptor naming `artifact` as its
    /// owning module.
    pub fn add_component_from(&self, scheme: &str, java_type: &str, artifact: &str) {
        self.register(scheme);
        let package = java_type.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("");
        let descriptor = json!({
            "component": {
                "kind": "component",
                "name": scheme,
                "scheme": scheme,
                "title": scheme.to_uppercase(),
                "description": format!("Send and receive messages using {scheme}."),
                "javaType": java_type,
                "groupId": "org.apache.camel",
                "artifactId": artifact,
                "version": "4.0.0"
            },
            "componentProperties": {
                "lazyStartProducer": {
                    "kind": "property",
                    "javaType": "boolean",
                    "description": "Whether the producer should be started lazy.",
                    "defaultValue": false
                }
            }
        });
        self.write_descriptor(package, scheme, &descriptor);
    }

    pub fn register(&self, scheme: &str) {
        let services = self.services_dir();
        fs::create_dir_all(&services).expect("services dir");
        fs::write(
            services.join(scheme),
            format!("# Generated by camel build tools\nclass={scheme}\n"),
        )
        .expect("write registration");
    }

    pub fn unregister(&self, scheme: &str) {
        fs::remove_file(self.services_dir().join(scheme)).expect("remove registration");
    }

    /// Write `<name>.json` under `classes/<package as directories>`.
    pub fn write_descriptor(&self, package: &str, name: &str, document: &serde_json::Value) {
        let dir = package_path(&self.build_dir.join("classes"), package);
        fs::create_dir_all(&dir).expect("descriptor dir");
        let text = serde_json::to_string_pretty(document).expect("render descriptor");
        fs::write(dir.join(format!("{name}.json")), text).expect("write descriptor");
    }

    pub fn write_raw_descriptor(&self, package: &str, name: &str, text: &str) {
        let dir = package_path(&self.build_dir.join("classes"), package);
        fs::create_dir_all(&dir).expect("descriptor dir");
        fs::write(dir.join(format!("{name}.json")), text).expect("write descriptor");
    }
}

pub fn package_path(root: &Path, package: &str) -> PathBuf {
    package
        .split('.')
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("reading {}: {err}", path.display()))
}

pub fn dslsync_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dslsync"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
