//! Builder factory source generation.
//!
//! The synchronizer only needs a class name and some source text back from a
//! generator; [`ArtifactGenerator`] is that boundary. [`BuilderFactoryGenerator`]
//! is the stock implementation: one Java interface per component exposing a
//! fluent builder over its component properties, plus one aggregate
//! `ComponentsBuilderFactory` with an accessor per known scheme.

use crate::descriptor::EnrichedComponentModel;
use crate::descriptor::model::{lower_camel_case, upper_camel_case};
use anyhow::{Result, bail};
use serde_json::Value;
use std::fmt::Write;

/// Rendered class source plus the name the generator chose for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub class_name: String,
    pub source: String,
}

pub trait ArtifactGenerator {
    /// Source for the builder factory of a single component.
    fn generate_component(
        &self,
        model: &EnrichedComponentModel,
        package: &str,
    ) -> Result<GeneratedSource>;

    /// Source for the entry point covering every known component.
    fn generate_aggregate(
        &self,
        models: &[EnrichedComponentModel],
        package: &str,
    ) -> Result<GeneratedSource>;
}

pub const AGGREGATE_CLASS_NAME: &str = "ComponentsBuilderFactory";

const GENERATED_BY: &str = "dslsync";

#[derive(Debug, Clone)]
pub struct BuilderFactoryGenerator {
    factories_package: String,
}

impl BuilderFactoryGenerator {
    /// `factories_package` is where per-component factories live; the
    /// aggregate imports them from there.
    pub fn new(factories_package: impl Into<String>) -> Self {
        Self {
            factories_package: factories_package.into(),
        }
    }
}

impl ArtifactGenerator for BuilderFactoryGenerator {
    fn generate_component(
        &self,
        model: &EnrichedComponentModel,
        package: &str,
    ) -> Result<GeneratedSource> {
        let component = &model.component;
        if component.java_type.trim().is_empty() {
            bail!("component {} has no implementing class", component.scheme);
        }
        let class_name = model.generated_class_name.clone();
        let builder = format!("{}ComponentBuilder", upper_camel_case(&component.scheme));
        let builder_impl = format!("{builder}Impl");
        let accessor = lower_camel_case(&component.scheme);
        // Aliases share one implementing class; referencing it fully qualified
        // keeps sibling factories from importing the same simple name twice.
        let component_type = if model.has_aliases {
            component.java_type.clone()
        } else {
            component.java_simple_name().to_string()
        };

        let mut out = String::new();
        writeln!(out, "package {package};")?;
        writeln!(out)?;
        writeln!(out, "import javax.annotation.processing.Generated;")?;
        writeln!(out, "import org.apache.camel.builder.component.AbstractComponentBuilder;")?;
        writeln!(out, "import org.apache.camel.builder.component.ComponentBuilder;")?;
        if !model.has_aliases {
            writeln!(out, "import {};", component.java_type)?;
        }
        writeln!(out)?;
        writeln!(out, "/**")?;
        writeln!(
            out,
            " * {}",
            component.description().unwrap_or(component.scheme.as_str())
        )?;
        writeln!(out, " *")?;
        writeln!(out, " * Generated by camel build tools - do NOT edit this file!")?;
        writeln!(out, " */")?;
        writeln!(out, "@Generated(\"{GENERATED_BY}\")")?;
        writeln!(out, "public interface {class_name} {{")?;
        writeln!(out)?;
        write_javadoc(&mut out, "    ", &describe(model))?;
        writeln!(out, "    static {builder} {accessor}() {{")?;
        writeln!(out, "        return new {builder_impl}();")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(
            out,
            "    interface {builder} extends ComponentBuilder<{component_type}> {{"
        )?;
        if let Some(properties) = component.component_properties() {
            for (name, option) in properties {
                write_property_setter(&mut out, &builder, name, option)?;
            }
        }
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(
            out,
            "    class {builder_impl} extends AbstractComponentBuilder<{component_type}> implements {builder} {{"
        )?;
        writeln!(out, "        @Override")?;
        writeln!(
            out,
            "        protected {component_type} buildConcreteComponent() {{"
        )?;
        writeln!(out, "            return new {component_type}();")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;

        Ok(GeneratedSource {
            class_name,
            source: out,
        })
    }

    fn generate_aggregate(
        &self,
        models: &[EnrichedComponentModel],
        package: &str,
    ) -> Result<GeneratedSource> {
        let mut ordered: Vec<&EnrichedComponentModel> = models.iter().collect();
        ordered.sort_by(|a, b| a.scheme().cmp(b.scheme()));

        let mut out = String::new();
        writeln!(out, "package {package};")?;
        writeln!(out)?;
        writeln!(out, "import javax.annotation.processing.Generated;")?;
        if self.factories_package != package {
            writeln!(out, "import {}.*;", self.factories_package)?;
        }
        writeln!(out)?;
        writeln!(out, "/**")?;
        writeln!(out, " * Entry point for the component DSL builders.")?;
        writeln!(out, " *")?;
        writeln!(out, " * Generated by camel build tools - do NOT edit this file!")?;
        writeln!(out, " */")?;
        writeln!(out, "@Generated(\"{GENERATED_BY}\")")?;
        writeln!(out, "public interface {AGGREGATE_CLASS_NAME} {{")?;
        for model in ordered {
            let factory = &model.generated_class_name;
            let builder = format!("{}ComponentBuilder", upper_camel_case(model.scheme()));
            let accessor = lower_camel_case(model.scheme());
            writeln!(out)?;
            write_javadoc(&mut out, "    ", &describe(model))?;
            writeln!(out, "    static {factory}.{builder} {accessor}() {{")?;
            writeln!(out, "        return {factory}.{accessor}();")?;
            writeln!(out, "    }}")?;
        }
        writeln!(out, "}}")?;

        Ok(GeneratedSource {
            class_name: AGGREGATE_CLASS_NAME.to_string(),
            source: out,
        })
    }
}

fn describe(model: &EnrichedComponentModel) -> Vec<String> {
    let component = &model.component;
    let mut lines = vec![format!(
        "{} ({})",
        component.title().unwrap_or(component.scheme.as_str()),
        component.artifact_id
    )];
    if let Some(description) = component.description() {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.push(String::new());
    lines.push(format!("Component scheme: {}", component.scheme));
    if model.has_aliases {
        lines.push(format!(
            "Shares its implementation ({}) with other schemes.",
            component.java_simple_name()
        ));
    }
    lines
}

fn write_javadoc(out: &mut String, indent: &str, lines: &[String]) -> std::fmt::Result {
    writeln!(out, "{indent}/**")?;
    for line in lines {
        if line.is_empty() {
            writeln!(out, "{indent} *")?;
        } else {
            writeln!(out, "{indent} * {line}")?;
        }
    }
    writeln!(out, "{indent} */")
}

fn write_property_setter(
    out: &mut String,
    builder: &str,
    name: &str,
    option: &Value,
) -> std::fmt::Result {
    let java_type = option
        .get("javaType")
        .and_then(Value::as_str)
        .unwrap_or("java.lang.Object");
    let mut doc = Vec::new();
    if let Some(description) = option.get("description").and_then(Value::as_str) {
        doc.push(description.to_string());
        doc.push(String::new());
    }
    let escaped = java_type.replace('<', "&lt;").replace('>', "&gt;");
    doc.push(format!("The option is a: <code>{escaped}</code> type."));
    if let Some(default) = option.get("defaultValue") {
        doc.push(String::new());
        doc.push(format!("Default: {}", display_default(default)));
    }

    writeln!(out)?;
    write_javadoc(out, "        ", &doc)?;
    writeln!(out, "        default {builder} {name}({java_type} {name}) {{")?;
    writeln!(out, "            doSetProperty(\"{name}\", {name});")?;
    writeln!(out, "            return this;")?;
    writeln!(out, "        }}")
}

fn display_default(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
