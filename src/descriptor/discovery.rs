//! Component name discovery from the service-registration directory.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Where the build drops one registration file per component, relative to
/// the build directory.
pub const COMPONENT_SERVICES_DIR: &str = "classes/META-INF/services/org/apache/camel/component";

/// Collect the component names registered in `build_dir`.
///
/// Subdirectories hold other registration categories (resolvers and the like)
/// and are skipped, as are dot-files left behind by editors. A module without
/// the services directory simply has no components.
pub fn discover_component_names(build_dir: &Path) -> Result<BTreeSet<String>> {
    let services = build_dir.join(COMPONENT_SERVICES_DIR);
    let mut names = BTreeSet::new();
    if !services.is_dir() {
        debug!(dir = %services.display(), "no component services directory");
        return Ok(names);
    }

    for entry in fs::read_dir(&services).with_context(|| format!("listing {}", services.display()))? {
        let entry = entry.with_context(|| format!("listing {}", services.display()))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!(path = %path.display(), "skipping non UTF-8 registration entry");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        names.insert(name);
    }
    Ok(names)
}
