//! Read-once index of descriptor documents under a build tree.
//!
//! The index walks the tree a single time and records every `*.json` regular
//! file. Document text is loaded on first request and memoised; a failed read
//! is memoised too, so a broken upstream artifact fails the same way every
//! time it is asked for instead of hitting storage again.

use anyhow::{Context, Result, anyhow, bail};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const DESCRIPTOR_SUFFIX: &str = ".json";

#[derive(Debug)]
enum Slot {
    Unloaded,
    Loaded(Rc<str>),
    Failed(String),
}

#[derive(Debug)]
/// Descriptor paths in sorted order, each with a memoised loading slot.
pub struct DescriptorIndex {
    slots: BTreeMap<PathBuf, RefCell<Slot>>,
    reads: Cell<usize>,
}

impl DescriptorIndex {
    /// Walk `root` and index every descriptor file below it.
    ///
    /// Symlinks are not followed. A missing root is an error: the build
    /// directory is produced by an earlier step and must exist by now.
    pub fn build(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("build directory {} does not exist", root.display());
        }
        let mut paths = Vec::new();
        collect_descriptors(root, &mut paths)?;
        let slots = paths
            .into_iter()
            .map(|path| (path, RefCell::new(Slot::Unloaded)))
            .collect();
        Ok(Self {
            slots,
            reads: Cell::new(0),
        })
    }

    /// Return the text of `path`, reading it from storage on first use only.
    ///
    /// Returns `Ok(None)` when `path` is not part of the index.
    pub fn get_or_load(&self, path: &Path) -> Result<Option<Rc<str>>> {
        let Some(slot) = self.slots.get(path) else {
            return Ok(None);
        };
        let mut slot = slot.borrow_mut();
        match &*slot {
            Slot::Loaded(text) => return Ok(Some(Rc::clone(text))),
            Slot::Failed(reason) => return Err(anyhow!("{reason}")),
            Slot::Unloaded => {}
        }

        self.reads.set(self.reads.get() + 1);
        match fs::read_to_string(path) {
            Ok(text) => {
                let text: Rc<str> = Rc::from(text);
                *slot = Slot::Loaded(Rc::clone(&text));
                Ok(Some(text))
            }
            Err(err) => {
                let reason = format!("reading descriptor {}: {err}", path.display());
                *slot = Slot::Failed(reason.clone());
                Err(anyhow!(reason))
            }
        }
    }

    /// Indexed paths whose file name is exactly `file_name`, in path order.
    pub fn named<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a Path> + 'a {
        self.slots
            .keys()
            .filter(move |path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name == file_name)
            })
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of times storage was actually read.
    pub fn storage_reads(&self) -> usize {
        self.reads.get()
    }
}

fn collect_descriptors(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", entry.path().display()))?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_descriptors(&path, acc)?;
        } else if file_type.is_file()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(DESCRIPTOR_SUFFIX))
        {
            acc.push(path);
        }
    }
    Ok(())
}
