//! Grouping of component models by implementing class.
//!
//! One class can be registered under several schemes (`ftp` and `ftp2` both
//! backed by `FtpComponent`). Every member of such a group is flagged so the
//! generator can keep accessor and type names from colliding.

use crate::descriptor::{ComponentModel, EnrichedComponentModel};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
/// All schemes backed by one implementing class.
pub struct AliasGroup {
    pub java_type: String,
    pub members: Vec<EnrichedComponentModel>,
}

impl AliasGroup {
    pub fn has_aliases(&self) -> bool {
        self.members.len() > 1
    }
}

/// Group models by implementing class, ordered by class name, members
/// ordered by scheme.
pub fn group_aliases(models: Vec<ComponentModel>) -> Vec<AliasGroup> {
    let mut by_type: BTreeMap<String, Vec<ComponentModel>> = BTreeMap::new();
    for model in models {
        by_type.entry(model.java_type.clone()).or_default().push(model);
    }

    by_type
        .into_iter()
        .map(|(java_type, mut models)| {
            models.sort_by(|a, b| a.scheme.cmp(&b.scheme));
            let aliased = models.len() > 1;
            AliasGroup {
                java_type,
                members: models
                    .into_iter()
                    .map(|model| EnrichedComponentModel::new(model, aliased))
                    .collect(),
            }
        })
        .collect()
}
