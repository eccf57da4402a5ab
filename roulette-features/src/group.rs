//! Named value groups and the catalog criteria resolve them from.

use crate::definition::GroupDefinition;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A named, versioned set of allowed string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    version: u64,
    values: HashSet<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, version: u64, values: HashSet<String>) -> Self {
        Self {
            name: name.into(),
            version,
            values,
        }
    }

    pub fn from_definition(def: &GroupDefinition) -> Self {
        Self::new(def.id.clone(), def.version, def.values.iter().cloned().collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn values(&self) -> &HashSet<String> {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }
}

/// Groups by name, consulted while loading group criteria.
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
    groups: HashMap<String, Arc<Group>>,
}

impl GroupCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group unless one with the same name is already present.
    ///
    /// Returns `false` when the group was ignored.
    pub fn insert(&mut self, group: Group) -> bool {
        if self.groups.contains_key(group.name()) {
            return false;
        }
        self.groups.insert(group.name().to_string(), Arc::new(group));
        true
    }

    /// Add every definition, keeping the first occurrence of each name.
    pub fn extend_from_definitions<'a>(
        &mut self,
        definitions: impl IntoIterator<Item = &'a GroupDefinition>,
    ) {
        for def in definitions {
            self.insert(Group::from_definition(def));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
