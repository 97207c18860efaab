// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parameter descriptors and the immutable catalog map.

use std::collections::HashMap;

use stratus_core::{Classification, StratusError, UpgradePolicy, ValueKind};

/// Parameter name that declares its section to be a property group.
pub const PROPERTY_GROUP: &str = "PropertyGroup";

/// One catalog row: the full declaration of a recognized parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Section the parameter belongs to.
    pub section: String,
    /// Parameter name.
    pub name: String,
    /// Declared value type.
    pub kind: ValueKind,
    /// Evaluated default value, in canonical form.
    pub default_value: String,
    /// Upgrade-safety classification.
    pub upgrade_policy: UpgradePolicy,
    /// Catalog classification tag.
    pub classification: Classification,
}

impl ParameterDescriptor {
    /// Whether overriding this parameter should warn.
    pub fn deprecated(&self) -> bool {
        self.classification == Classification::Deprecated
    }
}

/// A catalog section: its fixed parameters plus an optional property-group
/// template for user-extensible sections.
#[derive(Debug, Clone, Default)]
pub struct CatalogSection {
    name: String,
    parameters: HashMap<String, ParameterDescriptor>,
    property_group: Option<ParameterDescriptor>,
}

impl CatalogSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Section name in its original spelling.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a parameter descriptor, case-insensitively.
    pub fn get(&self, parameter: &str) -> Option<&ParameterDescriptor> {
        self.parameters.get(&fold(parameter))
    }

    /// Iterate the fixed parameter descriptors, in arbitrary order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.values()
    }

    /// The property-group shape template, when this section is one.
    pub fn property_group_template(&self) -> Option<&ParameterDescriptor> {
        self.property_group.as_ref()
    }
}

/// The full section -> parameter -> descriptor map, keyed case-insensitively
/// at both levels. Built once, read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct SettingsCatalog {
    sections: HashMap<String, CatalogSection>,
}

impl SettingsCatalog {
    /// Look up a section, case-insensitively.
    pub fn get_section(&self, section: &str) -> Option<&CatalogSection> {
        self.sections.get(&fold(section))
    }

    /// Look up one descriptor, case-insensitively at both levels.
    pub fn get(&self, section: &str, parameter: &str) -> Option<&ParameterDescriptor> {
        self.get_section(section)?.get(parameter)
    }

    /// Whether the catalog knows the section at all.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&fold(section))
    }

    /// Whether the section's parameter set is user-defined key/value pairs.
    pub fn is_property_group(&self, section: &str) -> bool {
        self.get_section(section)
            .is_some_and(|s| s.property_group.is_some())
    }

    /// Iterate every known section.
    pub fn sections(&self) -> impl Iterator<Item = &CatalogSection> {
        self.sections.values()
    }

    /// Iterate section names in their original spelling.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.values().map(|s| s.name.as_str())
    }

    /// Insert one descriptor; duplicate (section, parameter) pairs are fatal.
    pub(crate) fn insert(&mut self, descriptor: ParameterDescriptor) -> Result<(), StratusError> {
        let entry = self
            .sections
            .entry(fold(&descriptor.section))
            .or_insert_with(|| CatalogSection::new(&descriptor.section));

        if descriptor.name.eq_ignore_ascii_case(PROPERTY_GROUP) {
            if entry.property_group.is_some() {
                return Err(StratusError::DuplicateParameter {
                    section: descriptor.section,
                    name: descriptor.name,
                });
            }
            entry.property_group = Some(descriptor);
            return Ok(());
        }

        let key = fold(&descriptor.name);
        if entry.parameters.contains_key(&key) {
            return Err(StratusError::DuplicateParameter {
                section: descriptor.section,
                name: descriptor.name,
            });
        }
        entry.parameters.insert(key, descriptor);
        Ok(())
    }
}

/// Case-insensitive key normalization used by both map levels.
pub(crate) fn fold(key: &str) -> String {
    key.to_ascii_lowercase()
}
