// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin type registry.
//!
//! Producer and consumer type names resolve against an explicit factory
//! table built at compile time; there is no runtime type scanning, so the
//! available set is auditable and testable. Operator-supplied implementations
//! extend the table through [`PluginRegistry::register_custom`].

use std::collections::{BTreeMap, HashMap};

use stratus_core::StratusError;

use crate::validators;

/// Whether a plugin type produces or consumes diagnostic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginRole {
    /// Gathers diagnostic data.
    Producer,
    /// Exports diagnostic data.
    Consumer,
}

/// The loaded diagnostics-validator capability.
///
/// `validate` receives the instance section's custom parameters, already
/// partitioned by the manifest's per-parameter encryption flag. Standard
/// parameters are matched against the type's allow-list by the resolver and
/// never reach the validator.
pub trait PluginValidator {
    /// Whether the plugin considers itself operational. Defaults to enabled;
    /// an implementation may force-disable (unsupported platform, missing
    /// backend).
    fn is_enabled(&self) -> bool {
        true
    }

    /// Validate the custom parameters of one instance section.
    fn validate(
        &mut self,
        section: &str,
        plain: &BTreeMap<String, String>,
        encrypted: &BTreeMap<String, String>,
    ) -> Result<(), StratusError>;
}

impl std::fmt::Debug for dyn PluginValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PluginValidator")
    }
}

/// Factory producing a fresh validator per validation pass.
pub type ValidatorFactory = Box<dyn Fn() -> Result<Box<dyn PluginValidator>, String> + Send + Sync>;

/// One resolvable plugin type.
pub struct PluginTypeEntry {
    type_name: String,
    role: PluginRole,
    standard: bool,
    standard_params: Vec<String>,
    factory: ValidatorFactory,
}

impl std::fmt::Debug for PluginTypeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginTypeEntry")
            .field("type_name", &self.type_name)
            .field("role", &self.role)
            .field("standard", &self.standard)
            .finish()
    }
}

impl PluginTypeEntry {
    /// Type name in its registered spelling.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Producer or consumer.
    pub fn role(&self) -> PluginRole {
        self.role
    }

    /// Whether this is a standard (built-in) type, subject to the
    /// compatibility relation.
    pub fn is_standard(&self) -> bool {
        self.standard
    }

    /// Whether the parameter name is on this type's standard allow-list.
    pub fn is_standard_param(&self, name: &str) -> bool {
        self.standard_params.iter().any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Instantiate the validator. Failure maps to `PluginLoadError` for the
    /// instance being resolved.
    pub fn load(&self, instance: &str) -> Result<Box<dyn PluginValidator>, StratusError> {
        (self.factory)().map_err(|detail| StratusError::PluginLoad {
            instance: instance.to_string(),
            detail,
        })
    }
}

/// The plugin type table, keyed case-insensitively by type name.
pub struct PluginRegistry {
    entries: HashMap<String, PluginTypeEntry>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("types", &self.entries.len())
            .finish()
    }
}

impl PluginRegistry {
    /// Registry with only the standard types for this build configuration.
    pub fn standard() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        for (type_name, role, params) in validators::standard_types() {
            registry.insert(PluginTypeEntry {
                type_name: type_name.to_string(),
                role,
                standard: true,
                standard_params: with_common_params(params.iter().map(ToString::to_string)),
                factory: Box::new(move || Ok(validators::standard_validator(type_name))),
            });
        }
        registry
    }

    /// Register an operator-supplied plugin type.
    ///
    /// Custom types are exempt from the standard compatibility relation.
    pub fn register_custom(
        &mut self,
        type_name: impl Into<String>,
        role: PluginRole,
        standard_params: Vec<String>,
        factory: ValidatorFactory,
    ) {
        self.insert(PluginTypeEntry {
            type_name: type_name.into(),
            role,
            standard: false,
            standard_params: with_common_params(standard_params.into_iter()),
            factory,
        });
    }

    fn insert(&mut self, entry: PluginTypeEntry) {
        self.entries
            .insert(entry.type_name.to_ascii_lowercase(), entry);
    }

    /// Resolve a type name, case-insensitively.
    pub fn resolve(&self, type_name: &str) -> Option<&PluginTypeEntry> {
        self.entries.get(&type_name.to_ascii_lowercase())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every type additionally recognizes the common instance-section parameters.
fn with_common_params(type_specific: impl Iterator<Item = String>) -> Vec<String> {
    validators::COMMON_PARAMS
        .iter()
        .map(ToString::to_string)
        .chain(type_specific)
        .collect()
}
