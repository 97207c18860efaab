// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin instance resolution.
//!
//! Walks the `Diagnostics` section's producer and consumer instance lists,
//! resolves each declared type through the registry, validates instance
//! parameters, and enforces the producer/consumer compatibility relation.
//! Structural errors accumulate across both lists so one pass reports the
//! complete picture; only a validator load failure short-circuits, and only
//! for its own instance.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use stratus_catalog::SettingsCatalog;
use stratus_core::{StratusError, TypedValue};
use stratus_settings::{SettingsStore, StoreSection};
use tracing::debug;

use crate::compat;
use crate::registry::{PluginRegistry, PluginRole, PluginTypeEntry};

/// Section holding the pipeline's instance lists.
pub const DIAGNOSTICS_SECTION: &str = "Diagnostics";
/// Comma-separated producer instance list.
pub const PRODUCER_INSTANCES: &str = "ProducerInstances";
/// Comma-separated consumer instance list.
pub const CONSUMER_INSTANCES: &str = "ConsumerInstances";
/// Producer type declaration inside an instance section.
pub const PRODUCER_TYPE: &str = "ProducerType";
/// Consumer type declaration inside an instance section.
pub const CONSUMER_TYPE: &str = "ConsumerType";
/// Producer reference inside a consumer instance section.
pub const PRODUCER_INSTANCE: &str = "ProducerInstance";
/// Per-instance enable flag; absent means enabled.
pub const IS_ENABLED: &str = "IsEnabled";
/// Implementation identity inside a custom consumer-type section.
pub const IMPLEMENTATION_ID: &str = "ImplementationId";

const STORE_CONNECTION_STRING: &str = "StoreConnectionString";
const CONTAINER_NAME: &str = "ContainerName";
const FILE_SHARE_ETW_CSV: &str = "FileShareEtwCsvUploader";
const AZURE_TABLE_ETW: &str = "AzureTableEtwEventUploader";
const AZURE_BLOB_ETW_CSV: &str = "AzureBlobEtwCsvUploader";
const AZURE_BLOB_FOLDER: &str = "AzureBlobFolderUploader";
const FOLDER_PRODUCER: &str = "FolderProducer";

/// One resolved plugin instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInstance {
    /// Instance name from the list parameter.
    pub instance: String,
    /// Resolved type name, in its registered spelling.
    pub type_name: String,
    /// Section `IsEnabled` combined with the validator's own flag.
    pub is_enabled: bool,
}

/// The outcome of one diagnostics validation pass.
#[derive(Debug, Default)]
pub struct PluginResolution {
    /// Resolved producer instances, in list order.
    pub producers: Vec<PluginInstance>,
    /// Resolved consumer instances, in list order.
    pub consumers: Vec<PluginInstance>,
    /// Every section claimed by a plugin: instances plus custom-type sections.
    pub plugin_owned_sections: BTreeSet<String>,
    file_store_connection_string: Option<TypedValue>,
    table_store_connection_string: Option<TypedValue>,
    log_container: Option<String>,
    crash_dump_container: Option<String>,
}

impl PluginResolution {
    /// Whether any plugin in the pipeline is enabled.
    pub fn is_enabled(&self) -> bool {
        self.producers
            .iter()
            .chain(&self.consumers)
            .any(|p| p.is_enabled)
    }

    /// Whether an enabled consumer uploads CSV events to a file share.
    pub fn is_file_store_enabled(&self) -> bool {
        self.has_enabled_consumer(FILE_SHARE_ETW_CSV)
    }

    /// Whether an enabled consumer uploads events to an Azure table.
    pub fn is_table_store_enabled(&self) -> bool {
        self.has_enabled_consumer(AZURE_TABLE_ETW)
    }

    /// Whether application log folders are being collected.
    pub fn is_app_log_collection_enabled(&self) -> bool {
        self.producers
            .iter()
            .any(|p| p.is_enabled && p.type_name.eq_ignore_ascii_case(FOLDER_PRODUCER))
    }

    /// Connection string of the file-share consumer, possibly encrypted.
    pub fn file_store_connection_string(&self) -> Option<&TypedValue> {
        self.file_store_connection_string.as_ref()
    }

    /// Connection string of the table consumer, possibly encrypted.
    pub fn table_store_connection_string(&self) -> Option<&TypedValue> {
        self.table_store_connection_string.as_ref()
    }

    /// Blob container receiving log uploads.
    pub fn log_container(&self) -> Option<&str> {
        self.log_container.as_deref()
    }

    /// Blob container receiving crash dump uploads.
    pub fn crash_dump_container(&self) -> Option<&str> {
        self.crash_dump_container.as_deref()
    }

    fn has_enabled_consumer(&self, type_name: &str) -> bool {
        self.consumers
            .iter()
            .any(|c| c.is_enabled && c.type_name.eq_ignore_ascii_case(type_name))
    }
}

/// Validate the diagnostics pipeline declared in `store`.
///
/// Returns the resolution, or every structural error found across both
/// instance lists. A store without a `Diagnostics` section resolves to an
/// empty pipeline.
pub fn resolve_pipeline(
    store: &SettingsStore,
    catalog: &SettingsCatalog,
    registry: &PluginRegistry,
) -> Result<PluginResolution, Vec<StratusError>> {
    let mut resolution = PluginResolution::default();
    let mut errors = Vec::new();

    if !store.has_section(DIAGNOSTICS_SECTION) {
        return Ok(resolution);
    }

    let producer_names = parse_instance_list(
        store.get_str(DIAGNOSTICS_SECTION, PRODUCER_INSTANCES),
        PRODUCER_INSTANCES,
        &mut errors,
    );
    let consumer_names = parse_instance_list(
        store.get_str(DIAGNOSTICS_SECTION, CONSUMER_INSTANCES),
        CONSUMER_INSTANCES,
        &mut errors,
    );

    for name in &producer_names {
        resolve_producer(store, catalog, registry, name, &mut resolution, &mut errors);
    }
    for name in &consumer_names {
        resolve_consumer(store, catalog, registry, name, &mut resolution, &mut errors);
    }

    debug!(
        producers = resolution.producers.len(),
        consumers = resolution.consumers.len(),
        errors = errors.len(),
        "diagnostics pipeline resolved"
    );

    if errors.is_empty() {
        Ok(resolution)
    } else {
        Err(errors)
    }
}

/// Split a comma-separated instance list: entries are trimmed, must be
/// non-empty, and may not repeat (exact match). Each duplicate name is
/// reported once.
fn parse_instance_list(
    raw: Option<&str>,
    list_name: &str,
    errors: &mut Vec<StratusError>,
) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut names = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            errors.push(StratusError::Validation {
                message: format!("`{list_name}` contains an empty instance name"),
            });
            continue;
        }
        if !seen.insert(entry.to_string()) {
            if reported.insert(entry.to_string()) {
                errors.push(StratusError::DuplicateInstance {
                    name: entry.to_string(),
                });
            }
            continue;
        }
        names.push(entry.to_string());
    }
    names
}

fn resolve_producer(
    store: &SettingsStore,
    catalog: &SettingsCatalog,
    registry: &PluginRegistry,
    instance: &str,
    resolution: &mut PluginResolution,
    errors: &mut Vec<StratusError>,
) {
    let Some(section) = claim_instance_section(store, catalog, instance, resolution, errors)
    else {
        return;
    };

    let Some(type_name) = section.get(PRODUCER_TYPE).map(|v| v.as_str().to_string()) else {
        errors.push(StratusError::Validation {
            message: format!("producer instance `{instance}` is missing `{PRODUCER_TYPE}`"),
        });
        return;
    };
    let Some(entry) = registry
        .resolve(&type_name)
        .filter(|e| e.role() == PluginRole::Producer)
    else {
        errors.push(StratusError::UnsupportedType {
            instance: instance.to_string(),
            type_name,
        });
        return;
    };

    let validator_enabled = match entry.load(instance) {
        Ok(validator) => run_validator(section, entry, validator, errors),
        Err(e) => {
            // A load failure short-circuits only this instance.
            errors.push(e);
            return;
        }
    };
    let is_enabled = validator_enabled && section_enabled(section, errors);

    resolution.producers.push(PluginInstance {
        instance: instance.to_string(),
        type_name: entry.type_name().to_string(),
        is_enabled,
    });
}

fn resolve_consumer(
    store: &SettingsStore,
    catalog: &SettingsCatalog,
    registry: &PluginRegistry,
    instance: &str,
    resolution: &mut PluginResolution,
    errors: &mut Vec<StratusError>,
) {
    let Some(section) = claim_instance_section(store, catalog, instance, resolution, errors)
    else {
        return;
    };

    let Some(type_name) = section.get(CONSUMER_TYPE).map(|v| v.as_str().to_string()) else {
        errors.push(StratusError::Validation {
            message: format!("consumer instance `{instance}` is missing `{CONSUMER_TYPE}`"),
        });
        return;
    };

    let entry = match registry
        .resolve(&type_name)
        .filter(|e| e.role() == PluginRole::Consumer)
    {
        Some(entry) => entry,
        None => {
            // Not a registered type name: try the fully-custom-type path,
            // where a manifest section named after the type declares the
            // implementation identity.
            match resolve_custom_type(store, registry, instance, &type_name, resolution, errors) {
                Some(entry) => entry,
                None => return,
            }
        }
    };

    let validator_enabled = match entry.load(instance) {
        Ok(validator) => run_validator(section, entry, validator, errors),
        Err(e) => {
            errors.push(e);
            return;
        }
    };
    let is_enabled = validator_enabled && section_enabled(section, errors);

    if is_enabled {
        check_producer_reference(section, registry, instance, entry, resolution, errors);
        capture_store_accessors(section, entry.type_name(), resolution);
    }

    resolution.consumers.push(PluginInstance {
        instance: instance.to_string(),
        type_name: entry.type_name().to_string(),
        is_enabled,
    });
}

/// Shared preamble for both roles: the instance name must not collide with a
/// catalog section, must have a manifest section, and its section is recorded
/// as plugin-owned.
fn claim_instance_section<'s>(
    store: &'s SettingsStore,
    catalog: &SettingsCatalog,
    instance: &str,
    resolution: &mut PluginResolution,
    errors: &mut Vec<StratusError>,
) -> Option<&'s StoreSection> {
    if catalog.has_section(instance) {
        errors.push(StratusError::ConflictingSectionName {
            instance: instance.to_string(),
        });
        return None;
    }
    let Some(section) = store.get_section(instance) else {
        errors.push(StratusError::MissingSection {
            instance: instance.to_string(),
        });
        return None;
    };
    resolution
        .plugin_owned_sections
        .insert(section.name().to_string());
    Some(section)
}

/// Resolve a custom consumer type: its section is validated for allowed
/// parameter names, recorded as plugin-owned, and its `ImplementationId`
/// must name a registered consumer implementation.
fn resolve_custom_type<'r>(
    store: &SettingsStore,
    registry: &'r PluginRegistry,
    instance: &str,
    type_name: &str,
    resolution: &mut PluginResolution,
    errors: &mut Vec<StratusError>,
) -> Option<&'r PluginTypeEntry> {
    let Some(type_section) = store.get_section(type_name) else {
        errors.push(StratusError::UnsupportedType {
            instance: instance.to_string(),
            type_name: type_name.to_string(),
        });
        return None;
    };
    resolution
        .plugin_owned_sections
        .insert(type_section.name().to_string());

    let mut implementation_id = None;
    for (name, value) in type_section.parameters() {
        if name.eq_ignore_ascii_case(IMPLEMENTATION_ID) {
            implementation_id = Some(value.as_str().to_string());
        } else if !name.eq_ignore_ascii_case(IS_ENABLED) {
            errors.push(StratusError::Validation {
                message: format!(
                    "custom type section `{}`: parameter `{name}` is not allowed",
                    type_section.name()
                ),
            });
        }
    }

    let Some(implementation_id) = implementation_id else {
        errors.push(StratusError::Validation {
            message: format!(
                "custom type section `{type_name}` is missing `{IMPLEMENTATION_ID}`"
            ),
        });
        return None;
    };

    match registry.resolve(&implementation_id) {
        Some(entry) if entry.role() == PluginRole::Consumer => Some(entry),
        _ => {
            errors.push(StratusError::UnsupportedType {
                instance: instance.to_string(),
                type_name: implementation_id,
            });
            None
        }
    }
}

/// Partition the section's parameters into standard and custom, split custom
/// by the manifest encryption flag, and hand both maps to the validator.
/// Returns the validator's own enabled flag.
fn run_validator(
    section: &StoreSection,
    entry: &PluginTypeEntry,
    mut validator: Box<dyn crate::registry::PluginValidator>,
    errors: &mut Vec<StratusError>,
) -> bool {
    let mut plain = BTreeMap::new();
    let mut encrypted = BTreeMap::new();
    for (name, value) in section.parameters() {
        if entry.is_standard_param(name) {
            continue;
        }
        if value.is_encrypted() {
            encrypted.insert(name.to_string(), value.raw().to_string());
        } else {
            plain.insert(name.to_string(), value.raw().to_string());
        }
    }

    if let Err(e) = validator.validate(section.name(), &plain, &encrypted) {
        errors.push(e);
    }
    validator.is_enabled()
}

/// Read the section's `IsEnabled` flag; absent means enabled.
fn section_enabled(section: &StoreSection, errors: &mut Vec<StratusError>) -> bool {
    match section.get(IS_ENABLED) {
        None => true,
        Some(value) => match value.as_bool() {
            Some(flag) => flag,
            None => {
                errors.push(StratusError::Validation {
                    message: format!(
                        "section `{}`: `{IS_ENABLED}` must be true or false, found `{}`",
                        section.name(),
                        value.as_str()
                    ),
                });
                false
            }
        },
    }
}

/// An enabled consumer must reference an already-validated producer; when
/// both types are standard the pair must be in the compatibility relation.
fn check_producer_reference(
    section: &StoreSection,
    registry: &PluginRegistry,
    instance: &str,
    entry: &PluginTypeEntry,
    resolution: &PluginResolution,
    errors: &mut Vec<StratusError>,
) {
    let Some(producer_ref) = section.get(PRODUCER_INSTANCE).map(TypedValue::as_str) else {
        errors.push(StratusError::Validation {
            message: format!(
                "enabled consumer `{instance}` must reference a producer via `{PRODUCER_INSTANCE}`"
            ),
        });
        return;
    };

    let Some(producer) = resolution
        .producers
        .iter()
        .find(|p| p.instance.eq_ignore_ascii_case(producer_ref))
    else {
        errors.push(StratusError::Validation {
            message: format!(
                "consumer `{instance}` references unknown producer instance `{producer_ref}`"
            ),
        });
        return;
    };

    let producer_is_standard = registry
        .resolve(&producer.type_name)
        .is_some_and(PluginTypeEntry::is_standard);
    if entry.is_standard()
        && producer_is_standard
        && !compat::is_compatible_pair(&producer.type_name, entry.type_name())
    {
        errors.push(StratusError::IncompatiblePair {
            producer: producer.instance.clone(),
            producer_type: producer.type_name.clone(),
            consumer: instance.to_string(),
            consumer_type: entry.type_name().to_string(),
        });
    }
}

/// Remember the connection strings and containers runtime consumers ask for.
fn capture_store_accessors(
    section: &StoreSection,
    type_name: &str,
    resolution: &mut PluginResolution,
) {
    if type_name.eq_ignore_ascii_case(FILE_SHARE_ETW_CSV) {
        resolution.file_store_connection_string = section.get(STORE_CONNECTION_STRING).cloned();
    } else if type_name.eq_ignore_ascii_case(AZURE_TABLE_ETW) {
        resolution.table_store_connection_string = section.get(STORE_CONNECTION_STRING).cloned();
    } else if type_name.eq_ignore_ascii_case(AZURE_BLOB_ETW_CSV) {
        resolution.log_container = section.get(CONTAINER_NAME).map(|v| v.as_str().to_string());
    } else if type_name.eq_ignore_ascii_case(AZURE_BLOB_FOLDER) {
        resolution.crash_dump_container =
            section.get(CONTAINER_NAME).map(|v| v.as_str().to_string());
    }
}
