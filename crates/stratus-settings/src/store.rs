// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The merge engine: catalog defaults + manifest overrides -> typed store.

use std::collections::{HashMap, HashSet};

use stratus_catalog::SettingsCatalog;
use stratus_core::manifest::ClusterManifest;
use stratus_core::{StratusError, TypedValue, UpgradePolicy, ValueKind};
use tracing::{debug, warn};

use crate::sections;

/// Section holding the diagnostics pipeline's instance lists.
const DIAGNOSTICS_SECTION: &str = "Diagnostics";
/// Comma-separated producer instance list parameter.
const PRODUCER_INSTANCES: &str = "ProducerInstances";
/// Comma-separated consumer instance list parameter.
const CONSUMER_INSTANCES: &str = "ConsumerInstances";
/// Consumer type declaration inside an instance section.
const CONSUMER_TYPE: &str = "ConsumerType";

/// How strictly the merge treats parameters with no catalog descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Unknown parameters in validated sections are fatal.
    Strict,
    /// Relaxed cross-version inspection: unknown parameters are admitted as
    /// untyped dynamic values so an older build can read a newer manifest.
    Inspect,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    /// Parameter name in its original spelling.
    name: String,
    value: TypedValue,
}

/// One merged section: name -> value, keyed case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSection {
    name: String,
    parameters: HashMap<String, Entry>,
}

impl StoreSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: HashMap::new(),
        }
    }

    /// Section name in its catalog (or manifest) spelling.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a parameter value, case-insensitively.
    pub fn get(&self, parameter: &str) -> Option<&TypedValue> {
        self.parameters.get(&fold(parameter)).map(|e| &e.value)
    }

    /// Iterate `(name, value)` pairs in arbitrary order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.parameters.values().map(|e| (e.name.as_str(), &e.value))
    }

    /// Number of parameters in the section.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the section holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// The merged, typed settings store.
///
/// Invariant: every parameter is either catalog-derived or lives in an
/// explicitly validation-disabled section. Sections claimed by a diagnostics
/// plugin are marked plugin-owned and excluded from generic per-parameter
/// checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    sections: HashMap<String, StoreSection>,
    plugin_owned: HashSet<String>,
}

impl SettingsStore {
    /// Merge with [`MergeMode::Strict`].
    pub fn merge(
        catalog: &SettingsCatalog,
        manifest: &ClusterManifest,
    ) -> Result<Self, StratusError> {
        Self::merge_with_mode(catalog, manifest, MergeMode::Strict)
    }

    /// Merge catalog defaults with manifest overrides.
    ///
    /// Seeds every fixed catalog descriptor, then applies manifest sections:
    /// reserved names are rejected, unknown sections must be on an allow-list,
    /// property-group sections mint descriptors from their template, and every
    /// merged value must parse per its declared type.
    pub fn merge_with_mode(
        catalog: &SettingsCatalog,
        manifest: &ClusterManifest,
        mode: MergeMode,
    ) -> Result<Self, StratusError> {
        let mut store = Self::default();

        for section in catalog.sections() {
            for desc in section.parameters() {
                store.put(
                    section.name(),
                    &desc.name,
                    TypedValue::from_catalog(&desc.default_value, desc.kind, desc.upgrade_policy),
                );
            }
        }

        // Sections named by the diagnostics instance lists are admitted here
        // and validated later by the plugin resolver.
        let plugin_candidates = diagnostics_candidates(manifest);

        for msection in &manifest.sections {
            store.apply_manifest_section(catalog, msection, mode, &plugin_candidates)?;
        }

        store.check_types(&plugin_candidates)?;

        debug!(
            sections = store.sections.len(),
            parameters = store.parameter_count(),
            "settings store merged"
        );
        Ok(store)
    }

    fn apply_manifest_section(
        &mut self,
        catalog: &SettingsCatalog,
        msection: &stratus_core::manifest::ManifestSection,
        mode: MergeMode,
        plugin_candidates: &HashSet<String>,
    ) -> Result<(), StratusError> {
        let section_name = msection.name.as_str();
        if sections::is_reserved(section_name) {
            return Err(StratusError::InvalidSection {
                section: section_name.to_string(),
                reason: "the name is synthesized for per-node-type upgrade records".to_string(),
            });
        }

        let catalog_section = catalog.get_section(section_name);
        let disabled = sections::is_validation_disabled(section_name)
            || plugin_candidates.contains(&fold(section_name));
        if catalog_section.is_none() && !disabled {
            return Err(StratusError::UnknownSection {
                section: section_name.to_string(),
                suggestion: sections::suggest(section_name, catalog.section_names()),
            });
        }

        // Prefer the catalog's spelling for display when the section is known.
        let display_name = catalog_section.map_or(section_name, |s| s.name()).to_string();
        let template = catalog_section.and_then(|s| s.property_group_template()).cloned();

        for param in &msection.parameters {
            let (kind, policy) = if let Some(desc) = catalog.get(section_name, &param.name) {
                if desc.deprecated() {
                    warn!(
                        section = display_name.as_str(),
                        parameter = param.name.as_str(),
                        "deprecated parameter overridden by the cluster manifest"
                    );
                }
                (desc.kind, desc.upgrade_policy)
            } else if let Some(template) = &template {
                (template.kind, template.upgrade_policy)
            } else if disabled || mode == MergeMode::Inspect {
                (ValueKind::String, UpgradePolicy::Dynamic)
            } else {
                let known = catalog_section
                    .map(|s| s.parameters().map(|d| d.name.clone()).collect::<Vec<_>>())
                    .unwrap_or_default();
                return Err(StratusError::UnknownParameter {
                    section: display_name,
                    name: param.name.clone(),
                    suggestion: sections::suggest(
                        &param.name,
                        known.iter().map(String::as_str),
                    ),
                });
            };

            self.put(
                &display_name,
                &param.name,
                TypedValue::from_manifest(&param.value, kind, policy, param.is_encrypted),
            );
        }
        Ok(())
    }

    /// Second pass: every value outside validation-disabled sections must
    /// parse per its declared kind.
    fn check_types(&self, plugin_candidates: &HashSet<String>) -> Result<(), StratusError> {
        for section in self.sections.values() {
            if sections::is_validation_disabled(&section.name)
                || plugin_candidates.contains(&fold(&section.name))
            {
                continue;
            }
            for entry in section.parameters.values() {
                if !entry.value.is_well_typed() {
                    return Err(StratusError::InvalidValue {
                        section: section.name.clone(),
                        parameter: entry.name.clone(),
                        kind: entry.value.kind(),
                        value: entry.value.raw().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn put(&mut self, section_display: &str, param_display: &str, value: TypedValue) {
        let section = self
            .sections
            .entry(fold(section_display))
            .or_insert_with(|| StoreSection::new(section_display));
        section.parameters.insert(
            fold(param_display),
            Entry {
                name: param_display.to_string(),
                value,
            },
        );
    }

    /// Look up a section, case-insensitively.
    pub fn get_section(&self, section: &str) -> Option<&StoreSection> {
        self.sections.get(&fold(section))
    }

    /// Look up one value, case-insensitively at both levels.
    pub fn get_parameter(&self, section: &str, parameter: &str) -> Option<&TypedValue> {
        self.get_section(section)?.get(parameter)
    }

    /// Whether the store holds the section.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&fold(section))
    }

    /// Iterate every merged section.
    pub fn iter(&self) -> impl Iterator<Item = &StoreSection> {
        self.sections.values()
    }

    /// Iterate section names in their display spelling.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.values().map(|s| s.name.as_str())
    }

    /// Total number of merged parameters across all sections.
    pub fn parameter_count(&self) -> usize {
        self.sections.values().map(StoreSection::len).sum()
    }

    /// Record that a diagnostics plugin owns the section, excluding it from
    /// generic per-parameter checks and the flat upgrade diff.
    pub fn mark_plugin_owned(&mut self, section: &str) {
        self.plugin_owned.insert(fold(section));
    }

    /// Whether a diagnostics plugin owns the section.
    pub fn is_plugin_owned(&self, section: &str) -> bool {
        self.plugin_owned.contains(&fold(section))
    }

    /// Typed convenience reader: boolean parameter.
    pub fn get_bool(&self, section: &str, parameter: &str) -> Option<bool> {
        self.get_parameter(section, parameter)?.as_bool()
    }

    /// Typed convenience reader: signed integer parameter.
    pub fn get_i64(&self, section: &str, parameter: &str) -> Option<i64> {
        self.get_parameter(section, parameter)?.as_i64()
    }

    /// Typed convenience reader: duration parameter in canonical seconds.
    pub fn get_duration_secs(&self, section: &str, parameter: &str) -> Option<f64> {
        self.get_parameter(section, parameter)?.as_duration_secs()
    }

    /// Typed convenience reader: string parameter.
    pub fn get_str(&self, section: &str, parameter: &str) -> Option<&str> {
        Some(self.get_parameter(section, parameter)?.as_str())
    }
}

/// Case-insensitive key normalization used by both map levels.
fn fold(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Sections the diagnostics instance lists claim: every named producer and
/// consumer instance, plus any custom consumer-type section a consumer
/// instance declares.
fn diagnostics_candidates(manifest: &ClusterManifest) -> HashSet<String> {
    let mut candidates = HashSet::new();
    let Some(diagnostics) = manifest.section(DIAGNOSTICS_SECTION) else {
        return candidates;
    };

    for list in [PRODUCER_INSTANCES, CONSUMER_INSTANCES] {
        let Some(param) = diagnostics.parameter(list) else {
            continue;
        };
        for instance in param.value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            candidates.insert(fold(instance));

            // A consumer instance may declare a custom type backed by its own
            // manifest section.
            if let Some(type_name) = manifest
                .section(instance)
                .and_then(|s| s.parameter(CONSUMER_TYPE))
                && manifest.section(&type_name.value).is_some()
            {
                candidates.insert(fold(&type_name.value));
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_core::manifest::ManifestSection;

    fn small_catalog() -> SettingsCatalog {
        SettingsCatalog::parse(
            "\
FailoverManager,TargetReplicaSetSize,int,7,Static,Public
FailoverManager,MinReplicaSetSize,int,3,Static,Public
Federation,LeaseDuration,duration,FromSeconds(30),Dynamic,Public
Security,AllowDefaultClient,bool,false,Dynamic,Deprecated
MetricActivityThresholds,PropertyGroup,uint,0,Dynamic,Public
",
        )
        .unwrap()
    }

    #[test]
    fn catalog_default_survives_when_manifest_is_silent() {
        let store = SettingsStore::merge(&small_catalog(), &ClusterManifest::default()).unwrap();
        let value = store.get_parameter("FailoverManager", "TargetReplicaSetSize").unwrap();
        assert_eq!(value.as_i64(), Some(7));
        assert!(!value.is_from_manifest());
    }

    #[test]
    fn manifest_override_wins_and_stamps_provenance() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("FailoverManager").with_param("TargetReplicaSetSize", "9"),
        ]);
        let store = SettingsStore::merge(&small_catalog(), &manifest).unwrap();
        let value = store.get_parameter("failovermanager", "targetreplicasetsize").unwrap();
        assert_eq!(value.as_i64(), Some(9));
        assert!(value.is_from_manifest());
        assert!(!value.is_encrypted());
    }

    #[test]
    fn encrypted_flag_carries_through() {
        let catalog = SettingsCatalog::parse(
            "Management,ImageStoreConnectionString,secret,\"\",SingleChange,Public\n",
        )
        .unwrap();
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Management")
                .with_secret_param("ImageStoreConnectionString", "AQffz=="),
        ]);
        let store = SettingsStore::merge(&catalog, &manifest).unwrap();
        assert!(
            store
                .get_parameter("Management", "ImageStoreConnectionString")
                .unwrap()
                .is_encrypted()
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Federation").with_param("LeaseDuration", "45"),
            ManifestSection::new("Votes").with_param("node0", "SeedNode"),
        ]);
        let catalog = small_catalog();
        let first = SettingsStore::merge(&catalog, &manifest).unwrap();
        let second = SettingsStore::merge(&catalog, &manifest).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_section_fails_with_suggestion() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("FailoverManagr").with_param("TargetReplicaSetSize", "9"),
        ]);
        match SettingsStore::merge(&small_catalog(), &manifest).unwrap_err() {
            StratusError::UnknownSection { section, suggestion } => {
                assert_eq!(section, "FailoverManagr");
                assert_eq!(suggestion.as_deref(), Some("FailoverManager"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn disabled_section_is_admitted_without_descriptors() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Votes").with_param("node0", "SeedNode"),
            ManifestSection::new("InfrastructureService/Alpha").with_param("Anything", "goes"),
        ]);
        let store = SettingsStore::merge(&small_catalog(), &manifest).unwrap();
        assert_eq!(store.get_str("Votes", "node0"), Some("SeedNode"));
        assert!(store.has_section("InfrastructureService/Alpha"));
    }

    #[test]
    fn reserved_section_is_invalid() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("NodeProperties").with_param("HasSsd", "true"),
        ]);
        assert!(matches!(
            SettingsStore::merge(&small_catalog(), &manifest).unwrap_err(),
            StratusError::InvalidSection { .. }
        ));
    }

    #[test]
    fn unknown_parameter_fails_strict_but_not_inspect() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("FailoverManager").with_param("BrandNewKnob", "1"),
        ]);
        let catalog = small_catalog();
        assert!(matches!(
            SettingsStore::merge(&catalog, &manifest).unwrap_err(),
            StratusError::UnknownParameter { .. }
        ));

        let store =
            SettingsStore::merge_with_mode(&catalog, &manifest, MergeMode::Inspect).unwrap();
        assert_eq!(store.get_str("FailoverManager", "BrandNewKnob"), Some("1"));
    }

    #[test]
    fn unknown_parameter_suggests_close_name() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("FailoverManager").with_param("TargetReplicaSetSiz", "9"),
        ]);
        match SettingsStore::merge(&small_catalog(), &manifest).unwrap_err() {
            StratusError::UnknownParameter { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("TargetReplicaSetSize"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn property_group_section_mints_parameters_from_template() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("MetricActivityThresholds")
                .with_param("MemoryInMB", "4096")
                .with_param("CpuCores", "8"),
        ]);
        let store = SettingsStore::merge(&small_catalog(), &manifest).unwrap();
        let value = store.get_parameter("MetricActivityThresholds", "MemoryInMB").unwrap();
        assert_eq!(value.kind(), ValueKind::Uint);
        assert_eq!(value.as_u64(), Some(4096));
        assert!(value.is_from_manifest());
    }

    #[test]
    fn property_group_value_must_match_template_type() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("MetricActivityThresholds").with_param("MemoryInMB", "lots"),
        ]);
        assert!(matches!(
            SettingsStore::merge(&small_catalog(), &manifest).unwrap_err(),
            StratusError::InvalidValue { .. }
        ));
    }

    #[test]
    fn ill_typed_value_names_section_parameter_and_value() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("FailoverManager").with_param("TargetReplicaSetSize", "seven"),
        ]);
        match SettingsStore::merge(&small_catalog(), &manifest).unwrap_err() {
            StratusError::InvalidValue { section, parameter, value, .. } => {
                assert_eq!(section, "FailoverManager");
                assert_eq!(parameter, "TargetReplicaSetSize");
                assert_eq!(value, "seven");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_duration_is_rejected() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Federation").with_param("LeaseDuration", "-1"),
        ]);
        assert!(matches!(
            SettingsStore::merge(&small_catalog(), &manifest).unwrap_err(),
            StratusError::InvalidValue { .. }
        ));
    }

    #[test]
    fn diagnostics_instance_sections_are_admitted() {
        let catalog = SettingsCatalog::parse(
            "Diagnostics,ProducerInstances,string,\"\",Dynamic,Public\n\
             Diagnostics,ConsumerInstances,string,\"\",Dynamic,Public\n",
        )
        .unwrap();
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Diagnostics")
                .with_param("ProducerInstances", "EtlProducer")
                .with_param("ConsumerInstances", "ShareUploader"),
            ManifestSection::new("EtlProducer").with_param("ProducerType", "EtlFileProducer"),
            ManifestSection::new("ShareUploader")
                .with_param("ConsumerType", "MyUploader")
                .with_param("ProducerInstance", "EtlProducer"),
            ManifestSection::new("MyUploader").with_param("ImplementationId", "my-uploader"),
        ]);
        let store = SettingsStore::merge(&catalog, &manifest).unwrap();
        assert!(store.has_section("EtlProducer"));
        assert!(store.has_section("ShareUploader"));
        // The custom consumer-type section rides along too.
        assert!(store.has_section("MyUploader"));
    }

    #[test]
    fn plugin_owned_marking_round_trips() {
        let mut store = SettingsStore::merge(&small_catalog(), &ClusterManifest::default()).unwrap();
        store.mark_plugin_owned("EtlProducer");
        assert!(store.is_plugin_owned("etlproducer"));
        assert!(!store.is_plugin_owned("Federation"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn deprecated_override_warns_but_merges() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Security").with_param("AllowDefaultClient", "true"),
        ]);
        let store = SettingsStore::merge(&small_catalog(), &manifest).unwrap();
        assert_eq!(store.get_bool("Security", "AllowDefaultClient"), Some(true));
        assert!(logs_contain("deprecated parameter overridden"));
    }
}
