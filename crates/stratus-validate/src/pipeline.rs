// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end validation orchestration.
//!
//! Order matters: the manifest merges against the catalog first, then the
//! diagnostics plugin resolver runs and claims its sections, and only then
//! does the generic section pass execute -- plugin-owned sections are already
//! excluded by the time it looks.

use stratus_catalog::SettingsCatalog;
use stratus_core::manifest::ClusterManifest;
use stratus_core::{CipherContext, StratusError};
use stratus_diagnostics::{resolve_pipeline, PluginRegistry, PluginResolution};
use stratus_settings::SettingsStore;
use stratus_upgrade::{SettingsSnapshot, UpgradeDiff, UpgradeDiffEngine};
use tracing::debug;

use crate::registry::ValidatorRegistry;

/// A merged and fully validated configuration.
#[derive(Debug)]
pub struct ValidatedSettings {
    /// The merged store, with plugin-owned sections marked.
    pub store: SettingsStore,
    /// The resolved diagnostics pipeline.
    pub diagnostics: PluginResolution,
}

impl ValidatedSettings {
    /// Snapshot view for the upgrade diff engine.
    pub fn snapshot<'a>(
        &'a self,
        manifest: &'a ClusterManifest,
        catalog: &'a SettingsCatalog,
    ) -> SettingsSnapshot<'a> {
        SettingsSnapshot {
            store: &self.store,
            manifest,
            catalog,
        }
    }
}

/// Merge and validate one configuration.
///
/// Merge errors are fatal and returned alone; diagnostics resolution errors
/// are returned as the complete batch the resolver accumulated.
pub fn validate_configuration(
    catalog: &SettingsCatalog,
    manifest: &ClusterManifest,
    registry: &ValidatorRegistry,
    plugins: &PluginRegistry,
) -> Result<ValidatedSettings, Vec<StratusError>> {
    let mut store = SettingsStore::merge(catalog, manifest).map_err(|e| vec![e])?;

    let diagnostics = resolve_pipeline(&store, catalog, plugins)?;
    for section in &diagnostics.plugin_owned_sections {
        store.mark_plugin_owned(section);
    }

    registry.validate_all(&store).map_err(|e| vec![e])?;

    debug!(
        parameters = store.parameter_count(),
        diagnostics_enabled = diagnostics.is_enabled(),
        "configuration validated"
    );
    Ok(ValidatedSettings { store, diagnostics })
}

/// Upgrade preflight: classify every changed parameter, then give each
/// section validator its chance to vet the pair.
pub fn validate_upgrade(
    engine: &mut UpgradeDiffEngine,
    current: SettingsSnapshot<'_>,
    target: SettingsSnapshot<'_>,
    node_type_filter: Option<&str>,
    ctx: &dyn CipherContext,
    registry: &ValidatorRegistry,
) -> Result<UpgradeDiff, StratusError> {
    let diff = engine.compare(current, target, node_type_filter, ctx)?;
    registry.validate_upgrade_all(current.store, target.store)?;
    Ok(diff)
}
