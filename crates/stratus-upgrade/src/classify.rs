// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upgrade-policy classification.
//!
//! Every enumerated change resolves to its governing descriptor and branches
//! on upgrade policy. Violations accumulate across the whole enumeration so
//! one preflight reports every offending parameter; only the aggregate
//! NotAllowed/SingleChange outcome fails the comparison.

use std::collections::{BTreeSet, HashSet};

use stratus_catalog::SettingsCatalog;
use stratus_core::manifest::ClusterManifest;
use stratus_core::{CipherContext, StratusError, TypedValue, UpgradePolicy};
use stratus_settings::{sections, SettingsStore};
use tracing::{debug, info, warn};

use crate::diff::{self, ChangeKey};

/// One side of an upgrade comparison: a validated store plus the manifest
/// and catalog it was merged from.
#[derive(Debug, Clone, Copy)]
pub struct SettingsSnapshot<'a> {
    /// The merged, validated store.
    pub store: &'a SettingsStore,
    /// The manifest the store was merged from, for node-type records.
    pub manifest: &'a ClusterManifest,
    /// The catalog the store was merged against.
    pub catalog: &'a SettingsCatalog,
}

/// The outcome of a successful comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeDiff {
    /// Every (section, parameter) whose change requires a process restart.
    pub requires_restart: BTreeSet<ChangeKey>,
}

impl UpgradeDiff {
    /// Whether the pair is in the restart set.
    pub fn requires_restart_of(&self, section: &str, parameter: &str) -> bool {
        self.requires_restart
            .iter()
            .any(|c| c.section.eq_ignore_ascii_case(section)
                && c.parameter.eq_ignore_ascii_case(parameter))
    }

    /// Whether the upgrade can apply with no restart at all.
    pub fn is_fully_dynamic(&self) -> bool {
        self.requires_restart.is_empty()
    }
}

/// The diff engine. Stateful across comparisons: it remembers which
/// SingleChange parameters have already consumed their one allowed
/// transition, so a second observed transition is a violation.
#[derive(Debug, Default)]
pub struct UpgradeDiffEngine {
    applied_single_changes: HashSet<String>,
}

impl UpgradeDiffEngine {
    /// Fresh engine with no transitions consumed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against `target` and classify every change.
    ///
    /// Returns the restart set, or the aggregate rejection once every change
    /// has been enumerated: any NotAllowed change outranks SingleChange
    /// violations; both list every offending key.
    pub fn compare(
        &mut self,
        current: SettingsSnapshot<'_>,
        target: SettingsSnapshot<'_>,
        node_type_filter: Option<&str>,
        ctx: &dyn CipherContext,
    ) -> Result<UpgradeDiff, StratusError> {
        let mut changes = BTreeSet::new();
        diff::structural_diff(current.manifest, target.manifest, node_type_filter, &mut changes);
        diff::flat_diff(current.store, target.store, ctx, &mut changes)?;

        let mut restart = BTreeSet::new();
        let mut not_allowed = Vec::new();
        let mut single_change_violations = Vec::new();

        for change in changes {
            if sections::is_reserved(&change.section) {
                // Node-type records carry no catalog descriptor; a changed
                // node definition always restarts its processes.
                info!(change = %change, "node-type record changed, restart required");
                restart.insert(change);
                continue;
            }

            if sections::is_validation_disabled(&change.section) {
                if !sections::is_assumed_dynamic(&change.section) {
                    warn!(
                        change = %change,
                        "parameter changed; assumed Static since validation is disabled"
                    );
                    restart.insert(change);
                }
                continue;
            }

            let policy = resolve_policy(&change, &current, &target)?;
            debug!(change = %change, policy = %policy, "parameter changed");
            match policy {
                UpgradePolicy::Dynamic => {}
                UpgradePolicy::Static => {
                    restart.insert(change);
                }
                UpgradePolicy::SingleChange => {
                    if self.consume_single_change(&change, &current, &target) {
                        restart.insert(change);
                    } else {
                        single_change_violations.push(change.to_string());
                    }
                }
                UpgradePolicy::NotAllowed => {
                    not_allowed.push(change.to_string());
                }
            }
        }

        if !not_allowed.is_empty() {
            return Err(StratusError::UpgradeNotAllowed { changes: not_allowed });
        }
        if !single_change_violations.is_empty() {
            return Err(StratusError::SingleChangeViolation {
                changes: single_change_violations,
            });
        }
        Ok(UpgradeDiff {
            requires_restart: restart,
        })
    }

    /// A SingleChange parameter may transition once: absent <-> present, or
    /// default <-> manifest-sourced. A change that is not such a transition,
    /// or a transition already consumed by this engine, is a violation.
    fn consume_single_change(
        &mut self,
        change: &ChangeKey,
        current: &SettingsSnapshot<'_>,
        target: &SettingsSnapshot<'_>,
    ) -> bool {
        let old = current.store.get_parameter(&change.section, &change.parameter);
        let new = target.store.get_parameter(&change.section, &change.parameter);
        if !is_transition(old, new) {
            return false;
        }

        let key = change.to_string().to_ascii_lowercase();
        if self.applied_single_changes.contains(&key) {
            return false;
        }
        self.applied_single_changes.insert(key);
        true
    }
}

/// Presence or provenance transition between the two sides.
fn is_transition(old: Option<&TypedValue>, new: Option<&TypedValue>) -> bool {
    match (old, new) {
        (Some(old), Some(new)) => old.is_from_manifest() != new.is_from_manifest(),
        (None, None) => false,
        _ => true,
    }
}

/// Resolve the policy governing a changed parameter. Property-group sections
/// resolve from whichever store declares the key; everything else resolves
/// from the current store. A lookup failure is fatal, naming the pair.
fn resolve_policy(
    change: &ChangeKey,
    current: &SettingsSnapshot<'_>,
    target: &SettingsSnapshot<'_>,
) -> Result<UpgradePolicy, StratusError> {
    let property_group = current.catalog.is_property_group(&change.section)
        || target.catalog.is_property_group(&change.section);

    let value = if property_group {
        current
            .store
            .get_parameter(&change.section, &change.parameter)
            .or_else(|| target.store.get_parameter(&change.section, &change.parameter))
    } else {
        current.store.get_parameter(&change.section, &change.parameter)
    };

    value.map(TypedValue::upgrade_policy).ok_or_else(|| {
        StratusError::UnknownParameter {
            section: change.section.clone(),
            name: change.parameter.clone(),
            suggestion: None,
        }
    })
}
