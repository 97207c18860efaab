// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end merge tests against the packaged catalog.

use stratus_catalog::SettingsCatalog;
use stratus_core::manifest::{ClusterManifest, ManifestSection};
use stratus_core::{StratusError, UpgradePolicy};
use stratus_settings::SettingsStore;

#[test]
fn empty_manifest_merges_every_packaged_default() {
    let catalog = SettingsCatalog::load_builtin().unwrap();
    let store = SettingsStore::merge(&catalog, &ClusterManifest::default()).unwrap();

    // Every fixed descriptor is seeded with its evaluated default.
    assert_eq!(store.get_i64("FailoverManager", "TargetReplicaSetSize"), Some(7));
    assert_eq!(store.get_duration_secs("Federation", "LeaseDuration"), Some(30.0));
    assert_eq!(
        store.get_parameter("Federation", "MaxMessageSize").unwrap().as_u64(),
        Some(4 * 1024 * 1024)
    );
    assert_eq!(store.get_str("Security", "ClusterCredentialType"), Some("None"));

    for section in store.iter() {
        for (_, value) in section.parameters() {
            assert!(!value.is_from_manifest());
        }
    }
}

#[test]
fn packaged_duration_products_reduce_to_seconds() {
    let catalog = SettingsCatalog::load_builtin().unwrap();
    let store = SettingsStore::merge(&catalog, &ClusterManifest::default()).unwrap();

    // FromTicks(300*10000000) is five minutes of 100ns ticks.
    assert_eq!(store.get_duration_secs("Federation", "MessageTimeToLive"), Some(300.0));
    // FromMilliseconds(500*1000) is 500 seconds.
    assert_eq!(store.get_duration_secs("Hosting", "CacheCleanupScanInterval"), Some(500.0));
}

#[test]
fn overrides_and_defaults_coexist() {
    let catalog = SettingsCatalog::load_builtin().unwrap();
    let manifest = ClusterManifest::with_sections(vec![
        ManifestSection::new("FailoverManager").with_param("TargetReplicaSetSize", "9"),
        ManifestSection::new("Votes").with_param("node0", "SeedNode"),
    ]);
    let store = SettingsStore::merge(&catalog, &manifest).unwrap();

    let overridden = store.get_parameter("FailoverManager", "TargetReplicaSetSize").unwrap();
    assert_eq!(overridden.as_i64(), Some(9));
    assert!(overridden.is_from_manifest());
    assert_eq!(overridden.upgrade_policy(), UpgradePolicy::Static);

    let untouched = store.get_parameter("FailoverManager", "MinReplicaSetSize").unwrap();
    assert_eq!(untouched.as_i64(), Some(3));
    assert!(!untouched.is_from_manifest());
}

#[test]
fn section_absent_from_catalog_and_allow_list_fails() {
    let catalog = SettingsCatalog::load_builtin().unwrap();
    let manifest = ClusterManifest::with_sections(vec![
        ManifestSection::new("TotallyMadeUp").with_param("Key", "Value"),
    ]);
    assert!(matches!(
        SettingsStore::merge(&catalog, &manifest).unwrap_err(),
        StratusError::UnknownSection { .. }
    ));
}

#[test]
fn packaged_property_group_sections_accept_user_keys() {
    let catalog = SettingsCatalog::load_builtin().unwrap();
    let manifest = ClusterManifest::with_sections(vec![
        ManifestSection::new("NodeBufferPercentage").with_param("Memory", "0.15"),
    ]);
    let store = SettingsStore::merge(&catalog, &manifest).unwrap();
    let value = store.get_parameter("NodeBufferPercentage", "Memory").unwrap();
    assert_eq!(value.as_f64(), Some(0.15));
}
