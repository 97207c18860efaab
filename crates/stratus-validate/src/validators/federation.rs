// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lease and heartbeat timing checks for the federation layer.

use stratus_core::StratusError;
use stratus_settings::SettingsStore;

use crate::registry::SectionValidator;
use crate::validators::require_duration_secs;

const SECTION: &str = "Federation";

/// Longest lease the membership protocol tolerates before failure detection
/// degrades.
const MAX_LEASE_SECS: f64 = 300.0;

/// Validates federation lease timing.
pub struct FederationValidator;

impl SectionValidator for FederationValidator {
    fn section_name(&self) -> &str {
        SECTION
    }

    fn validate(&self, store: &SettingsStore) -> Result<(), StratusError> {
        let lease = require_duration_secs(store, SECTION, "LeaseDuration")?;
        let heartbeat = require_duration_secs(store, SECTION, "HeartbeatInterval")?;

        if lease <= 0.0 || lease > MAX_LEASE_SECS {
            return Err(StratusError::Validation {
                message: format!(
                    "`{SECTION}/LeaseDuration` must be in (0, {MAX_LEASE_SECS}] seconds, got {lease}"
                ),
            });
        }
        if lease <= heartbeat * 2.0 {
            return Err(StratusError::Validation {
                message: format!(
                    "`{SECTION}/LeaseDuration` ({lease}s) must exceed twice \
                     `{SECTION}/HeartbeatInterval` ({heartbeat}s)"
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_catalog::SettingsCatalog;
    use stratus_core::manifest::{ClusterManifest, ManifestSection};

    fn catalog() -> SettingsCatalog {
        SettingsCatalog::parse(
            "\
Federation,LeaseDuration,duration,FromSeconds(30),Dynamic,Public
Federation,HeartbeatInterval,duration,FromSeconds(5),Dynamic,Internal
",
        )
        .unwrap()
    }

    #[test]
    fn defaults_validate() {
        let store = SettingsStore::merge(&catalog(), &ClusterManifest::default()).unwrap();
        assert!(FederationValidator.validate(&store).is_ok());
    }

    #[test]
    fn lease_above_cap_is_invalid() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Federation").with_param("LeaseDuration", "301"),
        ]);
        let store = SettingsStore::merge(&catalog(), &manifest).unwrap();
        assert!(FederationValidator.validate(&store).is_err());
    }

    #[test]
    fn lease_must_exceed_twice_the_heartbeat() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Federation")
                .with_param("LeaseDuration", "10")
                .with_param("HeartbeatInterval", "5"),
        ]);
        let store = SettingsStore::merge(&catalog(), &manifest).unwrap();
        let err = FederationValidator.validate(&store).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }
}
