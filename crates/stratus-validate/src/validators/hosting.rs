// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run-as policy dependency checks for the hosting subsystem.

use stratus_core::StratusError;
use stratus_settings::SettingsStore;

use crate::registry::SectionValidator;

const SECTION: &str = "Hosting";
const INFRASTRUCTURE_SERVICE: &str = "InfrastructureService";

/// Validates hosting settings against the services that depend on them.
///
/// Infrastructure service instances run under managed accounts, which
/// requires the run-as policy to be active.
pub struct HostingValidator;

impl SectionValidator for HostingValidator {
    fn section_name(&self) -> &str {
        SECTION
    }

    fn validate(&self, store: &SettingsStore) -> Result<(), StratusError> {
        if store.get_bool(SECTION, "RunAsPolicyEnabled") == Some(true) {
            return Ok(());
        }

        let infrastructure_prefix = format!("{INFRASTRUCTURE_SERVICE}/").to_ascii_lowercase();
        let has_infrastructure = store.section_names().any(|name| {
            name.eq_ignore_ascii_case(INFRASTRUCTURE_SERVICE)
                || name.to_ascii_lowercase().starts_with(&infrastructure_prefix)
        });
        if has_infrastructure {
            return Err(StratusError::Validation {
                message: format!(
                    "`{SECTION}/RunAsPolicyEnabled` must be true when \
                     `{INFRASTRUCTURE_SERVICE}` is configured"
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
        SettingsCatalog::parse("Hosting,RunAsPolicyEnabled,bool,false,Static,Public\n").unwrap()
    }

    #[test]
    fn no_infrastructure_service_validates() {
        let store = SettingsStore::merge(&catalog(), &ClusterManifest::default()).unwrap();
        assert!(HostingValidator.validate(&store).is_ok());
    }

    #[test]
    fn infrastructure_instance_requires_run_as() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("InfrastructureService/Alpha").with_param("Anything", "goes"),
        ]);
        let store = SettingsStore::merge(&catalog(), &manifest).unwrap();
        let err = HostingValidator.validate(&store).unwrap_err();
        assert!(err.to_string().contains("RunAsPolicyEnabled"));
    }

    #[test]
    fn run_as_enabled_allows_infrastructure_instances() {
        let manifest = ClusterManifest::with_sections(vec![
            ManifestSection::new("Hosting").with_param("RunAsPolicyEnabled", "true"),
            ManifestSection::new("InfrastructureService/Alpha").with_param("Anything", "goes"),
        ]);
        let store = SettingsStore::merge(&catalog(), &manifest).unwrap();
        assert!(HostingValidator.validate(&store).is_ok());
    }
}
