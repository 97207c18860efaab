// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The section-validator capability and its registry.

use stratus_core::StratusError;
use stratus_settings::SettingsStore;

use crate::validators;

/// Per-domain validation capability, dispatched by section name.
///
/// A validator may emit any number of warnings through `tracing` before
/// raising; raising is reserved for genuinely invalid states and stops the
/// pass.
pub trait SectionValidator {
    /// The section this validator owns.
    fn section_name(&self) -> &str;

    /// Validate a merged store.
    fn validate(&self, store: &SettingsStore) -> Result<(), StratusError>;

    /// Vet an upgrade pair. Most sections have nothing to add beyond the
    /// policy classification and keep the default.
    fn validate_upgrade(
        &self,
        _current: &SettingsStore,
        _target: &SettingsStore,
    ) -> Result<(), StratusError> {
        Ok(())
    }
}

/// Explicit registration table of section validators.
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn SectionValidator>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl ValidatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Registry with every standard validator, in dispatch order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(validators::failover::FailoverManagerValidator));
        registry.register(Box::new(validators::cluster_manager::ClusterManagerValidator));
        registry.register(Box::new(validators::federation::FederationValidator));
        registry.register(Box::new(validators::security::SecurityValidator));
        registry.register(Box::new(validators::hosting::HostingValidator));
        registry
    }

    /// Append a validator to the dispatch order.
    pub fn register(&mut self, validator: Box<dyn SectionValidator>) {
        self.validators.push(validator);
    }

    /// Run every validator whose section exists in the store.
    ///
    /// Fail-fast: the first hard error stops the pass.
    pub fn validate_all(&self, store: &SettingsStore) -> Result<(), StratusError> {
        for validator in &self.validators {
            if store.has_section(validator.section_name()) {
                validator.validate(store)?;
            }
        }
        Ok(())
    }

    /// Run the upgrade check of every validator whose section exists in the
    /// target store.
    pub fn validate_upgrade_all(
        &self,
        current: &SettingsStore,
        target: &SettingsStore,
    ) -> Result<(), StratusError> {
        for validator in &self.validators {
            if target.has_section(validator.section_name()) {
                validator.validate_upgrade(current, target)?;
            }
        }
        Ok(())
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_catalog::SettingsCatalog;
    use stratus_core::manifest::ClusterManifest;

    /// Validator that fails on demand, to observe dispatch decisions.
    struct Failing {
        section: &'static str,
        on_validate: bool,
        on_upgrade: bool,
    }

    impl SectionValidator for Failing {
        fn section_name(&self) -> &str {
            self.section
        }

        fn validate(&self, _store: &SettingsStore) -> Result<(), StratusError> {
            if self.on_validate {
                Err(StratusError::Validation {
                    message: format!("{} is invalid", self.section),
                })
            } else {
                Ok(())
            }
        }

        fn validate_upgrade(
            &self,
            _current: &SettingsStore,
            _target: &SettingsStore,
        ) -> Result<(), StratusError> {
            if self.on_upgrade {
                Err(StratusError::Validation {
                    message: format!("{} rejects the upgrade", self.section),
                })
            } else {
                Ok(())
            }
        }
    }

    fn store_with(sections: &str) -> SettingsStore {
        let catalog = SettingsCatalog::parse(sections).unwrap();
        SettingsStore::merge(&catalog, &ClusterManifest::default()).unwrap()
    }

    #[test]
    fn validators_run_only_for_present_sections() {
        let store = store_with("Alpha,Key,int,1,Dynamic,Public\n");
        let mut registry = ValidatorRegistry::new();
        registry.register(Box::new(Failing {
            section: "Beta",
            on_validate: true,
            on_upgrade: false,
        }));
        // Beta's section is absent, so its failing validate never runs.
        registry.validate_all(&store).unwrap();
    }

    #[test]
    fn first_hard_error_stops_the_pass() {
        let store = store_with(
            "Alpha,Key,int,1,Dynamic,Public\nBeta,Key,int,1,Dynamic,Public\n",
        );
        let mut registry = ValidatorRegistry::new();
        registry.register(Box::new(Failing {
            section: "Alpha",
            on_validate: true,
            on_upgrade: false,
        }));
        registry.register(Box::new(Failing {
            section: "Beta",
            on_validate: true,
            on_upgrade: false,
        }));
        let err = registry.validate_all(&store).unwrap_err();
        assert!(err.to_string().contains("Alpha"));
    }

    #[test]
    fn upgrade_pass_keys_off_the_target_store() {
        let current = store_with(
            "Alpha,Key,int,1,Dynamic,Public\nBeta,Key,int,1,Dynamic,Public\n",
        );
        let target = store_with("Alpha,Key,int,1,Dynamic,Public\n");
        let mut registry = ValidatorRegistry::new();
        registry.register(Box::new(Failing {
            section: "Beta",
            on_validate: false,
            on_upgrade: true,
        }));
        // Beta is absent from the target store, so its upgrade check is skipped.
        registry.validate_upgrade_all(&current, &target).unwrap();
        // Present in the target: now it runs and rejects.
        assert!(registry.validate_upgrade_all(&target, &current).is_err());
    }

    #[test]
    fn standard_registry_is_populated() {
        let registry = ValidatorRegistry::standard();
        assert_eq!(registry.len(), 5);
    }
}
