// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential-type checks for the security section.

use stratus_core::StratusError;
use stratus_settings::SettingsStore;
use tracing::warn;

use crate::registry::SectionValidator;

const SECTION: &str = "Security";

const CREDENTIAL_TYPES: &[&str] = &["None", "X509", "Windows"];
const PROTECTION_LEVELS: &[&str] = &["None", "Sign", "EncryptAndSign"];

/// Validates cluster and server credential configuration.
pub struct SecurityValidator;

impl SectionValidator for SecurityValidator {
    fn validate(&self, store: &SettingsStore) -> Result<(), StratusError> {
        let cluster_type = credential_type(store, "ClusterCredentialType")?;
        credential_type(store, "ServerAuthCredentialType")?;

        if cluster_type.eq_ignore_ascii_case("None") {
            warn!("cluster runs with no node-to-node security");
            return Ok(());
        }

        let protection = store
            .get_str(SECTION, "ClusterProtectionLevel")
            .unwrap_or("EncryptAndSign");
        if !PROTECTION_LEVELS.iter().any(|p| p.eq_ignore_ascii_case(protection)) {
            return Err(StratusError::Validation {
                message: format!(
                    "`{SECTION}/ClusterProtectionLevel` must be one of {PROTECTION_LEVELS:?}, \
                     got `{protection}`"
                ),
            });
        }
        if protection.eq_ignore_ascii_case("None") {
            warn!("cluster credentials are configured but traffic is neither signed nor encrypted");
        }
        Ok(())
    }

    fn section_name(&self) -> &str {
        SECTION
    }
}

fn credential_type<'s>(
    store: &'s SettingsStore,
    parameter: &str,
) -> Result<&'s str, StratusError> {
    let value = store.get_str(SECTION, parameter).unwrap_or("None");
    if CREDENTIAL_TYPES.iter().any(|t| t.eq_ignore_ascii_case(value)) {
        Ok(value)
    } else {
        Err(StratusError::Validation {
            message: format!(
                "`{SECTION}/{parameter}` must be one of {CREDENTIAL_TYPES:?}, got `{value}`"
            ),
        })
    }
}
