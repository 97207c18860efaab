// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in validators for the standard plugin types.
//!
//! Standard types accept exactly their standard parameter set; anything the
//! resolver classifies as custom is rejected. Operator-supplied types bring
//! their own [`PluginValidator`] and may accept whatever they document.

use std::collections::BTreeMap;

use stratus_core::StratusError;

use crate::registry::{PluginRole, PluginValidator};

/// Parameters every plugin instance section may carry.
pub(crate) const COMMON_PARAMS: &[&str] =
    &["IsEnabled", "ProducerType", "ConsumerType", "ProducerInstance"];

/// The standard plugin types for this build configuration, with their
/// type-specific standard parameters.
pub(crate) fn standard_types() -> Vec<(&'static str, PluginRole, &'static [&'static str])> {
    let mut types: Vec<(&'static str, PluginRole, &'static [&'static str])> = vec![
        (
            "EtlFileProducer",
            PluginRole::Producer,
            &["EtlReadIntervalInMinutes", "DataDeletionAgeInDays", "EtlPath"],
        ),
        (
            "FolderProducer",
            PluginRole::Producer,
            &["FolderType", "FolderPath", "DataDeletionAgeInDays"],
        ),
        (
            "FileShareEtwCsvUploader",
            PluginRole::Consumer,
            &[
                "StoreConnectionString",
                "UploadIntervalInMinutes",
                "FileSyncIntervalInMinutes",
                "DataDeletionAgeInDays",
            ],
        ),
        (
            "FileShareFolderUploader",
            PluginRole::Consumer,
            &["StoreConnectionString", "UploadIntervalInMinutes", "DataDeletionAgeInDays"],
        ),
        (
            "AzureBlobEtwCsvUploader",
            PluginRole::Consumer,
            &[
                "StoreConnectionString",
                "ContainerName",
                "UploadIntervalInMinutes",
                "DataDeletionAgeInDays",
            ],
        ),
        (
            "AzureBlobFolderUploader",
            PluginRole::Consumer,
            &[
                "StoreConnectionString",
                "ContainerName",
                "UploadIntervalInMinutes",
                "DataDeletionAgeInDays",
            ],
        ),
        (
            "AzureTableEtwEventUploader",
            PluginRole::Consumer,
            &[
                "StoreConnectionString",
                "TableNamePrefix",
                "UploadIntervalInMinutes",
                "DataDeletionAgeInDays",
            ],
        ),
        (
            "MdsFileProducer",
            PluginRole::Consumer,
            &["DirectoryName", "TableName", "UploadIntervalInMinutes", "DataDeletionAgeInDays"],
        ),
    ];

    // Performance-counter collection rides on OS facilities only present on
    // Windows builds.
    if cfg!(windows) {
        types.push((
            "PerfCounterProducer",
            PluginRole::Producer,
            &["SamplingIntervalInSeconds", "DataDeletionAgeInDays"],
        ));
    }

    types
}

/// Fresh validator for a standard type.
pub(crate) fn standard_validator(type_name: &'static str) -> Box<dyn PluginValidator> {
    Box::new(StandardPluginValidator { type_name })
}

/// Validator for standard types: no custom parameters are recognized.
struct StandardPluginValidator {
    type_name: &'static str,
}

impl PluginValidator for StandardPluginValidator {
    fn validate(
        &mut self,
        section: &str,
        plain: &BTreeMap<String, String>,
        encrypted: &BTreeMap<String, String>,
    ) -> Result<(), StratusError> {
        if let Some(name) = plain.keys().chain(encrypted.keys()).next() {
            return Err(StratusError::Validation {
                message: format!(
                    "section `{section}`: parameter `{name}` is not recognized by plugin type {}",
                    self.type_name
                ),
            });
        }
        Ok(())
    }
}

/// Validator accepting any custom parameters; a convenient base for
/// operator-supplied types whose parameters are free-form.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllValidator;

impl PluginValidator for AcceptAllValidator {
    fn validate(
        &mut self,
        _section: &str,
        _plain: &BTreeMap<String, String>,
        _encrypted: &BTreeMap<String, String>,
    ) -> Result<(), StratusError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_validator_rejects_custom_parameters() {
        let mut validator = standard_validator("EtlFileProducer");
        let plain = BTreeMap::from([("MysteryKnob".to_string(), "1".to_string())]);
        let err = validator
            .validate("EtlProducer", &plain, &BTreeMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("MysteryKnob"));
    }

    #[test]
    fn standard_validator_accepts_empty_custom_set() {
        let mut validator = standard_validator("EtlFileProducer");
        assert!(
            validator
                .validate("EtlProducer", &BTreeMap::new(), &BTreeMap::new())
                .is_ok()
        );
        assert!(validator.is_enabled());
    }

    #[test]
    fn accept_all_validator_accepts_anything() {
        let mut validator = AcceptAllValidator;
        let plain = BTreeMap::from([("Whatever".to_string(), "x".to_string())]);
        let encrypted = BTreeMap::from([("Token".to_string(), "AQ==".to_string())]);
        assert!(validator.validate("Custom", &plain, &encrypted).is_ok());
    }
}
