// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Standard section validators, one variant per configuration domain.

pub mod cluster_manager;
pub mod failover;
pub mod federation;
pub mod hosting;
pub mod security;

use stratus_core::StratusError;
use stratus_settings::SettingsStore;

/// Read a parameter that the catalog guarantees; a miss means the store was
/// built against a catalog this validator does not understand.
pub(crate) fn require_i64(
    store: &SettingsStore,
    section: &str,
    parameter: &str,
) -> Result<i64, StratusError> {
    store.get_i64(section, parameter).ok_or_else(|| StratusError::Validation {
        message: format!("`{section}/{parameter}` must be present and integer-valued"),
    })
}

pub(crate) fn require_duration_secs(
    store: &SettingsStore,
    section: &str,
    parameter: &str,
) -> Result<f64, StratusError> {
    store
        .get_duration_secs(section, parameter)
        .ok_or_else(|| StratusError::Validation {
            message: format!("`{section}/{parameter}` must be a non-negative duration"),
        })
}
