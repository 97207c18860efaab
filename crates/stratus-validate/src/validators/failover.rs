// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replica-set sizing checks for the failover manager.

use stratus_core::StratusError;
use stratus_settings::SettingsStore;
use tracing::warn;

use crate::registry::SectionValidator;
use crate::validators::require_i64;

const SECTION: &str = "FailoverManager";

/// Validates replica-set sizing for the system failover manager.
pub struct FailoverManagerValidator;

impl SectionValidator for FailoverManagerValidator {
    fn section_name(&self) -> &str {
        SECTION
    }

    fn validate(&self, store: &SettingsStore) -> Result<(), StratusError> {
        let target = require_i64(store, SECTION, "TargetReplicaSetSize")?;
        let min = require_i64(store, SECTION, "MinReplicaSetSize")?;

        if target < 1 {
            return Err(StratusError::Validation {
                message: format!("`{SECTION}/TargetReplicaSetSize` must be at least 1, got {target}"),
            });
        }
        if min < 1 {
            return Err(StratusError::Validation {
                message: format!("`{SECTION}/MinReplicaSetSize` must be at least 1, got {min}"),
            });
        }
        if min > target {
            return Err(StratusError::Validation {
                message: format!(
                    "`{SECTION}/MinReplicaSetSize` ({min}) must not exceed \
                     `{SECTION}/TargetReplicaSetSize` ({target})"
                ),
            });
        }

        if let Some(expected) = store.get_i64(SECTION, "ExpectedClusterSize")
            && expected < target
        {
            warn!(
                expected,
                target, "expected cluster size is below the target replica set size"
            );
        }

        Ok(())
    }
}
