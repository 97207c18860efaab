// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-section replica sizing between the cluster manager and the image
//! store service.

use stratus_core::StratusError;
use stratus_settings::SettingsStore;

use crate::registry::SectionValidator;
use crate::validators::require_i64;

const SECTION: &str = "ClusterManager";
const IMAGE_STORE_SECTION: &str = "ImageStoreService";

/// Validates cluster-manager settings and their image-store dependency.
///
/// When the image store service is affinitized to the cluster manager, its
/// replica set cannot be larger than the cluster manager's.
pub struct ClusterManagerValidator;

impl SectionValidator for ClusterManagerValidator {
    fn section_name(&self) -> &str {
        SECTION
    }

    fn validate(&self, store: &SettingsStore) -> Result<(), StratusError> {
        let cm_target = require_i64(store, SECTION, "TargetReplicaSetSize")?;
        if cm_target < 1 {
            return Err(StratusError::Validation {
                message: format!("`{SECTION}/TargetReplicaSetSize` must be at least 1, got {cm_target}"),
            });
        }

        if store.get_bool(IMAGE_STORE_SECTION, "EnableClusterManagerAffinity") != Some(true) {
            return Ok(());
        }
        let Some(iss_target) = store.get_i64(IMAGE_STORE_SECTION, "TargetReplicaSetSize") else {
            return Ok(());
        };
        if iss_target > cm_target {
            return Err(StratusError::Validation {
                message: format!(
                    "`{IMAGE_STORE_SECTION}/TargetReplicaSetSize` ({iss_target}) must not exceed \
                     `{SECTION}/TargetReplicaSetSize` ({cm_target}) while affinity is enabled"
                ),
            });
        }
        Ok(())
    }
}
