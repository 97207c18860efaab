// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upgrade-preflight diffing for cluster settings.
//!
//! Given two validated stores (current and target), the engine computes every
//! changed parameter -- flat configuration plus structured per-node-type
//! records -- and classifies each by its upgrade policy: apply live, require
//! a restart, consume the one allowed change, or reject the upgrade.

pub mod classify;
pub mod diff;

pub use classify::{SettingsSnapshot, UpgradeDiff, UpgradeDiffEngine};
pub use diff::ChangeKey;
