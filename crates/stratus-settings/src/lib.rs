// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The merged settings store.
//!
//! Reconciles the static catalog against the cluster manifest's sparse,
//! possibly-encrypted overrides into one typed section/parameter map with
//! full provenance. All merge-time errors are fatal: configuration
//! correctness is a precondition, never recovered.

pub mod sections;
pub mod store;

pub use store::{MergeMode, SettingsStore, StoreSection};
