// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings catalog for the Stratus validation subsystem.
//!
//! The catalog is a packaged, line-oriented descriptor table declaring every
//! recognized configuration parameter: its section, name, type, default-value
//! expression, upgrade policy, and classification tag. It is loaded once,
//! owned by the caller, and read-only thereafter.

pub mod descriptor;
pub mod expr;
pub mod loader;

pub use descriptor::{CatalogSection, ParameterDescriptor, SettingsCatalog};
