// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section validation and the end-to-end validation pipeline.
//!
//! A [`SectionValidator`] is the per-domain capability: it names its section,
//! validates a merged store, and optionally vets an upgrade pair. The
//! [`ValidatorRegistry`] is an explicit compile-time table of validators --
//! no runtime type scanning -- dispatched by section-name match. The
//! [`pipeline`] module wires merge, diagnostics plugin resolution, and the
//! generic pass together in the order the engine requires.

pub mod pipeline;
pub mod registry;
pub mod validators;

pub use pipeline::{validate_configuration, validate_upgrade, ValidatedSettings};
pub use registry::{SectionValidator, ValidatorRegistry};
