// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration values and their classification enums.
//!
//! A [`TypedValue`] is one merged configuration value plus its provenance:
//! where it came from (catalog default vs. manifest override), whether it is
//! encrypted, and which upgrade policy governs it. Values are mutable only
//! during merge and read-only afterwards.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use zeroize::Zeroizing;

use crate::error::StratusError;
use crate::secret::CipherContext;

/// Declared type of a configuration parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    Duration,
    String,
    Secret,
}

/// How safely a parameter may change during a rolling upgrade.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum UpgradePolicy {
    /// The running process picks up the new value without a restart.
    Dynamic,
    /// Changing the value requires a coordinated process restart.
    Static,
    /// The value may change exactly once post-deployment.
    SingleChange,
    /// The value must never change post-deployment.
    NotAllowed,
}

/// Catalog classification tag for a parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Classification {
    /// Documented, operator-facing parameter.
    Public,
    /// Internal tuning knob.
    Internal,
    /// Still accepted, but overriding it warns.
    Deprecated,
}

/// One merged configuration value with full provenance.
///
/// Debug output redacts the raw value for secrets and encrypted parameters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    raw: String,
    kind: ValueKind,
    is_encrypted: bool,
    is_from_manifest: bool,
    upgrade_policy: UpgradePolicy,
}

impl std::fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw: &str = if self.is_sensitive() { "[REDACTED]" } else { &self.raw };
        f.debug_struct("TypedValue")
            .field("raw", &raw)
            .field("kind", &self.kind)
            .field("is_encrypted", &self.is_encrypted)
            .field("is_from_manifest", &self.is_from_manifest)
            .field("upgrade_policy", &self.upgrade_policy)
            .finish()
    }
}

impl TypedValue {
    /// Value seeded from a catalog default.
    pub fn from_catalog(
        raw: impl Into<String>,
        kind: ValueKind,
        upgrade_policy: UpgradePolicy,
    ) -> Self {
        Self {
            raw: raw.into(),
            kind,
            is_encrypted: false,
            is_from_manifest: false,
            upgrade_policy,
        }
    }

    /// Value overridden by the cluster manifest.
    pub fn from_manifest(
        raw: impl Into<String>,
        kind: ValueKind,
        upgrade_policy: UpgradePolicy,
        is_encrypted: bool,
    ) -> Self {
        Self {
            raw: raw.into(),
            kind,
            is_encrypted,
            is_from_manifest: true,
            upgrade_policy,
        }
    }

    /// The stored raw string. Ciphertext when `is_encrypted`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The declared type of the parameter.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the manifest flagged this value as encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.is_encrypted
    }

    /// Whether the value came from the manifest rather than a catalog default.
    pub fn is_from_manifest(&self) -> bool {
        self.is_from_manifest
    }

    /// The upgrade policy governing this parameter.
    pub fn upgrade_policy(&self) -> UpgradePolicy {
        self.upgrade_policy
    }

    fn is_sensitive(&self) -> bool {
        self.is_encrypted || self.kind == ValueKind::Secret
    }

    /// Parse as a boolean (`true`/`false`, case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self.raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Parse as a signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.raw.trim().parse().ok()
    }

    /// Parse as an unsigned integer; accepts a `0x` hex prefix.
    pub fn as_u64(&self) -> Option<u64> {
        let raw = self.raw.trim();
        match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => raw.parse().ok(),
        }
    }

    /// Parse as a float.
    pub fn as_f64(&self) -> Option<f64> {
        self.raw.trim().parse().ok()
    }

    /// Parse as canonical seconds. Negative durations are never meaningful to
    /// runtime consumers and read as `None`.
    pub fn as_duration_secs(&self) -> Option<f64> {
        let secs: f64 = self.raw.trim().parse().ok()?;
        if secs.is_nan() || secs < 0.0 {
            return None;
        }
        Some(secs)
    }

    /// The raw value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the raw value parses per the declared kind.
    ///
    /// Encrypted values are opaque ciphertext and always pass. Negative
    /// durations fail only when manifest-sourced; catalog sentinel defaults
    /// may be negative.
    pub fn is_well_typed(&self) -> bool {
        if self.is_encrypted {
            return true;
        }
        match self.kind {
            ValueKind::Bool => self.as_bool().is_some(),
            ValueKind::Int => self.as_i64().is_some(),
            ValueKind::Uint => self.as_u64().is_some(),
            ValueKind::Float => self.as_f64().is_some(),
            ValueKind::Duration => match self.raw.trim().parse::<f64>() {
                Ok(secs) => !secs.is_nan() && (secs >= 0.0 || !self.is_from_manifest),
                Err(_) => false,
            },
            ValueKind::String | ValueKind::Secret => true,
        }
    }

    /// The value as bytes, decrypted through `ctx` when encrypted.
    ///
    /// The returned buffer zeroes itself on drop. Calling this twice on the
    /// same value yields identical bytes; nothing is mutated.
    pub fn secret_value(
        &self,
        ctx: &dyn CipherContext,
    ) -> Result<Zeroizing<Vec<u8>>, StratusError> {
        if self.is_encrypted {
            ctx.decrypt(&self.raw)
        } else {
            Ok(Zeroizing::new(self.raw.as_bytes().to_vec()))
        }
    }

    /// The value as a redacted string, decrypted through `ctx` when encrypted.
    pub fn secret_string(&self, ctx: &dyn CipherContext) -> Result<SecretString, StratusError> {
        let bytes = self.secret_value(ctx)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| StratusError::Decrypt {
            scope: ctx.scope().to_string(),
            detail: format!("decrypted value is not valid UTF-8: {e}"),
        })?;
        Ok(text.to_string().into())
    }
}
