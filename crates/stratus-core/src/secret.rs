// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The secret-decryption capability.
//!
//! Encrypted manifest values are ciphertext bound to a certificate store; the
//! platform decryption backend sits behind [`CipherContext`] so the engine
//! never touches OS certificate APIs directly. Every decrypt path returns a
//! [`Zeroizing`] buffer, so cleanup is guaranteed on all exit paths including
//! failure mid-validation.

use zeroize::Zeroizing;

use crate::error::StratusError;

/// Decrypts encrypted configuration values under a named security context.
pub trait CipherContext {
    /// The security-context string scoping decryption (a certificate store
    /// name on most platforms).
    fn scope(&self) -> &str;

    /// Decrypt one ciphertext. Failure is fatal to the running validation
    /// pass; there is no retry.
    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<Vec<u8>>, StratusError>;
}

/// Passthrough context for unsecured deployments and tests: "decryption" is
/// the identity transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextContext;

impl CipherContext for PlainTextContext {
    fn scope(&self) -> &str {
        "plaintext"
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<Vec<u8>>, StratusError> {
        Ok(Zeroizing::new(ciphertext.as_bytes().to_vec()))
    }
}
